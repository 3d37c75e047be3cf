//! Package manager type definitions for supported ecosystems

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported package-manager ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// NuGet ecosystem (csproj/props property-based manifests)
    Nuget,
    /// Conan ecosystem (conanfile recipes)
    Conan,
}

impl PackageManager {
    /// Returns the display name for this package manager
    pub fn display_name(&self) -> &'static str {
        match self {
            PackageManager::Nuget => "NuGet",
            PackageManager::Conan => "Conan",
        }
    }

    /// Returns the public index name for this package manager
    pub fn index_name(&self) -> &'static str {
        match self {
            PackageManager::Nuget => "nuget.org",
            PackageManager::Conan => "ConanCenter",
        }
    }

    /// Whether updates in this ecosystem always go through the full-unlock
    /// path. When true, a resolvable version "without unlock" does not
    /// exist: any chosen version may require moving peer dependencies, so
    /// callers must always attempt the full-unlock resolution.
    pub fn full_unlock_only(&self) -> bool {
        match self {
            PackageManager::Nuget => true,
            PackageManager::Conan => true,
        }
    }

    /// Returns all supported package managers
    pub fn all() -> &'static [PackageManager] {
        &[PackageManager::Nuget, PackageManager::Conan]
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
