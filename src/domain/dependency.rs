//! Dependency information structures

use super::{PackageManager, PackageVersion, Requirement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a package dependency parsed from a manifest
///
/// Values are never mutated in place: [`Dependency::updated`] produces a
/// new value carrying the previous version and requirements for diffing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Currently resolved version; absent for transitive dependencies the
    /// parser could not resolve
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<PackageVersion>,
    /// Whether the project declares this dependency directly
    pub top_level: bool,
    /// One entry per declaration site, in declaration order
    pub requirements: Vec<Requirement>,
    /// The ecosystem this dependency belongs to
    pub package_manager: PackageManager,
    /// Version before the last update, for auditing
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub previous_version: Option<PackageVersion>,
    /// Requirements before the last update, for auditing
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub previous_requirements: Option<Vec<Requirement>>,
}

impl Dependency {
    /// Creates a new top-level dependency
    pub fn new(
        name: impl Into<String>,
        version: Option<PackageVersion>,
        requirements: Vec<Requirement>,
        package_manager: PackageManager,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            top_level: true,
            requirements,
            package_manager,
            previous_version: None,
            previous_requirements: None,
        }
    }

    /// Creates a transitive dependency (builder pattern)
    pub fn transitive(mut self) -> Self {
        self.top_level = false;
        self
    }

    /// Produces the updated dependency value, retaining this one's version
    /// and requirements as the previous state
    pub fn updated(&self, version: PackageVersion, requirements: Vec<Requirement>) -> Self {
        Self {
            name: self.name.clone(),
            version: Some(version),
            top_level: self.top_level,
            requirements,
            package_manager: self.package_manager,
            previous_version: self.version.clone(),
            previous_requirements: Some(self.requirements.clone()),
        }
    }

    /// Returns true if any requirement still contains an uninterpolated
    /// property placeholder
    pub fn has_unresolved_property(&self) -> bool {
        self.requirements.iter().any(|r| r.has_unresolved_property())
    }

    /// Names of shared version properties referenced by this dependency,
    /// in declaration order, without duplicates
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for requirement in &self.requirements {
            if let Some(name) = requirement.property_name.as_deref() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self
            .version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string());
        let level = if self.top_level { "" } else { " (transitive)" };
        write!(
            f,
            "{}@{}{} [{}]",
            self.name, version, level, self.package_manager
        )
    }
}
