//! Check-request input
//!
//! The manifest parser collaborator hands over its results as a JSON
//! document: the parsed dependency set, the advisory feed, per-package
//! ignore ranges, and optionally a pre-fetched version catalog so a run
//! never touches the network.

use crate::domain::{Dependency, PackageManager, PackageVersion, SecurityAdvisory, VersionRange};
use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Everything needed to check one manifest's dependencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Ecosystem the dependencies belong to
    pub package_manager: PackageManager,
    /// Parsed dependency declarations, in declaration order
    pub dependencies: Vec<Dependency>,
    /// Advisory feed entries for this manifest's packages
    #[serde(default)]
    pub advisories: Vec<SecurityAdvisory>,
    /// Version ranges to exclude from consideration, per package
    #[serde(default)]
    pub ignored_versions: HashMap<String, Vec<VersionRange>>,
    /// Pre-fetched catalog: package name to published versions; when
    /// present, lookups are answered from here instead of the registry
    #[serde(default)]
    pub known_versions: HashMap<String, Vec<PackageVersion>>,
}

impl CheckRequest {
    /// Loads a request from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| InputError::read(path, e))?;
        Self::from_json(&content, path)
    }

    /// Parses a request from JSON text; `path` only labels errors
    pub fn from_json(json: &str, path: &Path) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::parse(path, e.to_string()))
    }

    /// Returns true when the request carries its own version catalog
    pub fn has_prefetched_catalog(&self) -> bool {
        !self.known_versions.is_empty()
    }

    /// Merges additional advisory feed entries
    pub fn merge_advisories(&mut self, advisories: Vec<SecurityAdvisory>) {
        self.advisories.extend(advisories);
    }

    /// Adds an ignore range for one package
    pub fn add_ignored_version(&mut self, package: impl Into<String>, range: VersionRange) {
        self.ignored_versions
            .entry(package.into())
            .or_default()
            .push(range);
    }
}

/// Loads an advisory feed file: a JSON array of advisories
pub fn load_advisories(path: &Path) -> Result<Vec<SecurityAdvisory>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::read(path, e))?;
    serde_json::from_str(&content).map_err(|e| InputError::parse(path, e.to_string()))
}

/// Parses a `NAME=RANGE` ignore argument
pub fn parse_ignore_arg(arg: &str) -> Result<(String, VersionRange), InputError> {
    let Some((name, range)) = arg.split_once('=') else {
        return Err(InputError::InvalidIgnoreSpec {
            value: arg.to_string(),
        });
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::InvalidIgnoreSpec {
            value: arg.to_string(),
        });
    }
    Ok((name.to_string(), VersionRange::parse(range.trim())?))
}
