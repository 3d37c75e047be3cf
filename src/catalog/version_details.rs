//! Candidate version with provenance

use crate::domain::{PackageVersion, RequirementSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A published version together with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDetails {
    /// The candidate version
    pub version: PackageVersion,
    /// URL of the package metadata document (e.g. nuspec)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_url: Option<String>,
    /// URL of the index the version was listed by
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub registry_url: Option<String>,
    /// URL of the human-readable package page
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub package_url: Option<String>,
}

impl VersionDetails {
    /// Creates details with no provenance
    pub fn new(version: PackageVersion) -> Self {
        Self {
            version,
            source_url: None,
            registry_url: None,
            package_url: None,
        }
    }

    /// Sets the metadata document URL (builder pattern)
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Sets the index URL (builder pattern)
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = Some(url.into());
        self
    }

    /// Sets the package page URL (builder pattern)
    pub fn with_package_url(mut self, url: impl Into<String>) -> Self {
        self.package_url = Some(url.into());
        self
    }

    /// Provenance in the shape the requirement rewriter records
    pub fn to_requirement_source(&self) -> RequirementSource {
        RequirementSource {
            source_url: self.source_url.clone(),
            registry_url: self.registry_url.clone(),
            package_url: self.package_url.clone(),
        }
    }
}

impl Ord for VersionDetails {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version.cmp(&other.version)
    }
}

impl PartialOrd for VersionDetails {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}
