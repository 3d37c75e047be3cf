//! Version catalog lookup
//!
//! Given a dependency, answers two questions against a package index:
//! what is the latest qualifying version, and what is the lowest version
//! that remediates every applicable advisory. Absence of an answer is a
//! normal result, never an error.

mod version_details;

pub use version_details::VersionDetails;

use crate::domain::{Dependency, PackageVersion, SecurityAdvisory, VersionRange};
use crate::error::CheckError;
use crate::registry::PackageIndex;

/// Catalog lookups for one dependency
pub struct VersionFinder<'a> {
    dependency: &'a Dependency,
    index: &'a dyn PackageIndex,
    ignored_versions: &'a [VersionRange],
    advisories: &'a [SecurityAdvisory],
}

impl<'a> VersionFinder<'a> {
    /// Creates a finder scoped to one dependency
    pub fn new(
        dependency: &'a Dependency,
        index: &'a dyn PackageIndex,
        ignored_versions: &'a [VersionRange],
        advisories: &'a [SecurityAdvisory],
    ) -> Self {
        Self {
            dependency,
            index,
            ignored_versions,
            advisories,
        }
    }

    /// The latest qualifying published version, or None when nothing
    /// qualifies (unknown package, everything ignored, only prereleases)
    pub async fn latest_version_details(&self) -> Result<Option<VersionDetails>, CheckError> {
        let versions = self.known_versions().await?;
        Ok(versions
            .into_iter()
            .filter(|candidate| self.eligible(&candidate.version))
            .max())
    }

    /// The lowest qualifying version that remediates every advisory for
    /// this dependency, or None when no published version does
    pub async fn lowest_security_fix_details(&self) -> Result<Option<VersionDetails>, CheckError> {
        let versions = self.known_versions().await?;
        Ok(versions
            .into_iter()
            .filter(|candidate| self.eligible(&candidate.version))
            .filter(|candidate| self.remediates_all(&candidate.version))
            .filter(|candidate| self.not_a_regression(&candidate.version))
            .min())
    }

    /// Every version the index knows about; an unknown package is an
    /// empty catalog, not a failure
    async fn known_versions(&self) -> Result<Vec<VersionDetails>, CheckError> {
        match self.index.published_versions(&self.dependency.name).await {
            Ok(versions) => Ok(versions),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn eligible(&self, version: &PackageVersion) -> bool {
        if self.ignored_versions.iter().any(|r| r.contains(version)) {
            return false;
        }
        // Prereleases only qualify when the dependency already runs one.
        if version.is_prerelease() && !self.current_is_prerelease() {
            return false;
        }
        true
    }

    fn current_is_prerelease(&self) -> bool {
        self.dependency
            .version
            .as_ref()
            .map(|v| v.is_prerelease())
            .unwrap_or(false)
    }

    fn remediates_all(&self, version: &PackageVersion) -> bool {
        self.advisories
            .iter()
            .filter(|a| a.dependency == self.dependency.name)
            .all(|a| a.remediated_by(version))
    }

    fn not_a_regression(&self, version: &PackageVersion) -> bool {
        match &self.dependency.version {
            Some(current) => version >= current,
            None => true,
        }
    }
}
