//! Security advisory records from the caller's advisory feed

use crate::domain::{PackageManager, PackageVersion, VersionRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A published vulnerability affecting a range of package versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAdvisory {
    /// Name of the affected package
    pub dependency: String,
    /// Ecosystem the advisory applies to
    pub package_manager: PackageManager,
    /// Version ranges known to be vulnerable
    pub affected_versions: Vec<VersionRange>,
    /// First version the maintainers shipped the fix in, when known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub patched_version: Option<PackageVersion>,
}

impl SecurityAdvisory {
    /// Creates a new advisory
    pub fn new(
        dependency: impl Into<String>,
        package_manager: PackageManager,
        affected_versions: Vec<VersionRange>,
    ) -> Self {
        Self {
            dependency: dependency.into(),
            package_manager,
            affected_versions,
            patched_version: None,
        }
    }

    /// Records the first fixed version (builder pattern)
    pub fn with_patched_version(mut self, version: PackageVersion) -> Self {
        self.patched_version = Some(version);
        self
    }

    /// Returns true if the given version is inside a vulnerable range
    pub fn affects(&self, version: &PackageVersion) -> bool {
        self.affected_versions
            .iter()
            .any(|range| range.contains(version))
    }

    /// Returns true if moving to the given version remediates this
    /// advisory: the version is outside every vulnerable range and not
    /// below the published fix version
    pub fn remediated_by(&self, version: &PackageVersion) -> bool {
        if self.affects(version) {
            return false;
        }
        match &self.patched_version {
            Some(patched) => version >= patched,
            None => true,
        }
    }
}

impl fmt::Display for SecurityAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranges: Vec<&str> = self.affected_versions.iter().map(|r| r.as_str()).collect();
        write!(f, "{}: affected {}", self.dependency, ranges.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    fn r(s: &str) -> VersionRange {
        VersionRange::parse(s).unwrap()
    }

    fn advisory() -> SecurityAdvisory {
        SecurityAdvisory::new("Foo.Bar", PackageManager::Nuget, vec![r("< 2.0.0")])
            .with_patched_version(v("2.0.0"))
    }

    #[test]
    fn test_affects() {
        let adv = advisory();
        assert!(adv.affects(&v("1.0.0")));
        assert!(adv.affects(&v("1.9.9")));
        assert!(!adv.affects(&v("2.0.0")));
    }

    #[test]
    fn test_remediated_by() {
        let adv = advisory();
        assert!(!adv.remediated_by(&v("1.9.9")));
        assert!(adv.remediated_by(&v("2.0.0")));
        assert!(adv.remediated_by(&v("3.0.0")));
    }

    #[test]
    fn test_remediation_respects_patched_version() {
        // Affected range and fix version can disagree; the stricter wins.
        let adv = SecurityAdvisory::new("Foo.Bar", PackageManager::Nuget, vec![r("< 1.5.0")])
            .with_patched_version(v("2.0.0"));
        assert!(!adv.remediated_by(&v("1.6.0")));
        assert!(adv.remediated_by(&v("2.0.0")));
    }

    #[test]
    fn test_remediation_without_patched_version() {
        let adv = SecurityAdvisory::new("Foo.Bar", PackageManager::Nuget, vec![r("[1.0,2.0)")]);
        assert!(adv.remediated_by(&v("2.0")));
        assert!(!adv.remediated_by(&v("1.5")));
    }

    #[test]
    fn test_multiple_affected_ranges() {
        let adv = SecurityAdvisory::new(
            "Foo.Bar",
            PackageManager::Nuget,
            vec![r("[1.0,1.2)"), r("[2.0,2.1)")],
        );
        assert!(adv.affects(&v("1.1")));
        assert!(adv.affects(&v("2.0.5")));
        assert!(!adv.affects(&v("1.3")));
    }

    #[test]
    fn test_serde_round_trip() {
        let adv = advisory();
        let json = serde_json::to_string(&adv).unwrap();
        let parsed: SecurityAdvisory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, adv);
    }

    #[test]
    fn test_display() {
        let adv = advisory();
        assert_eq!(format!("{}", adv), "Foo.Bar: affected < 2.0.0");
    }
}
