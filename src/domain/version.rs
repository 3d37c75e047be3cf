//! Package version parsing and ordering
//!
//! Handles the version shapes that show up in real catalogs:
//! - canonical semver: `1.2.3`, `1.2.3-beta.1`
//! - short versions: `1.0`
//! - four-part versions: `1.0.0.0`
//! - a leading `v` prefix: `v1.2.3`

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed package version that preserves its original spelling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageVersion {
    raw: String,
    release: Vec<u64>,
    prerelease: Option<String>,
}

impl PackageVersion {
    /// Parse a version string, accepting semver plus short and four-part forms
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InputError::invalid_version(input));
        }
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);

        // Canonical three-part versions go through semver so that
        // prerelease identifiers keep their exact precedence rules.
        if let Ok(sv) = semver::Version::parse(body) {
            let prerelease = if sv.pre.is_empty() {
                None
            } else {
                Some(sv.pre.as_str().to_string())
            };
            return Ok(Self {
                raw: trimmed.to_string(),
                release: vec![sv.major, sv.minor, sv.patch],
                prerelease,
            });
        }

        let (release_part, prerelease) = match body.split_once('-') {
            Some((rel, pre)) if !pre.is_empty() => (rel, Some(pre.to_string())),
            _ => (body, None),
        };

        let release = release_part
            .split('.')
            .map(|segment| segment.parse::<u64>())
            .collect::<Result<Vec<u64>, _>>()
            .map_err(|_| InputError::invalid_version(input))?;

        if release.is_empty() {
            return Err(InputError::invalid_version(input));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            release,
            prerelease,
        })
    }

    /// The version exactly as it appeared in the input
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric release segments (major, minor, ...)
    pub fn release_segments(&self) -> &[u64] {
        &self.release
    }

    /// Returns true if this version carries a prerelease identifier
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

impl FromStr for PackageVersion {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PackageVersion {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PackageVersion> for String {
    fn from(version: PackageVersion) -> Self {
        version.raw
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Missing segments compare as zero, so 1.0 == 1.0.0.
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                order => return order,
            }
        }

        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            // A release sorts above any of its prereleases.
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_prerelease(a, b),
        }
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare prerelease identifier lists with semver precedence:
/// numeric identifiers sort numerically and below alphanumeric ones.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let order = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(n), Ok(m)) => n.cmp(&m),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}
