//! Requirement declarations and their syntax
//!
//! A dependency can be declared at several sites (multiple project files
//! referencing the same package); each site contributes one [`Requirement`].
//! Supported requirement syntax:
//! - bare minimum: `1.2.3`
//! - exact pin: `[1.2.3]`
//! - intervals: `[1.0.0,)`, `[1.0,2.0)`, `(,2.0]`
//! - wildcard: `1.0.*`, `*`
//! - property reference: `$(SomePackageVersion)` (resolved by the parser;
//!   left literal when the property could not be found)

use crate::domain::PackageVersion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Matches an uninterpolated property placeholder inside a requirement
pub static PROPERTY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(([A-Za-z_][A-Za-z0-9_.]*)\)").unwrap());

static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?[\d]+(?:\.[\d]+)*(?:-[\w.]+)?$").unwrap());
static PINNED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*(v?[\d]+(?:\.[\d]+)*(?:-[\w.]+)?)\s*\]$").unwrap());
static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([\[(])\s*(v?[\d]+(?:\.[\d]+)*(?:-[\w.]+)?)?\s*,\s*(v?[\d]+(?:\.[\d]+)*(?:-[\w.]+)?)?\s*([\])])$",
    )
    .unwrap()
});
static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*|([\d]+(?:\.[\d]+)*)\.\*)$").unwrap());

/// Provenance of the version a requirement was rewritten to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSource {
    /// URL of the package metadata document (e.g. nuspec)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// URL of the registry index the version came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
    /// URL of the human-readable package page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,
}

/// One declaration site of a dependency requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// The requirement expression as written (after property interpolation)
    pub spec: String,
    /// The file the declaration lives in
    pub file: String,
    /// Shared version property this requirement is tied to, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub property_name: Option<String>,
    /// Provenance of the currently-required version
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<RequirementSource>,
}

impl Requirement {
    /// Creates a new requirement
    pub fn new(spec: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            file: file.into(),
            property_name: None,
            source: None,
        }
    }

    /// Ties this requirement to a shared version property (builder pattern)
    pub fn with_property(mut self, name: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self
    }

    /// Attaches version provenance (builder pattern)
    pub fn with_source(mut self, source: RequirementSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns true if the spec still contains an uninterpolated property
    /// placeholder, meaning the true constraint is unknown
    pub fn has_unresolved_property(&self) -> bool {
        PROPERTY_REGEX.is_match(&self.spec)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.spec, self.file)
    }
}

/// An interval endpoint in requirement syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalBound {
    pub version: PackageVersion,
    pub inclusive: bool,
}

/// A requirement expression broken down by syntax family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementSpec {
    /// Bare minimum version, e.g. `1.2.3`
    Bare(PackageVersion),
    /// Exact pin, e.g. `[1.2.3]`
    Pinned(PackageVersion),
    /// Interval, e.g. `[1.0.0,)` or `[1.0,2.0)`
    Interval {
        floor: Option<IntervalBound>,
        ceiling: Option<IntervalBound>,
    },
    /// Wildcard, e.g. `1.0.*`; an empty prefix is the bare `*`
    Wildcard { prefix: Vec<u64> },
}

impl RequirementSpec {
    /// Parse a requirement expression; returns None for syntax this
    /// ecosystem family does not use
    pub fn parse(spec: &str) -> Option<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(caps) = WILDCARD_RE.captures(trimmed) {
            let prefix = match caps.get(1) {
                Some(m) => m
                    .as_str()
                    .split('.')
                    .map(|p| p.parse().ok())
                    .collect::<Option<Vec<u64>>>()?,
                None => Vec::new(),
            };
            return Some(RequirementSpec::Wildcard { prefix });
        }

        if BARE_RE.is_match(trimmed) {
            return PackageVersion::parse(trimmed).ok().map(RequirementSpec::Bare);
        }

        if let Some(caps) = PINNED_RE.captures(trimmed) {
            let version = PackageVersion::parse(caps.get(1)?.as_str()).ok()?;
            return Some(RequirementSpec::Pinned(version));
        }

        if let Some(caps) = INTERVAL_RE.captures(trimmed) {
            let floor_inclusive = caps.get(1)?.as_str() == "[";
            let ceiling_inclusive = caps.get(4)?.as_str() == "]";
            let floor = match caps.get(2) {
                Some(m) => Some(IntervalBound {
                    version: PackageVersion::parse(m.as_str()).ok()?,
                    inclusive: floor_inclusive,
                }),
                None => None,
            };
            let ceiling = match caps.get(3) {
                Some(m) => Some(IntervalBound {
                    version: PackageVersion::parse(m.as_str()).ok()?,
                    inclusive: ceiling_inclusive,
                }),
                None => None,
            };
            if floor.is_none() && ceiling.is_none() {
                return None;
            }
            return Some(RequirementSpec::Interval { floor, ceiling });
        }

        None
    }

    /// Returns true if the expression admits the given version
    pub fn allows(&self, version: &PackageVersion) -> bool {
        match self {
            RequirementSpec::Bare(min) => version >= min,
            RequirementSpec::Pinned(pin) => version == pin,
            RequirementSpec::Interval { floor, ceiling } => {
                if let Some(floor) = floor {
                    let ok = if floor.inclusive {
                        version >= &floor.version
                    } else {
                        version > &floor.version
                    };
                    if !ok {
                        return false;
                    }
                }
                if let Some(ceiling) = ceiling {
                    let ok = if ceiling.inclusive {
                        version <= &ceiling.version
                    } else {
                        version < &ceiling.version
                    };
                    if !ok {
                        return false;
                    }
                }
                true
            }
            RequirementSpec::Wildcard { prefix } => {
                let segments = version.release_segments();
                prefix
                    .iter()
                    .enumerate()
                    .all(|(i, p)| segments.get(i).copied().unwrap_or(0) == *p)
            }
        }
    }
}
