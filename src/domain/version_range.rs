//! Version range parsing and membership checks
//!
//! Ranges arrive from two places: security-advisory feeds and caller
//! ignore lists. Both use either interval notation or operator clauses:
//! - intervals: `[1.0,2.0)`, `[1.0,)`, `(,2.0]`, `[1.2.3]`
//! - operators: `< 2.0.0`, `>= 1.0`, `> 1.0, < 2.0`
//! - bare version: `1.2.3` (matches exactly that version)

use crate::domain::PackageVersion;
use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One endpoint of a range
#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: PackageVersion,
    inclusive: bool,
}

/// A contiguous version interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    raw: String,
    floor: Option<Bound>,
    ceiling: Option<Bound>,
}

impl VersionRange {
    /// Parse a range in interval, operator, or bare-version notation
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InputError::invalid_range(input, "empty range"));
        }

        if trimmed.starts_with('[') || trimmed.starts_with('(') {
            return Self::parse_interval(trimmed);
        }
        if trimmed.starts_with('<') || trimmed.starts_with('>') || trimmed.starts_with('=') {
            return Self::parse_operators(trimmed);
        }

        // A bare version matches exactly that version.
        let version = PackageVersion::parse(trimmed)
            .map_err(|_| InputError::invalid_range(input, "not a version or range"))?;
        Ok(Self {
            raw: trimmed.to_string(),
            floor: Some(Bound {
                version: version.clone(),
                inclusive: true,
            }),
            ceiling: Some(Bound {
                version,
                inclusive: true,
            }),
        })
    }

    fn parse_interval(input: &str) -> Result<Self, InputError> {
        let floor_inclusive = input.starts_with('[');
        let ceiling_inclusive = input.ends_with(']');
        if !input.ends_with(']') && !input.ends_with(')') {
            return Err(InputError::invalid_range(input, "unterminated interval"));
        }

        let inner = &input[1..input.len() - 1];
        let (floor_str, ceiling_str) = match inner.split_once(',') {
            Some((lo, hi)) => (lo.trim(), hi.trim()),
            // `[1.2.3]` pins a single version.
            None => (inner.trim(), inner.trim()),
        };

        let parse_endpoint = |s: &str| -> Result<Option<PackageVersion>, InputError> {
            if s.is_empty() {
                return Ok(None);
            }
            PackageVersion::parse(s)
                .map(Some)
                .map_err(|_| InputError::invalid_range(input, "bad interval endpoint"))
        };

        let floor = parse_endpoint(floor_str)?.map(|version| Bound {
            version,
            inclusive: floor_inclusive,
        });
        let ceiling = parse_endpoint(ceiling_str)?.map(|version| Bound {
            version,
            inclusive: ceiling_inclusive,
        });

        if floor.is_none() && ceiling.is_none() {
            return Err(InputError::invalid_range(input, "interval has no endpoints"));
        }

        Ok(Self {
            raw: input.to_string(),
            floor,
            ceiling,
        })
    }

    fn parse_operators(input: &str) -> Result<Self, InputError> {
        let mut floor: Option<Bound> = None;
        let mut ceiling: Option<Bound> = None;

        for clause in input.split(',') {
            let clause = clause.trim();
            let (op, rest) = if let Some(rest) = clause.strip_prefix(">=") {
                (">=", rest)
            } else if let Some(rest) = clause.strip_prefix("<=") {
                ("<=", rest)
            } else if let Some(rest) = clause.strip_prefix('>') {
                (">", rest)
            } else if let Some(rest) = clause.strip_prefix('<') {
                ("<", rest)
            } else if let Some(rest) = clause.strip_prefix('=') {
                ("=", rest)
            } else {
                return Err(InputError::invalid_range(input, "unknown operator"));
            };

            let version = PackageVersion::parse(rest.trim())
                .map_err(|_| InputError::invalid_range(input, "bad operator operand"))?;

            match op {
                ">=" | ">" => {
                    floor = Some(Bound {
                        version,
                        inclusive: op == ">=",
                    })
                }
                "<=" | "<" => {
                    ceiling = Some(Bound {
                        version,
                        inclusive: op == "<=",
                    })
                }
                "=" => {
                    floor = Some(Bound {
                        version: version.clone(),
                        inclusive: true,
                    });
                    ceiling = Some(Bound {
                        version,
                        inclusive: true,
                    });
                }
                _ => unreachable!(),
            }
        }

        Ok(Self {
            raw: input.to_string(),
            floor,
            ceiling,
        })
    }

    /// Returns true if the version falls inside this range
    pub fn contains(&self, version: &PackageVersion) -> bool {
        if let Some(floor) = &self.floor {
            let ok = if floor.inclusive {
                *version >= floor.version
            } else {
                *version > floor.version
            };
            if !ok {
                return false;
            }
        }
        if let Some(ceiling) = &self.ceiling {
            let ok = if ceiling.inclusive {
                *version <= ceiling.version
            } else {
                *version < ceiling.version
            };
            if !ok {
                return false;
            }
        }
        true
    }

    /// The range exactly as it appeared in the input
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for VersionRange {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.raw
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
