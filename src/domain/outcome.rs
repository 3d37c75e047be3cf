//! Check decision result types

use super::{Dependency, PackageVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why a dependency is reported as up to date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpToDateReason {
    /// Transitive dependency with no known vulnerability
    Transitive,
    /// A requirement references a property that could not be interpolated
    UnresolvedProperty,
    /// Current version is already the best qualifying version
    AlreadyLatest,
    /// Every candidate version was excluded (ignored, prerelease, or none
    /// published)
    NoEligibleVersion,
    /// A sibling sharing this dependency's version property cannot accept
    /// the target version, so the whole group stays put
    GroupBlocked,
}

impl fmt::Display for UpToDateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpToDateReason::Transitive => write!(f, "transitive, no advisory"),
            UpToDateReason::UnresolvedProperty => write!(f, "unresolved version property"),
            UpToDateReason::AlreadyLatest => write!(f, "already at best version"),
            UpToDateReason::NoEligibleVersion => write!(f, "no eligible version"),
            UpToDateReason::GroupBlocked => write!(f, "property group cannot move"),
        }
    }
}

/// Result of checking a single dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// An update is available; `updated` holds every dependency that moves
    /// (the checked one plus any property siblings or pinned peers)
    Update {
        dependency: Dependency,
        target: PackageVersion,
        updated: Vec<Dependency>,
    },
    /// No update is needed or possible
    UpToDate {
        dependency: Dependency,
        reason: UpToDateReason,
    },
    /// Resolution hit a hard error; unrelated dependencies keep processing
    Failed {
        dependency: Dependency,
        error: String,
    },
}

impl CheckOutcome {
    /// Creates an Update outcome
    pub fn update(dependency: Dependency, target: PackageVersion, updated: Vec<Dependency>) -> Self {
        CheckOutcome::Update {
            dependency,
            target,
            updated,
        }
    }

    /// Creates an UpToDate outcome
    pub fn up_to_date(dependency: Dependency, reason: UpToDateReason) -> Self {
        CheckOutcome::UpToDate { dependency, reason }
    }

    /// Creates a Failed outcome
    pub fn failed(dependency: Dependency, error: impl Into<String>) -> Self {
        CheckOutcome::Failed {
            dependency,
            error: error.into(),
        }
    }

    /// Returns true if this outcome carries an update
    pub fn is_update(&self) -> bool {
        matches!(self, CheckOutcome::Update { .. })
    }

    /// Returns true if the dependency was reported up to date
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, CheckOutcome::UpToDate { .. })
    }

    /// Returns true if resolution failed
    pub fn is_failed(&self) -> bool {
        matches!(self, CheckOutcome::Failed { .. })
    }

    /// Returns the checked dependency
    pub fn dependency(&self) -> &Dependency {
        match self {
            CheckOutcome::Update { dependency, .. } => dependency,
            CheckOutcome::UpToDate { dependency, .. } => dependency,
            CheckOutcome::Failed { dependency, .. } => dependency,
        }
    }

    /// Returns the package name
    pub fn package_name(&self) -> &str {
        &self.dependency().name
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Update {
                dependency,
                target,
                updated,
            } => {
                let current = dependency
                    .version
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "?".to_string());
                if updated.len() > 1 {
                    write!(
                        f,
                        "{}: {} -> {} ({} dependencies move together)",
                        dependency.name,
                        current,
                        target,
                        updated.len()
                    )
                } else {
                    write!(f, "{}: {} -> {}", dependency.name, current, target)
                }
            }
            CheckOutcome::UpToDate { dependency, reason } => {
                write!(f, "{}: up to date ({})", dependency.name, reason)
            }
            CheckOutcome::Failed { dependency, error } => {
                write!(f, "{}: failed ({})", dependency.name, error)
            }
        }
    }
}
