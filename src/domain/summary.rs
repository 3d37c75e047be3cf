//! Aggregated results for one check request

use super::{CheckOutcome, PackageManager};
use serde::{Deserialize, Serialize};

/// Outcomes for every dependency in a check request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Ecosystem the request was for
    pub package_manager: PackageManager,
    /// One outcome per checked dependency, in request order
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckSummary {
    /// Creates an empty summary
    pub fn new(package_manager: PackageManager) -> Self {
        Self {
            package_manager,
            outcomes: Vec::new(),
        }
    }

    /// Records an outcome
    pub fn add_outcome(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of dependencies with an available update
    pub fn update_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_update()).count()
    }

    /// Number of dependencies reported up to date
    pub fn up_to_date_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_up_to_date()).count()
    }

    /// Number of dependencies whose resolution failed
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// All update outcomes
    pub fn updates(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| o.is_update())
    }

    /// All failed outcomes
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    /// Total number of manifest declarations that would be rewritten
    pub fn rewritten_declaration_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                CheckOutcome::Update { updated, .. } => {
                    Some(updated.iter().map(|d| d.requirements.len()).sum::<usize>())
                }
                _ => None,
            })
            .sum()
    }
}
