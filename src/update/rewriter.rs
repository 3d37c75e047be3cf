//! Requirement rewriting
//!
//! Produces updated requirement entries for a target version while
//! preserving each declaration's syntax family: a bare minimum stays a
//! bare minimum, a pin stays a pin, an interval keeps its brackets, a
//! wildcard keeps its wildcard. A requirement whose syntax cannot be
//! recognized is a hard error; skipping it silently would leave some
//! declaration sites on the old version.

use crate::domain::{
    IntervalBound, PackageVersion, Requirement, RequirementSource, RequirementSpec,
};
use crate::error::RequirementError;

/// Rewrites a dependency's requirement entries to a target version
pub struct RequirementsUpdater<'a> {
    requirements: &'a [Requirement],
    target: &'a PackageVersion,
    source: Option<RequirementSource>,
}

impl<'a> RequirementsUpdater<'a> {
    /// Creates an updater for one dependency's declarations
    pub fn new(
        requirements: &'a [Requirement],
        target: &'a PackageVersion,
        source: Option<RequirementSource>,
    ) -> Self {
        Self {
            requirements,
            target,
            source,
        }
    }

    /// Returns every requirement rewritten to the target version, with
    /// non-version metadata carried over unchanged
    pub fn updated_requirements(&self) -> Result<Vec<Requirement>, RequirementError> {
        self.requirements
            .iter()
            .map(|requirement| self.update_one(requirement))
            .collect()
    }

    fn update_one(&self, requirement: &Requirement) -> Result<Requirement, RequirementError> {
        // An empty spec means the declaration site names the package
        // without a version; there is nothing to rewrite.
        if requirement.spec.trim().is_empty() {
            return Ok(requirement.clone());
        }

        // A spec that still contains a property placeholder carries no
        // concrete version; the placeholder's value moves elsewhere.
        if requirement.has_unresolved_property() {
            return Ok(requirement.clone());
        }

        let spec = RequirementSpec::parse(&requirement.spec).ok_or_else(|| {
            RequirementError::unsupported(&requirement.spec, "unrecognized requirement syntax")
        })?;

        let mut updated = requirement.clone();
        updated.spec = self.rewrite(&spec);
        if let Some(source) = &self.source {
            updated.source = Some(source.clone());
        }
        Ok(updated)
    }

    fn rewrite(&self, spec: &RequirementSpec) -> String {
        match spec {
            RequirementSpec::Bare(_) => self.target.to_string(),
            RequirementSpec::Pinned(_) => format!("[{}]", self.target),
            RequirementSpec::Wildcard { prefix } => self.rewrite_wildcard(prefix),
            RequirementSpec::Interval { floor, ceiling } => self.rewrite_interval(floor, ceiling),
        }
    }

    fn rewrite_wildcard(&self, prefix: &[u64]) -> String {
        if prefix.is_empty() {
            // `*` already admits the target.
            return "*".to_string();
        }
        let segments = self.target.release_segments();
        let rewritten: Vec<String> = (0..prefix.len())
            .map(|i| segments.get(i).copied().unwrap_or(0).to_string())
            .collect();
        format!("{}.*", rewritten.join("."))
    }

    fn rewrite_interval(
        &self,
        floor: &Option<IntervalBound>,
        ceiling: &Option<IntervalBound>,
    ) -> String {
        let target_fits_ceiling = match ceiling {
            Some(bound) => {
                if bound.inclusive {
                    *self.target <= bound.version
                } else {
                    *self.target < bound.version
                }
            }
            None => true,
        };

        if target_fits_ceiling {
            // Raise the floor to the target, keeping the bracket style.
            let open = match floor {
                Some(bound) if !bound.inclusive => "(",
                _ => "[",
            };
            let close = render_ceiling(ceiling);
            format!("{}{},{}", open, self.target, close)
        } else {
            // The range can no longer contain the target: widen minimally
            // by giving it an inclusive ceiling at the target.
            let open = match floor {
                Some(bound) => {
                    let bracket = if bound.inclusive { "[" } else { "(" };
                    format!("{}{}", bracket, bound.version)
                }
                None => "(".to_string(),
            };
            format!("{},{}]", open, self.target)
        }
    }
}

fn render_ceiling(ceiling: &Option<IntervalBound>) -> String {
    match ceiling {
        Some(bound) => {
            let bracket = if bound.inclusive { "]" } else { ")" };
            format!("{}{}", bound.version, bracket)
        }
        None => ")".to_string(),
    }
}
