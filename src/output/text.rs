//! Text output formatter for human-readable display
//!
//! This module provides:
//! - per-dependency update lines with semantic change type
//! - group updates flagged with the set of dependencies that move
//! - up-to-date and failure sections
//! - a closing summary line

use crate::domain::{CheckOutcome, PackageVersion};
use crate::orchestrator::OrchestratorResult;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn between(old: &PackageVersion, new: &PackageVersion) -> Self {
        let old_segments = old.release_segments();
        let new_segments = new.release_segments();
        let segment = |s: &[u64], i: usize| s.get(i).copied().unwrap_or(0);

        if segment(old_segments, 0) != segment(new_segments, 0) {
            VersionChangeType::Major
        } else if segment(old_segments, 1) != segment(new_segments, 1) {
            VersionChangeType::Minor
        } else {
            VersionChangeType::Patch
        }
    }

    fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
        }
    }
}

/// Text formatter for terminal display
pub struct TextFormatter {
    verbosity: Verbosity,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn write_update(
        &self,
        outcome: &CheckOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let CheckOutcome::Update {
            dependency,
            target,
            updated,
        } = outcome
        else {
            return Ok(());
        };

        let change = dependency
            .version
            .as_ref()
            .map(|current| VersionChangeType::between(current, target));
        let change_label = match change {
            Some(VersionChangeType::Major) => format!("({})", "major".red()),
            Some(VersionChangeType::Minor) => format!("({})", "minor".yellow()),
            Some(VersionChangeType::Patch) => format!("({})", "patch".green()),
            None => String::new(),
        };
        let current = dependency
            .version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "?".to_string());

        writeln!(
            writer,
            "  {} {} -> {} {}",
            dependency.name.bold(),
            current,
            target.to_string().cyan(),
            change_label
        )?;

        if updated.len() > 1 {
            let names: Vec<&str> = updated.iter().map(|d| d.name.as_str()).collect();
            writeln!(
                writer,
                "    moves together: {}",
                names.join(", ").dimmed()
            )?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let summary = &result.summary;

        if summary.update_count() > 0 {
            writeln!(writer, "{}", "Updates available:".bold())?;
            for outcome in summary.updates() {
                self.write_update(outcome, writer)?;
            }
        }

        if matches!(self.verbosity, Verbosity::Verbose) {
            let up_to_date: Vec<&CheckOutcome> = summary
                .outcomes
                .iter()
                .filter(|o| o.is_up_to_date())
                .collect();
            if !up_to_date.is_empty() {
                writeln!(writer, "{}", "Up to date:".bold())?;
                for outcome in up_to_date {
                    if let CheckOutcome::UpToDate { dependency, reason } = outcome {
                        writeln!(writer, "  {} ({})", dependency.name, reason)?;
                    }
                }
            }
        }

        if summary.failure_count() > 0 {
            writeln!(writer, "{}", "Failed:".bold())?;
            for outcome in summary.failures() {
                if let CheckOutcome::Failed { dependency, error } = outcome {
                    writeln!(writer, "  {} ({})", dependency.name, error.red())?;
                }
            }
        }

        if !matches!(self.verbosity, Verbosity::Quiet) {
            writeln!(
                writer,
                "{} to update, {} up to date, {} failed",
                summary.update_count(),
                summary.up_to_date_count(),
                summary.failure_count()
            )?;
        }
        Ok(())
    }
}
