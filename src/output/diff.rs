//! Diff output showing requirement rewrites
//!
//! For every updated dependency, prints the declaration sites with the
//! old requirement removed and the new requirement added, grouped by
//! file, so the caller can eyeball exactly what a file writer would do.

use crate::domain::CheckOutcome;
use crate::orchestrator::OrchestratorResult;
use crate::output::OutputFormatter;
use colored::Colorize;
use std::io::Write;

/// Diff formatter for requirement rewrites
pub struct DiffFormatter;

impl DiffFormatter {
    /// Create a new diff formatter
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiffFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for DiffFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        for outcome in result.summary.updates() {
            let CheckOutcome::Update { updated, .. } = outcome else {
                continue;
            };

            for dependency in updated {
                let previous = dependency
                    .previous_version
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let current = dependency
                    .version
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "?".to_string());
                writeln!(
                    writer,
                    "{} {} -> {}",
                    dependency.name.bold(),
                    previous,
                    current
                )?;

                let empty = Vec::new();
                let old_requirements =
                    dependency.previous_requirements.as_ref().unwrap_or(&empty);
                for (old, new) in old_requirements.iter().zip(&dependency.requirements) {
                    if old.spec == new.spec {
                        continue;
                    }
                    writeln!(writer, "  {}", format!("- {} ({})", old.spec, old.file).red())?;
                    writeln!(writer, "  {}", format!("+ {} ({})", new.spec, new.file).green())?;
                }
            }
        }
        Ok(())
    }
}
