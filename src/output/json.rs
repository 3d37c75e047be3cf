//! JSON output formatter for machine processing

use crate::domain::{CheckOutcome, CheckSummary};
use crate::orchestrator::OrchestratorResult;
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Ecosystem that was checked
    package_manager: String,
    /// Summary statistics
    summary: JsonSummary,
    /// One entry per checked dependency
    outcomes: &'a [CheckOutcome],
    /// Hard errors encountered
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    /// Number of dependencies with an available update
    updates: usize,
    /// Number of dependencies already up to date
    up_to_date: usize,
    /// Number of dependencies whose resolution failed
    failed: usize,
    /// Number of manifest declarations that would be rewritten
    rewritten_declarations: usize,
}

impl JsonSummary {
    fn from_summary(summary: &CheckSummary) -> Self {
        Self {
            updates: summary.update_count(),
            up_to_date: summary.up_to_date_count(),
            failed: summary.failure_count(),
            rewritten_declarations: summary.rewritten_declaration_count(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            package_manager: result.summary.package_manager.to_string(),
            summary: JsonSummary::from_summary(&result.summary),
            outcomes: &result.summary.outcomes,
            errors: result.errors.clone(),
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, PackageManager, PackageVersion, Requirement, UpToDateReason};

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    fn render(result: &OrchestratorResult) -> serde_json::Value {
        let formatter = JsonFormatter::new();
        let mut out = Vec::new();
        formatter.format(result, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    fn sample_result() -> OrchestratorResult {
        let mut summary = CheckSummary::new(PackageManager::Nuget);
        let dep = Dependency::new(
            "Serilog",
            Some(v("2.10.0")),
            vec![Requirement::new("2.10.0", "app.csproj")],
            PackageManager::Nuget,
        );
        let updated = dep.updated(v("3.0.1"), vec![Requirement::new("3.0.1", "app.csproj")]);
        summary.add_outcome(CheckOutcome::update(dep.clone(), v("3.0.1"), vec![updated]));
        summary.add_outcome(CheckOutcome::up_to_date(
            dep.clone().transitive(),
            UpToDateReason::Transitive,
        ));
        OrchestratorResult {
            summary,
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_json_shape() {
        let value = render(&sample_result());
        assert_eq!(value["package_manager"], "NuGet");
        assert_eq!(value["summary"]["updates"], 1);
        assert_eq!(value["summary"]["up_to_date"], 1);
        assert_eq!(value["summary"]["failed"], 0);
        assert_eq!(value["summary"]["rewritten_declarations"], 1);
        assert_eq!(value["outcomes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_update_outcome_fields() {
        let value = render(&sample_result());
        let update = &value["outcomes"][0];
        assert_eq!(update["type"], "update");
        assert_eq!(update["target"], "3.0.1");
        let moved = &update["updated"][0];
        assert_eq!(moved["version"], "3.0.1");
        assert_eq!(moved["previous_version"], "2.10.0");
        assert_eq!(moved["requirements"][0]["spec"], "3.0.1");
        assert_eq!(moved["previous_requirements"][0]["spec"], "2.10.0");
    }

    #[test]
    fn test_errors_omitted_when_empty() {
        let value = render(&sample_result());
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_errors_included_when_present() {
        let mut result = sample_result();
        result.errors.push("X: index unreachable".to_string());
        let value = render(&result);
        assert_eq!(value["errors"][0], "X: index unreachable");
    }
}
