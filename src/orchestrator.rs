//! Check orchestrator for coordinating a whole request
//!
//! This module provides:
//! - workflow coordination: load request -> build context -> check each
//!   dependency -> summarize
//! - per-dependency error containment: a hard failure on one dependency
//!   is recorded and never aborts the others
//! - offline runs against a pre-fetched catalog

use crate::cli::CliArgs;
use crate::domain::{CheckOutcome, CheckSummary};
use crate::error::{CheckError, InputError};
use crate::input::{load_advisories, parse_ignore_arg, CheckRequest};
use crate::progress::Progress;
use crate::registry::{create_index, HttpClient, InMemoryIndex, PackageIndex};
use crate::update::{ResolutionContext, UpdateChecker};
use std::sync::Arc;

/// Coordinates checking every dependency in a request
pub struct Orchestrator {
    args: CliArgs,
}

/// Result of running the orchestrator
#[derive(Debug)]
pub struct OrchestratorResult {
    /// Outcomes for every dependency
    pub summary: CheckSummary,
    /// Hard errors encountered along the way, one message per failure
    pub errors: Vec<String>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given CLI arguments
    pub fn new(args: CliArgs) -> Self {
        Self { args }
    }

    /// Run the check workflow
    pub async fn run(&self) -> Result<OrchestratorResult, CheckError> {
        let request = self.load_request()?;
        let index = self.build_index(&request)?;
        self.run_request(request, index).await
    }

    /// Load the request file and fold in CLI-supplied advisories and
    /// ignore ranges
    fn load_request(&self) -> Result<CheckRequest, CheckError> {
        let mut request = CheckRequest::from_file(&self.args.request)?;

        if let Some(path) = &self.args.advisories {
            request.merge_advisories(load_advisories(path)?);
        }
        for arg in &self.args.ignore {
            let (package, range) = parse_ignore_arg(arg)?;
            request.add_ignored_version(package, range);
        }

        Ok(request)
    }

    /// Pick the version catalog: the request's own when present, the
    /// registry otherwise
    fn build_index(&self, request: &CheckRequest) -> Result<Arc<dyn PackageIndex>, CheckError> {
        if request.has_prefetched_catalog() {
            return Ok(Arc::new(InMemoryIndex::from_catalog(
                request.package_manager,
                request.known_versions.clone(),
            )));
        }
        if self.args.offline {
            return Err(InputError::MissingCatalog {
                path: self.args.request.clone(),
            }
            .into());
        }
        let client = HttpClient::new()?;
        Ok(create_index(request.package_manager, client).into())
    }

    async fn run_request(
        &self,
        request: CheckRequest,
        index: Arc<dyn PackageIndex>,
    ) -> Result<OrchestratorResult, CheckError> {
        let mut summary = CheckSummary::new(request.package_manager);
        let mut errors = Vec::new();

        let dependencies = request.dependencies.clone();
        let mut context = ResolutionContext::new(request.package_manager, dependencies, index)
            .with_advisories(request.advisories);
        context.ignored_versions = request.ignored_versions;
        let context = Arc::new(context);

        let progress = Progress::new(
            self.args.show_progress(),
            context.dependencies.len() as u64,
        );

        for dependency in &context.dependencies {
            progress.checking(&dependency.name);
            let checker = UpdateChecker::new(dependency.clone(), Arc::clone(&context));

            // One dependency failing hard must not abort the rest; the
            // group-failure rule only applies inside a property group.
            match checker.check().await {
                Ok(outcome) => summary.add_outcome(outcome),
                Err(e) => {
                    errors.push(format!("{}: {}", dependency.name, e));
                    summary.add_outcome(CheckOutcome::failed(dependency.clone(), e.to_string()));
                }
            }
            progress.inc();
        }
        progress.finish();

        Ok(OrchestratorResult { summary, errors })
    }
}
