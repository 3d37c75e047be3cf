//! CLI argument parsing module for depbump

use clap::Parser;
use std::path::PathBuf;

/// Dependency update decision engine
///
/// Reads a check request (parsed dependencies, advisories, ignore ranges,
/// optionally a pre-fetched version catalog) and reports which
/// dependencies can move, which peers move with them, and the rewritten
/// requirements.
#[derive(Parser, Debug, Clone)]
#[command(name = "depbump", version, about = "Dependency update decision engine")]
pub struct CliArgs {
    /// Check request file (JSON)
    pub request: PathBuf,

    /// Additional advisory feed file (JSON array), merged into the request
    #[arg(long)]
    pub advisories: Option<PathBuf>,

    /// Additional ignore range, as NAME=RANGE (repeatable)
    #[arg(long = "ignore", value_name = "NAME=RANGE")]
    pub ignore: Vec<String>,

    /// Never query a registry; the request must carry known_versions
    #[arg(long)]
    pub offline: bool,

    // Output options
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Show requirement diffs for each update
    #[arg(long)]
    pub diff: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Returns true when progress display should be shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
