//! depbump - dependency update decision engine CLI
//!
//! Reads a check request produced by a manifest parser, resolves target
//! versions against a package index (or the request's own pre-fetched
//! catalog), and reports the update decisions.

use clap::Parser;
use depbump::cli::CliArgs;
use depbump::orchestrator::Orchestrator;
use depbump::output::{create_formatter, OutputConfig};
use std::io::{self, Write};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("depbump v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Request: {}", args.request.display());
        if args.offline {
            eprintln!("Mode: offline");
        }
    }

    let orchestrator = Orchestrator::new(args.clone());
    let result = orchestrator.run().await?;

    let output_config = OutputConfig::from_cli(args.json, args.diff, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if args.verbose && !result.errors.is_empty() {
        eprintln!();
        eprintln!("Errors encountered:");
        for error in &result.errors {
            eprintln!("  - {}", error);
        }
    }

    // Exit 2 when some dependencies could not be resolved; their failures
    // are already part of the report.
    if result.summary.failure_count() > 0 {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
