//! # cmd-timer - Main Entry Point
//!
//! Parses the command line, runs the timing harness and prints the report.
//!
//! ## Error Handling
//!
//! Every failure travels back here as a value. Configuration errors exit
//! with status 2 before anything runs; execution failures exit with status 1
//! without printing statistics. The process exits directly instead of
//! unwinding the runtime, so commands still running on sibling workers are
//! left to finish on their own.

use anyhow::{Context, Result};
use clap::Parser;
use cmd_timer::{
    cli::{Args, RunConfig},
    errors::{TimerError, EXIT_EXECUTION_ERROR},
    logging,
    results::{ReportFormat, RunReport},
    BenchmarkRunner, ProcessExecutor, SummaryStats,
};
use std::io::Write;
use std::process;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(err) = run(&args).await {
        eprintln!("cmd-timer: {:#}", err);
        let code = err
            .downcast_ref::<TimerError>()
            .map(TimerError::exit_code)
            .unwrap_or(EXIT_EXECUTION_ERROR);
        process::exit(code);
    }
}

async fn run(args: &Args) -> Result<()> {
    debug!("Arguments: {:?}", args);

    let config = RunConfig::from_args(args)?;
    let executor = ProcessExecutor::from_config(&config);
    let runner = BenchmarkRunner::new(config.clone(), executor);

    let outcome = runner.run().await?;
    info!("Run completed in {:?}", outcome.total);

    let format = if config.json_report() {
        ReportFormat::Json
    } else {
        ReportFormat::Table
    };

    let stats = SummaryStats::from_sample(outcome.sample)?;
    let report = RunReport::new(config, &stats, outcome.total);
    let rendered = report.render(format)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write report to stdout")?;

    Ok(())
}
