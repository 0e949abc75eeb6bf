//! # cmd-timer Library
//!
//! Repeatedly run an external command, time each invocation, and summarise
//! the distribution of wall-clock durations.
//!
//! ## Architecture Overview
//!
//! The library is organized into several key modules:
//!
//! - `cli`: Command-line parsing and the immutable `RunConfig`
//! - `executor`: The `CommandExecutor` seam and the process-spawning executor
//! - `benchmark`: The dispatcher that spreads iterations over workers
//! - `metrics`: Concurrent sample collection and summary statistics
//! - `results`: Report model with table and JSON renderers
//! - `utils`: Time units, column alignment and histogram bars
//! - `logging`: Colourised `tracing` event formatter
//! - `errors`: The `TimerError` taxonomy
//!
//! Data flows from the dispatcher through the executors into the collector,
//! and from the finalized sample into statistics and the report. Nothing is
//! reported until every iteration has completed.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cmd_timer::{BenchmarkRunner, ProcessExecutor, RunConfig, RunReport, SummaryStats};
//! use cmd_timer::results::ReportFormat;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig::new(vec!["true".to_string()], 10, 2, true)?;
//!     let runner = BenchmarkRunner::new(config.clone(), ProcessExecutor::from_config(&config));
//!     let outcome = runner.run().await?;
//!
//!     let stats = SummaryStats::from_sample(outcome.sample)?;
//!     let report = RunReport::new(config, &stats, outcome.total);
//!     print!("{}", report.render(ReportFormat::Table)?);
//!     Ok(())
//! }
//! ```

/// Dispatcher for a timing run
///
/// Issues the configured number of execution tasks over a bounded channel to
/// a pool of workers and waits for all of them before returning the sample.
pub mod benchmark;

/// Command-line interface and run configuration
pub mod cli;

pub mod errors;

/// Single-invocation command execution
pub mod executor;

pub mod logging;

/// Sample collection and summary statistics
///
/// Provides:
/// - A mutex-guarded collector safe to share between workers
/// - Mean, sample standard deviation and interpolated quantiles
/// - Equal-width histogram bucketing
pub mod metrics;

/// Report model and rendering
pub mod results;

pub mod utils;

pub use benchmark::{BenchmarkRunner, RunOutcome};
pub use cli::{Args, RunConfig};
pub use errors::TimerError;
pub use executor::{CommandExecutor, ProcessExecutor};
pub use metrics::{HistogramBucket, Sample, SampleCollector, SummaryStats};
pub use results::RunReport;

/// The current version of cmd-timer, embedded in JSON reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Default number of concurrent workers
    ///
    /// A single worker keeps invocations strictly sequential, which gives the
    /// least noisy timings.
    pub const PARALLELISM: usize = 1;

    /// Upper bound on histogram buckets; small samples use one per value
    pub const HISTOGRAM_MAX_BUCKETS: usize = 8;

    /// Width in cells of the fullest histogram bar
    pub const HISTOGRAM_BAR_WIDTH: usize = 16;

    /// Decimal places for scaled figures
    pub const DISPLAY_PRECISION: usize = 3;

    /// Spaces between report columns
    pub const COLUMN_PADDING: usize = 4;
}
