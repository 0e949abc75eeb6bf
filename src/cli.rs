use crate::errors::TimerError;
use clap::Parser;
use serde::Serialize;

/// cmd-timer - Measure the performance of command execution
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "cmd-timer",
    version,
    about = "Measure the performance of command execution",
    long_about = None
)]
pub struct Args {
    /// Number of times to run the command
    #[clap(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Number of concurrent workers
    #[clap(short = 'p', long, default_value_t = crate::defaults::PARALLELISM)]
    pub parallelism: usize,

    /// Don't show command output
    #[clap(short = 'q', long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose diagnostics on stderr
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Print the report as JSON instead of a table
    #[clap(long, default_value_t = false)]
    pub json: bool,

    /// Command to time, followed by its arguments
    #[clap(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Immutable description of one timing run.
///
/// Built once from [`Args`] and handed to the dispatcher by value. Holding a
/// `RunConfig` means the invariants below have already been checked:
/// `iterations >= 1`, `parallelism >= 1` and a non-empty `command`.
///
/// A JSON report owns stdout, so selecting it stops the child's stdout from
/// being forwarded. The child's stderr is still forwarded unless `quiet`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    command: Vec<String>,
    iterations: usize,
    parallelism: usize,
    quiet: bool,
    json: bool,
}

impl RunConfig {
    pub fn new(
        command: Vec<String>,
        iterations: usize,
        parallelism: usize,
        quiet: bool,
    ) -> Result<Self, TimerError> {
        if iterations == 0 {
            return Err(TimerError::MissingIterations);
        }
        if parallelism == 0 {
            return Err(TimerError::InvalidParallelism);
        }
        if command.is_empty() || command[0].is_empty() {
            return Err(TimerError::MissingCommand);
        }

        Ok(Self {
            command,
            iterations,
            parallelism,
            quiet,
            json: false,
        })
    }

    /// Select the JSON report instead of the table.
    pub fn with_json_report(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Validate parsed arguments into a run configuration.
    ///
    /// An absent iteration count and an explicit zero are both reported as
    /// missing; neither can produce a sample.
    pub fn from_args(args: &Args) -> Result<Self, TimerError> {
        let iterations = args.iterations.ok_or(TimerError::MissingIterations)?;
        let config = Self::new(
            args.command.clone(),
            iterations,
            args.parallelism,
            args.quiet,
        )?;
        Ok(config.with_json_report(args.json))
    }

    pub fn program(&self) -> &str {
        &self.command[0]
    }

    pub fn program_args(&self) -> &[String] {
        &self.command[1..]
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// The command joined with spaces, as echoed in reports and diagnostics.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn json_report(&self) -> bool {
        self.json
    }

    /// Whether the child's stdout reaches ours.
    pub fn forwards_stdout(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Whether the child's stderr reaches ours.
    pub fn forwards_stderr(&self) -> bool {
        !self.quiet
    }
}
