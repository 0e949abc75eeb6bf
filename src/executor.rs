//! # Command Execution
//!
//! The leaf of the timing pipeline: run the configured command once and
//! report how long it took. The [`CommandExecutor`] trait is the seam the
//! dispatcher depends on, so the scheduling logic can be exercised with
//! scripted executors instead of real processes.
//!
//! ## Timing Boundary
//!
//! [`ProcessExecutor`] waits for the child synchronously on a blocking
//! thread. The clock starts immediately before the spawn and stops as soon as
//! the child has been reaped, so the measured span covers process creation,
//! execution and teardown, and nothing else queued on the async runtime.

use crate::{cli::RunConfig, errors::TimerError};
use async_trait::async_trait;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Runs one invocation of the command under test.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute once, returning the elapsed wall-clock time on success.
    async fn execute(&self) -> Result<Duration, TimerError>;
}

/// Executor that spawns the configured external command.
#[derive(Clone, Debug)]
pub struct ProcessExecutor {
    program: String,
    args: Vec<String>,
    forward_stdout: bool,
    forward_stderr: bool,
}

impl ProcessExecutor {
    /// Executor that forwards both output streams unless `quiet`.
    pub fn new(program: impl Into<String>, args: Vec<String>, quiet: bool) -> Self {
        Self {
            program: program.into(),
            args,
            forward_stdout: !quiet,
            forward_stderr: !quiet,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        let mut executor = Self::new(
            config.program(),
            config.program_args().to_vec(),
            config.quiet(),
        );
        executor.forward_stdout = config.forwards_stdout();
        executor.forward_stderr = config.forwards_stderr();
        executor
    }

    fn output(forward: bool) -> Stdio {
        if forward {
            Stdio::inherit()
        } else {
            Stdio::null()
        }
    }

    fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Spawn, wait and time the child on the current thread.
    fn run_blocking(&self) -> Result<Duration, TimerError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Self::output(self.forward_stdout))
            .stderr(Self::output(self.forward_stderr));

        let start = Instant::now();
        let status = cmd.status().map_err(|source| TimerError::Spawn {
            command: self.command_line(),
            source,
        })?;
        let took = start.elapsed();

        trace!("{} finished with {} in {:?}", self.program, status, took);

        if !status.success() {
            return Err(TimerError::CommandFailed {
                command: self.command_line(),
                status,
            });
        }

        Ok(took)
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self) -> Result<Duration, TimerError> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.run_blocking())
            .await
            .map_err(|e| {
                debug!("blocking execution task failed: {}", e);
                TimerError::WorkerJoin {
                    detail: e.to_string(),
                }
            })?
    }
}
