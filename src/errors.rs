//! Error taxonomy for a timing run.
//!
//! Configuration errors are raised before anything executes. Execution
//! errors are raised by a worker and abort the whole run. Both travel back
//! to `main` as values; nothing below the binary terminates the process.

use std::process::ExitStatus;

/// Exit code used for configuration and usage errors (matches clap).
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code used for execution failures.
pub const EXIT_EXECUTION_ERROR: i32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum TimerError {
    #[error("iterations (-n) must be provided and greater than zero")]
    MissingIterations,

    #[error("parallelism (-p) must be greater than zero")]
    InvalidParallelism,

    #[error("a command to run must be provided")]
    MissingCommand,

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("command execution failed: `{command}` exited with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("worker terminated abnormally: {detail}")]
    WorkerJoin { detail: String },

    #[error("sample collector is still shared with a running worker")]
    CollectorInUse,

    #[error("cannot compute statistics over an empty sample")]
    EmptySample,
}

impl TimerError {
    /// True for errors detected before any command was executed.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TimerError::MissingIterations
                | TimerError::InvalidParallelism
                | TimerError::MissingCommand
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            EXIT_CONFIG_ERROR
        } else {
            EXIT_EXECUTION_ERROR
        }
    }
}
