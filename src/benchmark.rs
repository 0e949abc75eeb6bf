//! # Benchmark Engine Module
//!
//! This module contains the dispatcher that drives a timing run: it issues
//! exactly `iterations` execution tasks, spreads them over `parallelism`
//! workers, records every measured duration into a shared
//! [`SampleCollector`], and returns only once every worker has finished.
//!
//! ## Execution Model
//!
//! 1. **Producer**: a task sends `iterations` fungible [`ExecutionTask`]s into
//!    a bounded channel, then drops its sender to close the stream.
//! 2. **Workers**: `parallelism` tasks in a [`JoinSet`] share the receiving
//!    end. Each worker takes one task at a time, runs the executor, records
//!    the duration, and exits when the channel is closed and drained.
//! 3. **Barrier**: the runner drains the `JoinSet`; the collector is
//!    finalized only after the last worker has released its handle.
//!
//! When there are fewer tasks than workers the surplus workers find the
//! channel closed and exit without running anything.
//!
//! ## Failure Handling
//!
//! The first worker error ends the run. The runner returns that error right
//! away and drops the `JoinSet`, which stops the remaining workers at their
//! next suspension point. Commands already running on blocking threads are
//! not killed; they finish on their own and their measurements are dropped
//! together with the collector. There is no per-command timeout, so a
//! command that never exits stalls the run.

use crate::{
    cli::RunConfig,
    errors::TimerError,
    executor::CommandExecutor,
    metrics::{Sample, SampleCollector},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Instruction to invoke the command once. Tasks carry no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionTask;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Every measured duration, in completion order
    pub sample: Sample,
    /// Wall-clock time from the first task being issued to the last worker
    /// joining
    pub total: Duration,
}

type TaskReceiver = Arc<Mutex<mpsc::Receiver<ExecutionTask>>>;

/// Dispatcher for one timing run
///
/// Owns the immutable [`RunConfig`] and the executor used by every worker.
pub struct BenchmarkRunner<E> {
    config: RunConfig,
    executor: Arc<E>,
}

impl<E> BenchmarkRunner<E>
where
    E: CommandExecutor + 'static,
{
    pub fn new(config: RunConfig, executor: E) -> Self {
        Self {
            config,
            executor: Arc::new(executor),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run all iterations and collect their durations.
    ///
    /// ## Returns
    /// - `Ok(RunOutcome)`: exactly `iterations` samples and the total time
    /// - `Err(TimerError)`: the first execution failure; no samples are
    ///   returned in that case
    pub async fn run(&self) -> Result<RunOutcome, TimerError> {
        let iterations = self.config.iterations();
        let parallelism = self.config.parallelism();

        info!(
            "Running `{}` {} times with {} worker(s)",
            self.config.command_line(),
            iterations,
            parallelism
        );
        if parallelism > iterations {
            warn!(
                "{} worker(s) will stay idle: parallelism exceeds iterations",
                parallelism - iterations
            );
        }
        let cores = num_cpus::get();
        if parallelism > cores {
            warn!(
                "Parallelism {} exceeds the {} available CPU cores; timings will include scheduling contention",
                parallelism, cores
            );
        }

        let collector = Arc::new(SampleCollector::with_capacity(iterations));
        let (sender, receiver) = mpsc::channel::<ExecutionTask>(parallelism);
        let receiver: TaskReceiver = Arc::new(Mutex::new(receiver));

        let start = Instant::now();

        let producer = tokio::spawn(async move {
            for _ in 0..iterations {
                // The receiver only disappears when the run is being torn down.
                if sender.send(ExecutionTask).await.is_err() {
                    break;
                }
            }
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..parallelism {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&receiver),
                Arc::clone(&self.executor),
                Arc::clone(&collector),
            ));
        }
        drop(receiver);

        while let Some(joined) = workers.join_next().await {
            let outcome = joined
                .map_err(|e| TimerError::WorkerJoin {
                    detail: e.to_string(),
                })
                .and_then(|result| result);

            if let Err(e) = outcome {
                warn!("Aborting run: {}", e);
                producer.abort();
                workers.abort_all();
                return Err(e);
            }
        }

        producer.await.map_err(|e| TimerError::WorkerJoin {
            detail: e.to_string(),
        })?;
        let total = start.elapsed();

        let collector = Arc::try_unwrap(collector).map_err(|_| TimerError::CollectorInUse)?;
        let sample = collector.finalize();

        debug!("Collected {} samples in {:?}", sample.len(), total);
        Ok(RunOutcome { sample, total })
    }
}

/// Pull tasks until the channel is closed, timing each one.
///
/// Returns the number of tasks this worker executed.
async fn run_worker<E>(
    worker_id: usize,
    receiver: TaskReceiver,
    executor: Arc<E>,
    collector: Arc<SampleCollector>,
) -> Result<usize, TimerError>
where
    E: CommandExecutor + 'static,
{
    let mut executed = 0;

    loop {
        // Hold the lock only while waiting for the next task.
        let task = receiver.lock().await.recv().await;
        let Some(ExecutionTask) = task else {
            break;
        };

        let took = executor.execute().await?;
        collector.record(took);
        executed += 1;
    }

    debug!("Worker {} finished after {} task(s)", worker_id, executed);
    Ok(executed)
}
