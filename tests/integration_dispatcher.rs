use anyhow::Result;
use async_trait::async_trait;
use cmd_timer::{BenchmarkRunner, CommandExecutor, RunConfig, SummaryStats, TimerError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Executor that sleeps for a scripted duration and tracks concurrency.
///
/// The n-th call (across all workers) takes `durations[n % len]`.
struct ScriptedExecutor {
    durations: Vec<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl ScriptedExecutor {
    fn new(durations: Vec<Duration>) -> Self {
        Self {
            durations,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self) -> Result<Duration, TimerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let took = self.durations[call % self.durations.len()];
        tokio::time::sleep(took).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on_call == Some(call) {
            return Err(TimerError::Spawn {
                command: "scripted".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "scripted failure"),
            });
        }
        Ok(took)
    }
}

fn config(iterations: usize, parallelism: usize) -> RunConfig {
    RunConfig::new(vec!["scripted".to_string()], iterations, parallelism, true).unwrap()
}

fn millis(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|&ms| Duration::from_millis(ms)).collect()
}

/// Every successful run yields exactly one sample per iteration, whatever
/// the worker count.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sample_size_is_independent_of_parallelism() -> Result<()> {
    for iterations in [1usize, 5, 23] {
        for parallelism in [1usize, 2, 4, 7, 32] {
            let executor = ScriptedExecutor::new(millis(&[1, 3, 2]));
            let runner = BenchmarkRunner::new(config(iterations, parallelism), executor);

            let outcome = runner.run().await?;
            assert_eq!(
                outcome.sample.len(),
                iterations,
                "iterations={} parallelism={}",
                iterations,
                parallelism
            );
        }
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_never_exceeds_parallelism() -> Result<()> {
    let executor = Arc::new(ScriptedExecutor::new(millis(&[5])));
    let runner = BenchmarkRunner::new(config(24, 3), SharedExecutor(Arc::clone(&executor)));

    let outcome = runner.run().await?;
    assert_eq!(outcome.sample.len(), 24);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 24);
    let peak = executor.peak_in_flight.load(Ordering::SeqCst);
    assert!((1..=3).contains(&peak), "peak in-flight was {}", peak);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_workers_overlap_executions() -> Result<()> {
    let executor = Arc::new(ScriptedExecutor::new(millis(&[50])));
    let runner = BenchmarkRunner::new(config(4, 4), SharedExecutor(Arc::clone(&executor)));

    let outcome = runner.run().await?;
    // Four 50ms runs on four workers finish well before 200ms.
    assert!(outcome.total < Duration::from_millis(190), "took {:?}", outcome.total);
    assert!(outcome.total >= Duration::from_millis(50));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn statistics_do_not_depend_on_completion_order() -> Result<()> {
    let durations = millis(&[9, 1, 6, 3, 7, 2, 8, 4]);

    let sequential = BenchmarkRunner::new(config(8, 1), ScriptedExecutor::new(durations.clone()))
        .run()
        .await?;
    let parallel = BenchmarkRunner::new(config(8, 8), ScriptedExecutor::new(durations))
        .run()
        .await?;

    let a = SummaryStats::from_sample(sequential.sample)?;
    let b = SummaryStats::from_sample(parallel.sample)?;
    assert_eq!(a.values(), b.values());
    assert_eq!(a.median(), b.median());
    assert_eq!(a.std_dev(), b.std_dev());
    assert_eq!(a.quantile(0.25), b.quantile(0.25));
    assert!((a.mean() - b.mean()).abs() < 1e-12);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn first_failure_aborts_the_run() {
    let executor = ScriptedExecutor::new(millis(&[2])).failing_on(3);
    let runner = BenchmarkRunner::new(config(50, 2), executor);

    let err = runner.run().await.unwrap_err();
    assert!(matches!(err, TimerError::Spawn { .. }));
    assert!(err.to_string().contains("scripted failure"));
}

#[tokio::test]
async fn failure_on_first_call_with_single_worker() {
    let executor = Arc::new(ScriptedExecutor::new(millis(&[1])).failing_on(0));
    let runner = BenchmarkRunner::new(config(3, 1), SharedExecutor(Arc::clone(&executor)));

    assert!(runner.run().await.is_err());
    // No further tasks are picked up after the failure.
    assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
}

/// Lets a test keep a handle on the executor it gives to the runner.
struct SharedExecutor(Arc<ScriptedExecutor>);

#[async_trait]
impl CommandExecutor for SharedExecutor {
    async fn execute(&self) -> Result<Duration, TimerError> {
        self.0.execute().await
    }
}
