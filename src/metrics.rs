use crate::errors::TimerError;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;

/// Unordered multiset of per-invocation durations, in seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    pub fn from_seconds(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

/// Thread-safe accumulator shared by all workers of a run
pub struct SampleCollector {
    samples: Mutex<Vec<f64>>,
}

impl SampleCollector {
    /// Create a collector sized for the expected number of samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Record one measurement. Safe to call from any worker.
    pub fn record(&self, duration: Duration) {
        self.samples.lock().push(duration.as_secs_f64());
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand the accumulated sample over for exclusive use.
    ///
    /// Consumes the collector, so it can only be reached once every worker
    /// has released its handle.
    pub fn finalize(self) -> Sample {
        Sample::from_seconds(self.samples.into_inner())
    }
}

/// One equal-width histogram bucket.
///
/// Buckets are half-open `[lower, upper)` except the last one of a
/// histogram, which also contains `upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBucket {
    /// Same bucket with both bounds passed through `f`.
    pub fn map_bounds(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            lower: f(self.lower),
            upper: f(self.upper),
            count: self.count,
        }
    }
}

/// Summary statistics over a finalized sample
///
/// Holds the sorted values so that quantiles and histograms can be computed
/// on demand. The standard deviation is the sample (Bessel-corrected, N-1)
/// variant; a single observation has a deviation of exactly zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    sorted: Vec<f64>,
    mean: f64,
    std_dev: f64,
}

impl SummaryStats {
    /// Take ownership of a sample, sort it and compute moments
    pub fn from_sample(sample: Sample) -> Result<Self, TimerError> {
        if sample.is_empty() {
            return Err(TimerError::EmptySample);
        }

        let mut sorted = sample.into_inner();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / count;

        let std_dev = if sorted.len() < 2 {
            0.0
        } else {
            let variance =
                sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1.0);
            variance.sqrt()
        };

        Ok(Self {
            sorted,
            mean,
            std_dev,
        })
    }

    pub fn count(&self) -> usize {
        self.sorted.len()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Sorted values, ascending.
    pub fn values(&self) -> &[f64] {
        &self.sorted
    }

    /// Linearly interpolated quantile at fractional index `q * (n - 1)`.
    ///
    /// `q` is clamped to `[0, 1]`.
    pub fn quantile(&self, q: f64) -> f64 {
        let q = if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) };
        let index = q * (self.sorted.len() - 1) as f64;
        let lower_index = index.floor() as usize;
        let upper_index = index.ceil() as usize;

        if lower_index == upper_index {
            self.sorted[lower_index]
        } else {
            let lower_value = self.sorted[lower_index];
            let upper_value = self.sorted[upper_index];
            let weight = index - lower_index as f64;
            lower_value + weight * (upper_value - lower_value)
        }
    }

    /// Count values into `bucket_count` equal-width buckets over `[min, max]`.
    ///
    /// A sample with no spread collapses to one bucket holding everything.
    pub fn histogram(&self, bucket_count: usize) -> Vec<HistogramBucket> {
        let min = self.min();
        let max = self.max();
        let bucket_count = bucket_count.max(1);

        if max <= min {
            return vec![HistogramBucket {
                lower: min,
                upper: max,
                count: self.sorted.len(),
            }];
        }

        let width = (max - min) / bucket_count as f64;
        let mut buckets: Vec<HistogramBucket> = (0..bucket_count)
            .map(|i| HistogramBucket {
                lower: min + width * i as f64,
                upper: if i + 1 == bucket_count {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        // Index against the emitted bounds so counts always match the ranges.
        for &value in &self.sorted {
            let index = buckets
                .partition_point(|bucket| bucket.upper <= value)
                .min(bucket_count - 1);
            buckets[index].count += 1;
        }

        buckets
    }
}

/// Number of histogram buckets to request for a sample of `n` values
pub fn bucket_count_for(n: usize) -> usize {
    n.clamp(1, crate::defaults::HISTOGRAM_MAX_BUCKETS)
}
