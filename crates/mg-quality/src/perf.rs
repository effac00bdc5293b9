//! Mapper performance results: from live registry metrics or a benchmark run.
//!
//! [`MapperPerformanceResult::from_registry`] turns the counters every
//! [`Mapper`](mg_mapping::Mapper) keeps into gate input. [`PerformanceProbe`]
//! times individual calls instead, which also yields min/max/median and
//! standard deviation.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use mg_core::PerformanceGrade;
use mg_mapping::{MapperInfo, MapperRegistry, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::count_as_f64;

/// Latency and reliability of one mapper.
///
/// Times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperPerformanceResult {
    /// Mapper name, e.g. `CostCodeMapper`.
    pub mapper_name: String,
    /// Conversions measured.
    pub iterations: u64,
    /// Conversions that succeeded.
    pub success_count: u64,
    /// Conversions that failed.
    pub error_count: u64,
    /// Mean time per conversion.
    pub average_ms: f64,
    /// Fastest conversion.
    pub min_ms: f64,
    /// Slowest conversion.
    pub max_ms: f64,
    /// Median conversion time.
    pub median_ms: f64,
    /// Population standard deviation of conversion times.
    pub std_dev_ms: f64,
    /// `error_count / iterations`.
    pub error_rate: f64,
    /// Sum of all conversion times.
    pub total_time: Duration,
    /// When the measurement was taken.
    pub tested_at: DateTime<Utc>,
}

impl Default for MapperPerformanceResult {
    fn default() -> Self {
        Self {
            mapper_name: String::new(),
            iterations: 0,
            success_count: 0,
            error_count: 0,
            average_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
            median_ms: 0.0,
            std_dev_ms: 0.0,
            error_rate: 0.0,
            total_time: Duration::ZERO,
            tested_at: Utc::now(),
        }
    }
}

impl MapperPerformanceResult {
    /// Builds a result from a metrics snapshot covering both directions.
    ///
    /// Counters carry no distribution, so min, max, and median all report the
    /// average and the standard deviation is 0.
    #[must_use]
    pub fn from_snapshot(mapper_name: impl Into<String>, snapshot: &MetricsSnapshot) -> Self {
        let iterations = snapshot.total_calls();
        let error_count = snapshot.total_errors();
        let average_ms = snapshot.combined_average_ms();
        Self {
            mapper_name: mapper_name.into(),
            iterations,
            success_count: iterations.saturating_sub(error_count),
            error_count,
            average_ms,
            min_ms: average_ms,
            max_ms: average_ms,
            median_ms: average_ms,
            std_dev_ms: 0.0,
            error_rate: snapshot.combined_error_rate(),
            total_time: snapshot.total_time(),
            tested_at: Utc::now(),
        }
    }

    /// Builds one result per registered mapper that has been called at least
    /// once, ordered by mapper key.
    #[must_use]
    pub fn from_registry(registry: &MapperRegistry) -> Vec<Self> {
        registry
            .all_mappers()
            .iter()
            .filter_map(|mapper| {
                let snapshot = mapper.metrics().snapshot();
                (snapshot.total_calls() > 0).then(|| Self::from_snapshot(mapper.name(), &snapshot))
            })
            .collect()
    }

    /// Builds a result from individually timed calls.
    #[must_use]
    pub fn from_samples(
        mapper_name: impl Into<String>,
        samples: &[Duration],
        error_count: u64,
    ) -> Self {
        let mut millis: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
        millis.sort_by(f64::total_cmp);

        let iterations = u64::try_from(samples.len()).unwrap_or(u64::MAX);
        let total_time: Duration = samples.iter().sum();
        let n = count_as_f64(millis.len());
        let (average_ms, std_dev_ms) = if millis.is_empty() {
            (0.0, 0.0)
        } else {
            let mean = millis.iter().sum::<f64>() / n;
            let variance = millis.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;
            (mean, variance.sqrt())
        };

        let error_count = error_count.min(iterations);
        Self {
            mapper_name: mapper_name.into(),
            iterations,
            success_count: iterations - error_count,
            error_count,
            average_ms,
            min_ms: millis.first().copied().unwrap_or(0.0),
            max_ms: millis.last().copied().unwrap_or(0.0),
            median_ms: median(&millis),
            std_dev_ms,
            error_rate: if iterations == 0 {
                0.0
            } else {
                u64_as_f64(error_count) / u64_as_f64(iterations)
            },
            total_time,
            tested_at: Utc::now(),
        }
    }

    /// Conversions per second, `0` when nothing was measured.
    #[must_use]
    pub fn throughput_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if self.iterations == 0 || secs <= 0.0 {
            return 0.0;
        }
        u64_as_f64(self.iterations) / secs
    }

    /// Grades average latency and error rate.
    #[must_use]
    pub fn grade(&self) -> PerformanceGrade {
        PerformanceGrade::from_measurements(self.average_ms, self.error_rate)
    }
}

/// Times repeated calls of a closure.
///
/// # Examples
///
/// ```
/// use mg_quality::PerformanceProbe;
///
/// let probe = PerformanceProbe::new(100).with_warmup(10);
/// let result = probe.run("noop", |i| i % 50 != 0);
///
/// assert_eq!(result.iterations, 100);
/// assert_eq!(result.error_count, 2);
/// assert!(result.min_ms <= result.median_ms && result.median_ms <= result.max_ms);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceProbe {
    iterations: usize,
    warmup: usize,
}

impl Default for PerformanceProbe {
    fn default() -> Self {
        Self::new(1_000)
    }
}

impl PerformanceProbe {
    /// Creates a probe that measures `iterations` calls without warm-up.
    #[must_use]
    pub const fn new(iterations: usize) -> Self {
        Self {
            iterations,
            warmup: 0,
        }
    }

    /// Runs `warmup` unmeasured calls first.
    #[must_use]
    pub const fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Calls `op` with the iteration index, counting calls that return
    /// `false` as errors.
    pub fn run(&self, name: &str, mut op: impl FnMut(usize) -> bool) -> MapperPerformanceResult {
        for i in 0..self.warmup {
            let _ = op(i);
        }

        let mut samples = Vec::with_capacity(self.iterations);
        let mut errors = 0_u64;
        for i in 0..self.iterations {
            let start = Instant::now();
            let ok = op(i);
            samples.push(start.elapsed());
            if !ok {
                errors += 1;
            }
        }

        let result = MapperPerformanceResult::from_samples(name, &samples, errors);
        debug!(
            mapper = name,
            iterations = result.iterations,
            average_ms = result.average_ms,
            errors = result.error_count,
            "Benchmark finished"
        );
        result
    }
}

fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

#[allow(clippy::cast_precision_loss)]
const fn u64_as_f64(value: u64) -> f64 {
    value as f64
}
