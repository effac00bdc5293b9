//! Per-mapper conversion metrics with atomic counters.
//!
//! This module provides [`MapperMetrics`], embedded in every
//! [`Mapper`](crate::Mapper), and the value types derived from it:
//! [`MetricsSnapshot`] for reporting and [`ValidationResult`] for threshold
//! checks.
//!
//! # Thread Safety
//!
//! Each counter is an independent [`AtomicU64`] updated with
//! [`Relaxed`](std::sync::atomic::Ordering::Relaxed) ordering. Every counter is
//! monotonic between resets, but a snapshot taken while conversions are in
//! flight may pair a call count with a time total from a slightly different
//! instant. [`MapperMetrics::reset`] zeroes the counters one at a time and is
//! not atomic as a whole.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use mg_mapping::MapperMetrics;
//!
//! let metrics = MapperMetrics::new();
//! metrics.record_to_wrapper(Duration::from_micros(400), true);
//! metrics.record_to_wrapper(Duration::from_micros(600), false);
//!
//! let snap = metrics.snapshot();
//! assert_eq!(snap.to_wrapper.calls, 2);
//! assert!((snap.to_wrapper.average_ms() - 0.5).abs() < 1e-9);
//! assert!((snap.to_wrapper.error_rate() - 0.5).abs() < 1e-9);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Generated record to wrapper model.
    ToWrapper,
    /// Wrapper model to generated record.
    ToGenerated,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ToWrapper => "to_wrapper",
            Self::ToGenerated => "to_generated",
        })
    }
}

#[derive(Debug, Default)]
struct DirectionCounters {
    calls: AtomicU64,
    elapsed_nanos: AtomicU64,
    errors: AtomicU64,
}

impl DirectionCounters {
    #[inline]
    fn record(&self, elapsed: Duration, success: bool) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.elapsed_nanos.fetch_add(nanos, Ordering::Relaxed);
        if !success {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> DirectionSnapshot {
        DirectionSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            elapsed_nanos: self.elapsed_nanos.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.elapsed_nanos.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }
}

/// Atomic call, time, and error counters for both conversion directions.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use mg_mapping::MapperMetrics;
///
/// let metrics = MapperMetrics::new();
/// metrics.record_to_generated(Duration::from_millis(3), true);
///
/// let result = metrics.validate_performance(1.0, 0.01);
/// assert!(!result.to_generated_performance_ok);
/// assert!(result.to_wrapper_performance_ok);
/// assert!(!result.overall_valid);
/// ```
#[derive(Debug, Default)]
pub struct MapperMetrics {
    to_wrapper: DirectionCounters,
    to_generated: DirectionCounters,
}

impl MapperMetrics {
    /// Default target average conversion time, in milliseconds.
    pub const DEFAULT_TARGET_AVERAGE_MS: f64 = 1.0;

    /// Default maximum error rate.
    pub const DEFAULT_MAX_ERROR_RATE: f64 = 0.01;

    /// Creates a collector with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one generated-to-wrapper conversion.
    #[inline]
    pub fn record_to_wrapper(&self, elapsed: Duration, success: bool) {
        self.to_wrapper.record(elapsed, success);
    }

    /// Records one wrapper-to-generated conversion.
    #[inline]
    pub fn record_to_generated(&self, elapsed: Duration, success: bool) {
        self.to_generated.record(elapsed, success);
    }

    /// Records one conversion in `direction`.
    #[inline]
    pub fn record(&self, direction: Direction, elapsed: Duration, success: bool) {
        match direction {
            Direction::ToWrapper => self.record_to_wrapper(elapsed, success),
            Direction::ToGenerated => self.record_to_generated(elapsed, success),
        }
    }

    /// Returns a point-in-time copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            to_wrapper: self.to_wrapper.snapshot(),
            to_generated: self.to_generated.snapshot(),
        }
    }

    /// Number of generated-to-wrapper calls.
    #[inline]
    #[must_use]
    pub fn to_wrapper_calls(&self) -> u64 {
        self.to_wrapper.calls.load(Ordering::Relaxed)
    }

    /// Number of wrapper-to-generated calls.
    #[inline]
    #[must_use]
    pub fn to_generated_calls(&self) -> u64 {
        self.to_generated.calls.load(Ordering::Relaxed)
    }

    /// Number of failed generated-to-wrapper calls.
    #[inline]
    #[must_use]
    pub fn to_wrapper_errors(&self) -> u64 {
        self.to_wrapper.errors.load(Ordering::Relaxed)
    }

    /// Number of failed wrapper-to-generated calls.
    #[inline]
    #[must_use]
    pub fn to_generated_errors(&self) -> u64 {
        self.to_generated.errors.load(Ordering::Relaxed)
    }

    /// Average generated-to-wrapper time in milliseconds, 0 before the first call.
    #[must_use]
    pub fn to_wrapper_average_ms(&self) -> f64 {
        self.to_wrapper.snapshot().average_ms()
    }

    /// Average wrapper-to-generated time in milliseconds, 0 before the first call.
    #[must_use]
    pub fn to_generated_average_ms(&self) -> f64 {
        self.to_generated.snapshot().average_ms()
    }

    /// Generated-to-wrapper error rate in [0, 1], 0 before the first call.
    #[must_use]
    pub fn to_wrapper_error_rate(&self) -> f64 {
        self.to_wrapper.snapshot().error_rate()
    }

    /// Wrapper-to-generated error rate in [0, 1], 0 before the first call.
    #[must_use]
    pub fn to_generated_error_rate(&self) -> f64 {
        self.to_generated.snapshot().error_rate()
    }

    /// Checks both directions against a latency target and an error-rate ceiling.
    #[must_use]
    pub fn validate_performance(
        &self,
        target_average_ms: f64,
        max_error_rate: f64,
    ) -> ValidationResult {
        self.snapshot().validate(target_average_ms, max_error_rate)
    }

    /// Checks both directions against the default 1 ms / 1% thresholds.
    #[must_use]
    pub fn validate_default(&self) -> ValidationResult {
        self.validate_performance(Self::DEFAULT_TARGET_AVERAGE_MS, Self::DEFAULT_MAX_ERROR_RATE)
    }

    /// Zeroes every counter.
    ///
    /// Counters are cleared independently. A conversion finishing concurrently
    /// may land its call in the old epoch and its time in the new one.
    pub fn reset(&self) {
        self.to_wrapper.reset();
        self.to_generated.reset();
    }
}

/// Counters for one direction at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionSnapshot {
    /// Number of calls.
    pub calls: u64,
    /// Cumulative elapsed time in nanoseconds.
    pub elapsed_nanos: u64,
    /// Number of calls that failed unexpectedly.
    pub errors: u64,
}

impl DirectionSnapshot {
    /// Cumulative elapsed time.
    #[inline]
    #[must_use]
    pub const fn total_time(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos)
    }

    /// Cumulative elapsed time divided by calls, in milliseconds.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn average_ms(&self) -> f64 {
        if self.calls == 0 {
            return 0.0;
        }
        self.elapsed_nanos as f64 / NANOS_PER_MILLI / self.calls as f64
    }

    /// Errors divided by calls.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        if self.calls == 0 {
            return 0.0;
        }
        self.errors as f64 / self.calls as f64
    }
}

/// A point-in-time copy of a [`MapperMetrics`] collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Generated-to-wrapper counters.
    pub to_wrapper: DirectionSnapshot,
    /// Wrapper-to-generated counters.
    pub to_generated: DirectionSnapshot,
}

impl MetricsSnapshot {
    /// Returns the counters for `direction`.
    #[inline]
    #[must_use]
    pub const fn direction(&self, direction: Direction) -> DirectionSnapshot {
        match direction {
            Direction::ToWrapper => self.to_wrapper,
            Direction::ToGenerated => self.to_generated,
        }
    }

    /// Calls across both directions.
    #[inline]
    #[must_use]
    pub const fn total_calls(&self) -> u64 {
        self.to_wrapper.calls.saturating_add(self.to_generated.calls)
    }

    /// Errors across both directions.
    #[inline]
    #[must_use]
    pub const fn total_errors(&self) -> u64 {
        self.to_wrapper.errors.saturating_add(self.to_generated.errors)
    }

    /// Elapsed time across both directions.
    #[inline]
    #[must_use]
    pub const fn total_time(&self) -> Duration {
        Duration::from_nanos(
            self.to_wrapper
                .elapsed_nanos
                .saturating_add(self.to_generated.elapsed_nanos),
        )
    }

    /// Average time per call across both directions, in milliseconds.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn combined_average_ms(&self) -> f64 {
        let calls = self.total_calls();
        if calls == 0 {
            return 0.0;
        }
        self.total_time().as_secs_f64() * 1000.0 / calls as f64
    }

    /// Error rate across both directions.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn combined_error_rate(&self) -> f64 {
        let calls = self.total_calls();
        if calls == 0 {
            return 0.0;
        }
        self.total_errors() as f64 / calls as f64
    }

    /// Evaluates this snapshot against thresholds.
    #[must_use]
    pub fn validate(&self, target_average_ms: f64, max_error_rate: f64) -> ValidationResult {
        let to_wrapper_average_ms = self.to_wrapper.average_ms();
        let to_generated_average_ms = self.to_generated.average_ms();
        let to_wrapper_error_rate = self.to_wrapper.error_rate();
        let to_generated_error_rate = self.to_generated.error_rate();

        let to_wrapper_performance_ok = to_wrapper_average_ms <= target_average_ms;
        let to_generated_performance_ok = to_generated_average_ms <= target_average_ms;
        let to_wrapper_error_rate_ok = to_wrapper_error_rate <= max_error_rate;
        let to_generated_error_rate_ok = to_generated_error_rate <= max_error_rate;

        ValidationResult {
            target_average_ms,
            max_error_rate,
            to_wrapper_average_ms,
            to_generated_average_ms,
            to_wrapper_error_rate,
            to_generated_error_rate,
            to_wrapper_performance_ok,
            to_generated_performance_ok,
            to_wrapper_error_rate_ok,
            to_generated_error_rate_ok,
            overall_valid: to_wrapper_performance_ok
                && to_generated_performance_ok
                && to_wrapper_error_rate_ok
                && to_generated_error_rate_ok,
        }
    }
}

/// Outcome of checking a mapper's metrics against thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Latency target the averages were checked against, in milliseconds.
    pub target_average_ms: f64,
    /// Error-rate ceiling the rates were checked against.
    pub max_error_rate: f64,
    /// Observed generated-to-wrapper average, in milliseconds.
    pub to_wrapper_average_ms: f64,
    /// Observed wrapper-to-generated average, in milliseconds.
    pub to_generated_average_ms: f64,
    /// Observed generated-to-wrapper error rate.
    pub to_wrapper_error_rate: f64,
    /// Observed wrapper-to-generated error rate.
    pub to_generated_error_rate: f64,
    /// `to_wrapper_average_ms <= target_average_ms`.
    pub to_wrapper_performance_ok: bool,
    /// `to_generated_average_ms <= target_average_ms`.
    pub to_generated_performance_ok: bool,
    /// `to_wrapper_error_rate <= max_error_rate`.
    pub to_wrapper_error_rate_ok: bool,
    /// `to_generated_error_rate <= max_error_rate`.
    pub to_generated_error_rate_ok: bool,
    /// AND of the four checks.
    pub overall_valid: bool,
}

impl ValidationResult {
    /// Names of the checks that failed, for log lines and reports.
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&'static str> {
        [
            (self.to_wrapper_performance_ok, "to_wrapper_performance"),
            (self.to_generated_performance_ok, "to_generated_performance"),
            (self.to_wrapper_error_rate_ok, "to_wrapper_error_rate"),
            (self.to_generated_error_rate_ok, "to_generated_error_rate"),
        ]
        .into_iter()
        .filter_map(|(ok, name)| (!ok).then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = MapperMetrics::new();
        let snap = metrics.snapshot();
        assert_eq!(snap, MetricsSnapshot::default());
        assert!(metrics.to_wrapper_average_ms().abs() < f64::EPSILON);
        assert!(metrics.to_generated_error_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_counts_errors_only_on_failure() {
        let metrics = MapperMetrics::new();
        metrics.record_to_wrapper(Duration::from_millis(1), true);
        metrics.record_to_wrapper(Duration::from_millis(1), false);
        metrics.record_to_generated(Duration::from_millis(2), true);

        assert_eq!(metrics.to_wrapper_calls(), 2);
        assert_eq!(metrics.to_wrapper_errors(), 1);
        assert_eq!(metrics.to_generated_calls(), 1);
        assert_eq!(metrics.to_generated_errors(), 0);
        assert!((metrics.to_wrapper_error_rate() - 0.5).abs() < 1e-12);
        assert!((metrics.to_generated_average_ms() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_by_direction() {
        let metrics = MapperMetrics::new();
        metrics.record(Direction::ToGenerated, Duration::from_micros(10), false);
        let snap = metrics.snapshot();
        assert_eq!(snap.direction(Direction::ToGenerated).errors, 1);
        assert_eq!(snap.direction(Direction::ToWrapper).calls, 0);
        assert_eq!(snap.total_calls(), 1);
        assert_eq!(snap.total_errors(), 1);
    }

    #[test]
    fn test_validate_default_thresholds() {
        let metrics = MapperMetrics::new();
        for _ in 0..99 {
            metrics.record_to_wrapper(Duration::from_micros(500), true);
        }
        metrics.record_to_wrapper(Duration::from_micros(500), false);

        let result = metrics.validate_default();
        assert!(result.to_wrapper_performance_ok);
        // 1 error in 100 calls is exactly the ceiling.
        assert!(result.to_wrapper_error_rate_ok);
        assert!(result.overall_valid);
        assert!(result.failed_checks().is_empty());
    }

    #[test]
    fn test_validate_fails_on_error_rate() {
        let metrics = MapperMetrics::new();
        metrics.record_to_generated(Duration::from_micros(10), false);
        metrics.record_to_generated(Duration::from_micros(10), true);

        let result = metrics.validate_performance(1.0, 0.01);
        assert!(result.to_generated_performance_ok);
        assert!(!result.to_generated_error_rate_ok);
        assert!(!result.overall_valid);
        assert_eq!(result.failed_checks(), vec!["to_generated_error_rate"]);
    }

    #[test]
    fn test_reset_zeroes_all_counters() {
        let metrics = MapperMetrics::new();
        metrics.record_to_wrapper(Duration::from_millis(5), false);
        metrics.record_to_generated(Duration::from_millis(5), false);
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_combined_rates() {
        let metrics = MapperMetrics::new();
        metrics.record_to_wrapper(Duration::from_millis(1), true);
        metrics.record_to_generated(Duration::from_millis(3), false);
        let snap = metrics.snapshot();
        assert!((snap.combined_average_ms() - 2.0).abs() < 1e-9);
        assert!((snap.combined_error_rate() - 0.5).abs() < 1e-12);
        assert_eq!(snap.total_time(), Duration::from_millis(4));
    }

    #[test]
    fn test_concurrent_recording_is_lossless() {
        use rayon::prelude::*;

        let metrics = MapperMetrics::new();
        (0..10_000u32).into_par_iter().for_each(|i| {
            metrics.record_to_wrapper(Duration::from_nanos(100), i % 10 != 0);
        });

        let snap = metrics.snapshot();
        assert_eq!(snap.to_wrapper.calls, 10_000);
        assert_eq!(snap.to_wrapper.errors, 1_000);
        assert_eq!(snap.to_wrapper.elapsed_nanos, 1_000_000);
        assert!((snap.to_wrapper.average_ms() - 0.0001).abs() < 1e-12);
    }

    #[test]
    fn test_snapshot_serialization() {
        let metrics = MapperMetrics::new();
        metrics.record_to_wrapper(Duration::from_nanos(1500), true);
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["to_wrapper"]["calls"], 1);
        assert_eq!(json["to_wrapper"]["elapsed_nanos"], 1500);
    }

    proptest! {
        #[test]
        fn prop_average_is_cumulative_over_calls(samples in proptest::collection::vec((0u64..5_000_000, any::<bool>()), 1..64)) {
            let metrics = MapperMetrics::new();
            let mut total = 0u64;
            let mut failures = 0u64;
            for &(nanos, ok) in &samples {
                metrics.record_to_generated(Duration::from_nanos(nanos), ok);
                total += nanos;
                failures += u64::from(!ok);
            }
            let snap = metrics.snapshot().to_generated;
            let calls = samples.len() as f64;
            prop_assert_eq!(snap.calls, samples.len() as u64);
            prop_assert_eq!(snap.errors, failures);
            prop_assert!((snap.average_ms() - total as f64 / 1e6 / calls).abs() < 1e-9);
            prop_assert!(snap.error_rate() <= 1.0);
        }
    }
}
