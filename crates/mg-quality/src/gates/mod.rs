//! Gate evaluators.
//!
//! A [`GateEvaluator`] turns its slice of [`QualityAssessmentData`] into a
//! [`GateVerdict`]. The validator owns one evaluator per [`GateKind`]; the
//! built-in set comes from [`default_evaluators`] and any slot can be
//! replaced.
//!
//! Evaluators only score the data. Missing-data policy, error capture, panic
//! isolation, and timing are the validator's job.

mod builtin;

use std::collections::BTreeMap;

use mg_core::{GateKind, MissingDataPolicy, QualityGateConfiguration};
use serde_json::Value;

use crate::data::QualityAssessmentData;
use crate::error::GateEvaluationError;
use crate::result::{QualityGateResult, Recommendations};

pub use builtin::{
    ArchitectureGate, CompilationGate, ComplexityGate, CoverageGate, MemoryGate, PerformanceGate,
    ResilienceGate, SecurityGate,
};

/// Scores one quality gate.
///
/// # Examples
///
/// ```
/// use mg_core::{GateKind, QualityGateConfiguration};
/// use mg_quality::{GateEvaluationError, GateEvaluator, GateVerdict, QualityAssessmentData};
///
/// struct AlwaysGreenMemory;
///
/// impl GateEvaluator for AlwaysGreenMemory {
///     fn kind(&self) -> GateKind {
///         GateKind::Memory
///     }
///
///     fn evaluate(
///         &self,
///         _data: &QualityAssessmentData,
///         _config: &QualityGateConfiguration,
///     ) -> Result<Option<GateVerdict>, GateEvaluationError> {
///         Ok(Some(GateVerdict::new(100.0, true, "No leaks by construction")))
///     }
/// }
///
/// let verdict = AlwaysGreenMemory
///     .evaluate(&QualityAssessmentData::new("Core"), &QualityGateConfiguration::default())
///     .unwrap()
///     .unwrap();
/// assert!(verdict.passed);
/// ```
pub trait GateEvaluator: Send + Sync {
    /// The gate this evaluator scores.
    fn kind(&self) -> GateKind;

    /// Scores the gate.
    ///
    /// Returns `Ok(None)` when the data this gate needs is absent.
    fn evaluate(
        &self,
        data: &QualityAssessmentData,
        config: &QualityGateConfiguration,
    ) -> Result<Option<GateVerdict>, GateEvaluationError>;
}

/// What an evaluator concluded about its gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateVerdict {
    /// Score; the validator clamps it to [0, 100].
    pub score: f64,
    /// Whether the thresholds were met.
    pub passed: bool,
    /// Human-readable summary of the measurements.
    pub details: String,
    /// Suggested follow-ups.
    pub recommendations: Recommendations,
    /// Gate-specific measurements.
    pub metadata: BTreeMap<String, Value>,
}

impl GateVerdict {
    /// Creates a verdict with no recommendations or metadata.
    #[must_use]
    pub fn new(score: f64, passed: bool, details: impl Into<String>) -> Self {
        Self {
            score,
            passed,
            details: details.into(),
            recommendations: Recommendations::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds `recommendation` when `condition` holds.
    pub fn recommend_if(&mut self, condition: bool, recommendation: impl FnOnce() -> String) {
        if condition {
            self.recommendations.push(recommendation());
        }
    }

    /// Records a gate-specific measurement.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }
}

/// The eight built-in evaluators in [`GateKind::ALL`] order.
#[must_use]
pub fn default_evaluators() -> Vec<Box<dyn GateEvaluator>> {
    vec![
        Box::new(CoverageGate),
        Box::new(ComplexityGate),
        Box::new(SecurityGate),
        Box::new(PerformanceGate),
        Box::new(CompilationGate),
        Box::new(ArchitectureGate),
        Box::new(ResilienceGate),
        Box::new(MemoryGate),
    ]
}

/// Name used in missing-data and failure messages.
const fn subject_label(kind: GateKind) -> &'static str {
    match kind {
        GateKind::Coverage => "Coverage",
        GateKind::Security => "Security analysis",
        other => other.name(),
    }
}

impl QualityGateResult {
    /// Builds the result for an evaluator verdict, clamping the score.
    #[must_use]
    pub fn from_verdict(kind: GateKind, verdict: GateVerdict) -> Self {
        let mut result = Self::new(kind);
        result.score = verdict.score.clamp(0.0, 100.0);
        result.passed = verdict.passed;
        result.details = verdict.details;
        result.recommendations = verdict.recommendations;
        result.metadata = verdict.metadata;
        result
    }

    /// Builds the result for a gate whose data is absent.
    #[must_use]
    pub fn missing_data(kind: GateKind, policy: MissingDataPolicy) -> Self {
        let (score, passed) = policy.outcome();
        let mut result = Self::new(kind);
        result.score = score;
        result.passed = passed;
        result.details = format!("{} data not available", subject_label(kind));
        if !passed {
            result.recommendations.push(missing_data_recommendation(kind).to_owned());
        }
        result.add_metadata("data_available", false);
        result
    }

    /// Builds the failed result for an evaluator that errored or panicked.
    #[must_use]
    pub fn evaluation_failed(kind: GateKind, error: &GateEvaluationError) -> Self {
        let label = match kind {
            GateKind::Security => "Security",
            other => subject_label(other),
        };
        let mut result = Self::new(kind);
        result.details = format!("{label} validation failed: {error}");
        result.add_metadata("evaluator_panicked", error.is_panic());
        result
    }
}

const fn missing_data_recommendation(kind: GateKind) -> &'static str {
    match kind {
        GateKind::Coverage => "Run code coverage analysis to validate coverage metrics",
        GateKind::Complexity => "Run complexity analysis to validate maintainability",
        GateKind::Security => "Run security analysis to detect vulnerabilities",
        GateKind::Performance => "Benchmark type mappers to validate performance",
        GateKind::Compilation => "Build the project to validate compilation",
        GateKind::Architecture => "Run architecture analysis to validate design rules",
        GateKind::Resilience => "Replay failure scenarios to validate retry policies",
        GateKind::Memory => "Run a load test to validate memory behaviour",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_evaluators_cover_every_gate_in_order() {
        let kinds: Vec<GateKind> = default_evaluators().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, GateKind::ALL);
    }

    #[test]
    fn test_from_verdict_clamps_score() {
        let result = QualityGateResult::from_verdict(
            GateKind::Performance,
            GateVerdict::new(130.0, true, "fast"),
        );
        assert!((result.score - 100.0).abs() < f64::EPSILON);

        let result =
            QualityGateResult::from_verdict(GateKind::Security, GateVerdict::new(-40.0, false, ""));
        assert!(result.score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_data_results() {
        let result = QualityGateResult::missing_data(GateKind::Coverage, MissingDataPolicy::FailClosed);
        assert!(!result.passed);
        assert_eq!(result.details, "Coverage data not available");
        assert_eq!(
            result.recommendations.as_slice(),
            ["Run code coverage analysis to validate coverage metrics"]
        );

        let result =
            QualityGateResult::missing_data(GateKind::Memory, MissingDataPolicy::baseline(75.0));
        assert!(result.passed);
        assert!((result.score - 75.0).abs() < f64::EPSILON);
        assert!(result.recommendations.is_empty());
        assert_eq!(result.metadata["data_available"], Value::Bool(false));
    }

    #[test]
    fn test_evaluation_failed_result() {
        let error = GateEvaluationError::Panicked("boom".to_owned());
        let result = QualityGateResult::evaluation_failed(GateKind::Security, &error);
        assert!(!result.passed);
        assert!(result.score.abs() < f64::EPSILON);
        assert_eq!(result.details, "Security validation failed: evaluator panicked: boom");
        assert_eq!(result.metadata["evaluator_panicked"], Value::Bool(true));
    }

    #[test]
    fn test_recommend_if() {
        let mut verdict = GateVerdict::new(50.0, false, "");
        verdict.recommend_if(false, || "skipped".to_owned());
        verdict.recommend_if(true, || "kept".to_owned());
        assert_eq!(verdict.recommendations.as_slice(), ["kept"]);
    }
}
