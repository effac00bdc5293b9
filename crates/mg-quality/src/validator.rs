//! Runs all eight gates for one subject and aggregates their verdicts.
//!
//! Gates are evaluated concurrently on the rayon pool. Each gate writes only
//! its own slot of an order-preserving parallel collect, so results always come
//! back in [`GateKind::ALL`] order regardless of completion order.
//!
//! A gate that errors, panics, or reports a non-finite score fails on its
//! own. Only malformed input (an empty subject, an invalid configuration) or
//! an evaluator set that does not yield eight scores aborts the whole
//! assessment.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use mg_core::{GateKind, QualityGateConfiguration, QualityGrade};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::count_as_f64;
use crate::data::QualityAssessmentData;
use crate::error::{AssessmentError, GateEvaluationError};
use crate::gates::{GateEvaluator, default_evaluators};
use crate::result::{QualityGateResult, QualityGateResults};

/// Evaluates the eight quality gates.
///
/// # Examples
///
/// ```
/// use mg_core::{QualityGateConfiguration, QualityGrade};
/// use mg_quality::{CoverageResult, QualityAssessmentData, QualityGateValidator};
///
/// let data = QualityAssessmentData::new("Core").with_coverage(CoverageResult::new(0.9, 0.95, 0.8));
/// let results = QualityGateValidator::new()
///     .validate_all_gates(&data, &QualityGateConfiguration::default());
///
/// assert_eq!(results.total_count(), 8);
/// assert!(results.gate_result("CodeCoverage").unwrap().passed);
/// // Gates without data fall back to their missing-data policy.
/// assert!(!results.passed_all_gates);
/// assert_eq!(results.overall_grade, QualityGrade::Poor);
/// ```
pub struct QualityGateValidator {
    /// One evaluator per gate, indexed by [`GateKind::index`].
    evaluators: Vec<Box<dyn GateEvaluator>>,
}

impl Default for QualityGateValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QualityGateValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityGateValidator")
            .field("gates", &self.evaluators.len())
            .finish()
    }
}

impl QualityGateValidator {
    /// Creates a validator with the built-in evaluators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            evaluators: default_evaluators(),
        }
    }

    /// Replaces the evaluator for `evaluator.kind()`.
    ///
    /// The gate keeps its position in the output.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl GateEvaluator + 'static) -> Self {
        let index = evaluator.kind().index();
        if let Some(slot) = self.evaluators.get_mut(index) {
            *slot = Box::new(evaluator);
        }
        self
    }

    /// Returns the evaluator for `kind`.
    #[must_use]
    pub fn evaluator(&self, kind: GateKind) -> Option<&dyn GateEvaluator> {
        self.evaluators.get(kind.index()).map(|evaluator| &**evaluator)
    }

    /// Evaluates every gate against `data` and aggregates the verdicts.
    ///
    /// Never fails: an aborted assessment is reported through
    /// [`QualityGateResults::validation_error`] alongside whatever gate
    /// results had completed.
    pub fn validate_all_gates(
        &self,
        data: &QualityAssessmentData,
        config: &QualityGateConfiguration,
    ) -> QualityGateResults {
        let start = Instant::now();
        let mut results = QualityGateResults::new(data.subject.clone(), Utc::now());
        info!(subject = %data.subject, "Starting quality gate validation");

        let outcome = self.run(data, config, &mut results);
        results.total_validation_time = start.elapsed();

        match outcome {
            Ok(()) => info!(
                subject = %results.subject,
                score = results.overall_quality_score,
                grade = %results.overall_grade,
                passed = results.passed_all_gates,
                elapsed_ms = results.total_validation_time.as_millis(),
                "Quality gate validation finished"
            ),
            Err(err) => {
                warn!(
                    subject = %results.subject,
                    error = %err,
                    completed_gates = results.total_count(),
                    "Quality gate validation aborted"
                );
                results.validation_error = Some(err.to_string());
            }
        }
        results
    }

    fn run(
        &self,
        data: &QualityAssessmentData,
        config: &QualityGateConfiguration,
        results: &mut QualityGateResults,
    ) -> Result<(), AssessmentError> {
        if data.subject.trim().is_empty() {
            return Err(AssessmentError::EmptySubject);
        }
        config
            .validate()
            .map_err(|e| AssessmentError::InvalidConfiguration(e.to_string()))?;

        results.gate_results = self
            .evaluators
            .par_iter()
            .map(|evaluator| evaluate_gate(evaluator.as_ref(), data, config))
            .collect();

        let expected = GateKind::ALL.len();
        let finite = results
            .gate_results
            .iter()
            .filter(|g| g.score.is_finite())
            .count();
        if finite != expected || results.total_count() != expected {
            return Err(AssessmentError::IncompleteAggregation { finite, expected });
        }

        let total: f64 = results.gate_results.iter().map(|g| g.score).sum();
        results.overall_quality_score = total / count_as_f64(expected);
        results.overall_grade = QualityGrade::from_score(results.overall_quality_score);
        results.passed_all_gates = results.gate_results.iter().all(|g| g.passed);

        results.add_summary_metric("gates_passed", results.passed_count());
        results.add_summary_metric("gates_failed", results.failed_count());
        results.add_summary_metric(
            "gates_without_data",
            results
                .gate_results
                .iter()
                .filter(|g| g.metadata.contains_key("data_available"))
                .count(),
        );
        Ok(())
    }
}

/// Evaluates one gate, isolating errors, panics, and non-finite scores.
fn evaluate_gate(
    evaluator: &dyn GateEvaluator,
    data: &QualityAssessmentData,
    config: &QualityGateConfiguration,
) -> QualityGateResult {
    let kind = evaluator.kind();
    let start = Instant::now();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(data, config)))
        .unwrap_or_else(|payload| Err(GateEvaluationError::Panicked(panic_message(&*payload))))
        .and_then(|verdict| {
            verdict
                .map(|v| GateEvaluationError::finite("score", v.score).map(|_| v))
                .transpose()
        });

    let mut result = match outcome {
        Ok(Some(verdict)) => QualityGateResult::from_verdict(kind, verdict),
        Ok(None) => QualityGateResult::missing_data(kind, config.missing_data.get(kind)),
        Err(err) => {
            warn!(gate = %kind, error = %err, "Gate evaluation failed");
            QualityGateResult::evaluation_failed(kind, &err)
        }
    };
    result.duration = start.elapsed();
    result.validated_at = Utc::now();

    debug!(
        gate = %kind,
        passed = result.passed,
        score = result.score,
        elapsed_us = result.duration.as_micros(),
        "Gate evaluated"
    );
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        ArchitectureAnalysisResult, CompilationResult, ComplexityAnalysisResult, CoverageResult,
        MemoryAnalysisResult, RetryPolicyResult, SecurityAnalysisResult, SecuritySeverity,
        SecurityViolation,
    };
    use crate::gates::GateVerdict;
    use crate::perf::MapperPerformanceResult;
    use mg_core::MissingDataPolicy;
    use proptest::prelude::*;
    use std::time::Duration;

    fn healthy() -> QualityAssessmentData {
        QualityAssessmentData::new("Core")
            .with_coverage(CoverageResult::new(0.95, 0.95, 0.95))
            .with_complexity(ComplexityAnalysisResult {
                violations: Vec::new(),
                average_complexity: 4.0,
                max_complexity: 9,
                total_methods: 120,
            })
            .with_security(SecurityAnalysisResult {
                violations: Vec::new(),
                rules_applied: 12,
            })
            .with_performance([MapperPerformanceResult::from_samples(
                "CostCodeMapper",
                &[Duration::from_micros(500); 100],
                0,
            )])
            .with_compilation(CompilationResult {
                compiled_successfully: true,
                error_count: 0,
                warning_count: 0,
            })
            .with_architecture(ArchitectureAnalysisResult::default())
            .with_resilience([RetryPolicyResult {
                status_code: 503,
                retry_attempts: 2,
                eventually_succeeded: true,
                total_time_ms: 150.0,
                retry_delays_ms: vec![50.0, 100.0],
            }])
            .with_memory([MemoryAnalysisResult {
                memory_growth_mb: 1.0,
                ..MemoryAnalysisResult::default()
            }])
    }

    fn validate(data: &QualityAssessmentData) -> QualityGateResults {
        QualityGateValidator::new().validate_all_gates(data, &QualityGateConfiguration::default())
    }

    fn mean_score(results: &QualityGateResults) -> f64 {
        results.gate_results.iter().map(|g| g.score).sum::<f64>() / 8.0
    }

    struct PanickingGate;

    #[allow(clippy::panic)]
    impl GateEvaluator for PanickingGate {
        fn kind(&self) -> GateKind {
            GateKind::Complexity
        }

        fn evaluate(
            &self,
            _data: &QualityAssessmentData,
            _config: &QualityGateConfiguration,
        ) -> Result<Option<GateVerdict>, GateEvaluationError> {
            panic!("complexity analyzer crashed");
        }
    }

    struct NanGate;

    impl GateEvaluator for NanGate {
        fn kind(&self) -> GateKind {
            GateKind::Memory
        }

        fn evaluate(
            &self,
            _data: &QualityAssessmentData,
            _config: &QualityGateConfiguration,
        ) -> Result<Option<GateVerdict>, GateEvaluationError> {
            Ok(Some(GateVerdict::new(f64::NAN, true, "")))
        }
    }

    #[test]
    fn test_healthy_subject_passes_all_gates() {
        let results = validate(&healthy());
        assert!(results.is_complete());
        assert!(results.passed_all_gates, "{}", results.generate_report());
        assert_eq!(results.passed_count(), 8);
        assert!((results.overall_quality_score - mean_score(&results)).abs() < 0.01);
        assert_eq!(results.overall_grade, QualityGrade::Excellent);
        assert!((results.gate(GateKind::Coverage).unwrap().score - 95.0).abs() < 0.01);
    }

    #[test]
    fn test_results_follow_gate_order() {
        let results = validate(&healthy());
        let kinds: Vec<GateKind> = results.gate_results.iter().map(|g| g.kind).collect();
        assert_eq!(kinds, GateKind::ALL);
    }

    #[test]
    fn test_security_failure_fails_assessment() {
        let finding = |severity| SecurityViolation {
            type_name: "AuthHandler".to_owned(),
            issue: String::new(),
            severity,
            recommendation: String::new(),
            rule_name: String::new(),
        };
        let mut data = healthy();
        data.security = Some(SecurityAnalysisResult {
            violations: vec![
                finding(SecuritySeverity::Critical),
                finding(SecuritySeverity::High),
                finding(SecuritySeverity::High),
            ],
            rules_applied: 12,
        });

        let results = validate(&data);
        let security = results.gate(GateKind::Security).unwrap();
        assert!(!security.passed);
        assert!((security.score - 10.0).abs() < 1e-9);
        assert!(!results.passed_all_gates);
        assert_eq!(results.failed_count(), 1);
    }

    #[test]
    fn test_missing_data_defaults() {
        let results = validate(&QualityAssessmentData::new("Empty"));
        assert!(results.is_complete());

        for kind in [
            GateKind::Coverage,
            GateKind::Complexity,
            GateKind::Security,
            GateKind::Performance,
            GateKind::Compilation,
        ] {
            let gate = results.gate(kind).unwrap();
            assert!(!gate.passed, "{kind}");
            assert!(gate.score.abs() < f64::EPSILON, "{kind}");
        }
        let baseline = |kind| results.gate(kind).map(|g| (g.score, g.passed));
        assert_eq!(baseline(GateKind::Architecture), Some((85.0, true)));
        assert_eq!(baseline(GateKind::Resilience), Some((80.0, true)));
        assert_eq!(baseline(GateKind::Memory), Some((75.0, true)));

        assert!((results.overall_quality_score - 30.0).abs() < 1e-9);
        assert_eq!(results.overall_grade, QualityGrade::Poor);
        assert_eq!(results.summary_metrics["gates_without_data"], 8);
    }

    #[test]
    fn test_missing_data_policy_is_configurable() {
        let mut config = QualityGateConfiguration::default();
        config.missing_data.memory = MissingDataPolicy::FailClosed;
        config.missing_data.coverage = MissingDataPolicy::baseline(60.0);

        let results = QualityGateValidator::new()
            .validate_all_gates(&QualityAssessmentData::new("Empty"), &config);
        assert!(!results.gate(GateKind::Memory).unwrap().passed);
        let coverage = results.gate(GateKind::Coverage).unwrap();
        assert!(coverage.passed);
        assert!((coverage.score - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_panicking_evaluator_is_isolated() {
        let results = QualityGateValidator::new()
            .with_evaluator(PanickingGate)
            .validate_all_gates(&healthy(), &QualityGateConfiguration::default());

        assert!(results.is_complete());
        let complexity = results.gate(GateKind::Complexity).unwrap();
        assert!(!complexity.passed);
        assert!(complexity.score.abs() < f64::EPSILON);
        assert!(complexity.details.contains("complexity analyzer crashed"));
        assert_eq!(results.passed_count(), 7);
        assert!(!results.passed_all_gates);
        assert!((results.overall_quality_score - mean_score(&results)).abs() < 0.01);
    }

    #[test]
    fn test_evaluator_error_is_isolated() {
        let mut data = healthy();
        data.coverage = Some(CoverageResult::new(f64::NAN, 0.9, 0.9));

        let results = validate(&data);
        let coverage = results.gate(GateKind::Coverage).unwrap();
        assert!(!coverage.passed);
        assert_eq!(
            coverage.details,
            "Coverage validation failed: overall_coverage must be finite, got NaN"
        );
        assert_eq!(results.passed_count(), 7);
    }

    #[test]
    fn test_non_finite_score_fails_only_its_gate() {
        let results = QualityGateValidator::new()
            .with_evaluator(NanGate)
            .validate_all_gates(&healthy(), &QualityGateConfiguration::default());

        assert!(results.validation_error.is_none());
        assert!(results.is_complete());
        let memory = results.gate(GateKind::Memory).unwrap();
        assert!(!memory.passed);
        assert!(memory.score.abs() < f64::EPSILON);
        assert_eq!(memory.details, "Memory validation failed: score must be finite, got NaN");
        assert_eq!(results.passed_count(), 7);
        assert!(!results.passed_all_gates);
        assert!(results.overall_quality_score.is_finite());
        assert!((results.overall_quality_score - mean_score(&results)).abs() < 0.01);
    }

    #[test]
    fn test_empty_subject_aborts() {
        let mut data = healthy();
        data.subject = "  ".to_owned();
        let results = validate(&data);
        assert_eq!(
            results.validation_error.as_deref(),
            Some("assessment subject must not be empty")
        );
        assert!(results.gate_results.is_empty());
    }

    #[test]
    fn test_invalid_configuration_aborts() {
        let config = QualityGateConfiguration {
            min_branch_coverage: 2.0,
            ..QualityGateConfiguration::default()
        };
        let results = QualityGateValidator::new().validate_all_gates(&healthy(), &config);
        let error = results.validation_error.unwrap_or_default();
        assert!(error.starts_with("invalid gate configuration"), "{error}");
        assert!(error.contains("min_branch_coverage"));
    }

    #[test]
    fn test_validator_shared_across_threads() {
        let validator = QualityGateValidator::new();
        let config = QualityGateConfiguration::default();
        let data = healthy();

        let scores: Vec<f64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| validator.validate_all_gates(&data, &config).overall_quality_score))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(scores.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-9));
    }

    proptest! {
        #[test]
        fn test_overall_score_is_mean_of_gates(
            overall in 0.0_f64..=1.0,
            critical in 0.0_f64..=1.0,
            warnings in 0_u32..40,
            growth in 0.0_f64..60.0,
        ) {
            let mut data = healthy();
            data.coverage = Some(CoverageResult::new(overall, critical, 0.8));
            data.compilation = Some(CompilationResult {
                compiled_successfully: true,
                error_count: 0,
                warning_count: warnings,
            });
            data.memory[0].memory_growth_mb = growth;

            let results = validate(&data);
            prop_assert!(results.is_complete());
            prop_assert!((results.overall_quality_score - mean_score(&results)).abs() < 0.01);
            prop_assert!(results.gate_results.iter().all(|g| (0.0..=100.0).contains(&g.score)));
            prop_assert_eq!(
                results.passed_all_gates,
                results.gate_results.iter().all(|g| g.passed)
            );
        }
    }
}
