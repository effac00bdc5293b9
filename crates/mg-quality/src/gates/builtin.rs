//! The eight built-in gate evaluators.

use mg_core::{GateKind, QualityGateConfiguration};

use super::{GateEvaluator, GateVerdict};
use crate::analysis::{SecuritySeverity, count_as_f64};
use crate::data::QualityAssessmentData;
use crate::error::GateEvaluationError;

type GateOutcome = Result<Option<GateVerdict>, GateEvaluationError>;

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = count_as_f64(values.len());
    if n == 0.0 {
        return 0.0;
    }
    values.sum::<f64>() / n
}

// ===== COVERAGE =====

/// Line, critical-path, and branch coverage.
///
/// Score is `(0.4 × overall + 0.6 × critical path) × 100`. Passes when all
/// three fractions meet their minima.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageGate;

impl GateEvaluator for CoverageGate {
    fn kind(&self) -> GateKind {
        GateKind::Coverage
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        let Some(coverage) = &data.coverage else {
            return Ok(None);
        };
        let overall = GateEvaluationError::fraction("overall_coverage", coverage.overall_coverage)?;
        let critical =
            GateEvaluationError::fraction("critical_path_coverage", coverage.critical_path_coverage)?;
        let branch = GateEvaluationError::fraction("branch_coverage", coverage.branch_coverage)?;
        GateEvaluationError::fraction("statement_coverage", coverage.statement_coverage)?;

        let passed = overall >= config.min_overall_coverage
            && critical >= config.min_critical_path_coverage
            && branch >= config.min_branch_coverage;
        let details = format!(
            "Overall: {}, Critical: {}, Branch: {}",
            percent(overall),
            percent(critical),
            percent(branch)
        );

        let mut verdict = GateVerdict::new(coverage.weighted_coverage() * 100.0, passed, details)
            .with_metadata("grade", coverage.grade().label());
        verdict.recommend_if(overall < config.min_overall_coverage, || {
            format!(
                "Increase overall test coverage to at least {:.0}%",
                config.min_overall_coverage * 100.0
            )
        });
        verdict.recommend_if(critical < config.min_critical_path_coverage, || {
            format!(
                "Focus on critical path coverage - aim for {:.0}%+",
                config.min_critical_path_coverage * 100.0
            )
        });
        verdict.recommend_if(branch < config.min_branch_coverage, || {
            "Improve branch coverage by testing edge cases".to_owned()
        });
        Ok(Some(verdict))
    }
}

// ===== COMPLEXITY =====

/// Cyclomatic complexity.
///
/// Score is `100 − violation rate × 100`. Passes when both the violation
/// rate and the average complexity are within bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityGate;

impl GateEvaluator for ComplexityGate {
    fn kind(&self) -> GateKind {
        GateKind::Complexity
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        let Some(complexity) = &data.complexity else {
            return Ok(None);
        };
        let average =
            GateEvaluationError::non_negative("average_complexity", complexity.average_complexity)?;
        let violations = complexity.violations.len();
        if count_as_f64(violations) > f64::from(complexity.total_methods) {
            return Err(GateEvaluationError::InconsistentCounts(format!(
                "{violations} complexity violations across {} methods",
                complexity.total_methods
            )));
        }

        let rate = complexity.violation_rate();
        let passed = rate <= config.max_complexity_violation_rate
            && average <= config.max_average_complexity;
        let details = format!(
            "Avg: {average:.2}, Max: {}, Violations: {violations}/{}",
            complexity.max_complexity, complexity.total_methods
        );

        let mut verdict = GateVerdict::new(100.0 - rate * 100.0, passed, details)
            .with_metadata("violation_rate", rate)
            .with_metadata("grade", complexity.grade().label());
        verdict.recommend_if(average > config.max_average_complexity, || {
            "Refactor complex methods to reduce average complexity".to_owned()
        });
        verdict.recommend_if(violations > 0, || {
            format!("Address {violations} complexity violations")
        });
        Ok(Some(verdict))
    }
}

// ===== SECURITY =====

/// Security findings by severity.
///
/// Score is `100 − 50 × critical − 20 × high − 5 × medium`. Any critical
/// finding fails the gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityGate;

impl GateEvaluator for SecurityGate {
    fn kind(&self) -> GateKind {
        GateKind::Security
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        let Some(security) = &data.security else {
            return Ok(None);
        };
        let critical = security.count(SecuritySeverity::Critical);
        let high = security.count(SecuritySeverity::High);
        let medium = security.count(SecuritySeverity::Medium);

        let score = 100.0
            - 50.0 * count_as_f64(critical)
            - 20.0 * count_as_f64(high)
            - 5.0 * count_as_f64(medium);
        let passed = critical == 0
            && count_as_f64(high) <= f64::from(config.max_high_severity_security_issues);
        let details = format!(
            "Critical: {critical}, High: {high}, Total: {}",
            security.violations.len()
        );

        let mut verdict = GateVerdict::new(score, passed, details)
            .with_metadata("medium", medium)
            .with_metadata("rules_applied", security.rules_applied)
            .with_metadata("grade", security.grade().label());
        verdict.recommend_if(critical > 0, || {
            format!("Immediately address {critical} critical security issues")
        });
        verdict.recommend_if(high > 0, || {
            format!("Address {high} high-severity security vulnerabilities")
        });
        Ok(Some(verdict))
    }
}

// ===== PERFORMANCE =====

/// Mapper latency, error rate, and throughput.
///
/// Score is the mean of three sub-scores computed from the averages across
/// mappers: `100 − 20 × avg ms`, `100 − 10000 × avg error rate`, and
/// `min(100, avg throughput / 10)`. Passes on the mean latency, the worst
/// error rate, and the worst throughput.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceGate;

impl GateEvaluator for PerformanceGate {
    fn kind(&self) -> GateKind {
        GateKind::Performance
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        if data.performance.is_empty() {
            return Ok(None);
        }

        let mut latencies = Vec::with_capacity(data.performance.len());
        let mut error_rates = Vec::with_capacity(data.performance.len());
        let mut throughputs = Vec::with_capacity(data.performance.len());
        for result in &data.performance {
            latencies.push(GateEvaluationError::non_negative("average_ms", result.average_ms)?);
            error_rates.push(GateEvaluationError::fraction("error_rate", result.error_rate)?);
            if result.success_count.checked_add(result.error_count) != Some(result.iterations) {
                return Err(GateEvaluationError::InconsistentCounts(format!(
                    "{}: {} successes + {} errors != {} iterations",
                    result.mapper_name, result.success_count, result.error_count, result.iterations
                )));
            }
            throughputs.push(result.throughput_per_second());
        }

        let avg_response = mean(latencies.iter().copied());
        let avg_error_rate = mean(error_rates.iter().copied());
        let avg_throughput = mean(throughputs.iter().copied());
        let max_error_rate = error_rates.iter().copied().fold(0.0, f64::max);
        let min_throughput = throughputs.iter().copied().fold(f64::INFINITY, f64::min);

        let response_score = (100.0 - avg_response * 20.0).max(0.0);
        let error_score = (100.0 - avg_error_rate * 10_000.0).max(0.0);
        let throughput_score = (avg_throughput / 10.0).min(100.0);
        let score = (response_score + error_score + throughput_score) / 3.0;

        let passed = avg_response <= config.max_average_response_time_ms
            && max_error_rate <= config.max_error_rate
            && min_throughput >= config.min_throughput_per_second;
        let details = format!(
            "Avg Response: {avg_response:.2}ms, Max Error Rate: {}, Min Throughput: {min_throughput:.0} ops/sec",
            percent(max_error_rate)
        );

        let slow = latencies
            .iter()
            .filter(|&&ms| ms > config.max_average_response_time_ms)
            .count();
        let error_prone = error_rates
            .iter()
            .filter(|&&rate| rate > config.max_error_rate / 2.0)
            .count();

        let mut verdict = GateVerdict::new(score, passed, details)
            .with_metadata("mappers", data.performance.len())
            .with_metadata("response_score", response_score)
            .with_metadata("error_score", error_score)
            .with_metadata("throughput_score", throughput_score);
        verdict.recommend_if(slow > 0, || format!("Optimize {slow} slow type mappers"));
        verdict.recommend_if(error_prone > 0, || {
            format!("Improve reliability of {error_prone} error-prone mappers")
        });
        Ok(Some(verdict))
    }
}

// ===== COMPILATION =====

/// Build success, errors, and warnings.
///
/// Score is `100 − 5 × warnings` for a successful build and 0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompilationGate;

impl GateEvaluator for CompilationGate {
    fn kind(&self) -> GateKind {
        GateKind::Compilation
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        let Some(compilation) = &data.compilation else {
            return Ok(None);
        };
        if compilation.compiled_successfully && compilation.error_count > 0 {
            return Err(GateEvaluationError::InconsistentCounts(format!(
                "successful build reported {} errors",
                compilation.error_count
            )));
        }

        let score = if compilation.compiled_successfully {
            100.0 - 5.0 * f64::from(compilation.warning_count)
        } else {
            0.0
        };
        let passed = compilation.compiled_successfully
            && compilation.error_count == 0
            && compilation.warning_count <= config.max_compilation_warnings;
        let details = format!(
            "Success: {}, Errors: {}, Warnings: {}",
            compilation.compiled_successfully, compilation.error_count, compilation.warning_count
        );

        let mut verdict = GateVerdict::new(score, passed, details)
            .with_metadata("grade", compilation.grade().label());
        verdict.recommend_if(!passed, || "Fix compilation errors and reduce warnings".to_owned());
        Ok(Some(verdict))
    }
}

// ===== ARCHITECTURE =====

/// Architectural rule violations.
///
/// Score is `100 − 10 × violations`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchitectureGate;

impl GateEvaluator for ArchitectureGate {
    fn kind(&self) -> GateKind {
        GateKind::Architecture
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        let Some(architecture) = &data.architecture else {
            return Ok(None);
        };
        let violations = architecture.violations.len();
        let passed = count_as_f64(violations) <= f64::from(config.max_architecture_violations);

        let mut principles: Vec<&str> = architecture
            .violations
            .iter()
            .map(|v| v.principle.as_str())
            .collect();
        principles.sort_unstable();
        principles.dedup();
        let details = if principles.is_empty() {
            "Violations: 0".to_owned()
        } else {
            format!("Violations: {violations} ({})", principles.join(", "))
        };

        let mut verdict = GateVerdict::new(100.0 - 10.0 * count_as_f64(violations), passed, details);
        verdict.recommend_if(violations > 0, || {
            format!("Resolve {violations} architectural violations")
        });
        Ok(Some(verdict))
    }
}

// ===== RESILIENCE =====

/// Recovery behaviour of retry policies.
///
/// Score is the share of replayed failure scenarios that eventually
/// succeeded, times 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResilienceGate;

impl GateEvaluator for ResilienceGate {
    fn kind(&self) -> GateKind {
        GateKind::Resilience
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        if data.resilience.is_empty() {
            return Ok(None);
        }
        for scenario in &data.resilience {
            GateEvaluationError::non_negative("total_time_ms", scenario.total_time_ms)?;
        }

        let attempted = data.resilience.len();
        let recovered = data
            .resilience
            .iter()
            .filter(|s| s.eventually_succeeded)
            .count();
        let rate = count_as_f64(recovered) / count_as_f64(attempted);
        let passed = rate >= config.min_resilience_recovery_rate;
        let details = format!(
            "Recovered: {recovered}/{attempted} scenarios ({})",
            percent(rate)
        );

        let unrecovered = attempted - recovered;
        let mut verdict =
            GateVerdict::new(rate * 100.0, passed, details).with_metadata("recovery_rate", rate);
        verdict.recommend_if(unrecovered > 0, || {
            format!("Review retry policies for {unrecovered} unrecovered failure scenarios")
        });
        Ok(Some(verdict))
    }
}

// ===== MEMORY =====

/// Memory growth and gen-2 collections.
///
/// Score is `100 − 2 × max growth MB − 5 × max gen-2 collections`, using the
/// worst run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryGate;

impl GateEvaluator for MemoryGate {
    fn kind(&self) -> GateKind {
        GateKind::Memory
    }

    fn evaluate(&self, data: &QualityAssessmentData, config: &QualityGateConfiguration) -> GateOutcome {
        if data.memory.is_empty() {
            return Ok(None);
        }
        let mut max_growth = f64::NEG_INFINITY;
        let mut max_gen2 = 0_u32;
        for run in &data.memory {
            let growth = GateEvaluationError::finite("memory_growth_mb", run.memory_growth_mb)?;
            max_growth = max_growth.max(growth);
            max_gen2 = max_gen2.max(run.gen2_collections);
        }

        let score = 100.0 - 2.0 * max_growth - 5.0 * f64::from(max_gen2);
        let passed = max_growth <= config.max_memory_growth_mb && max_gen2 <= config.max_gen2_collections;
        let details =
            format!("Max Memory Growth: {max_growth:.2}MB, Max Gen2 Collections: {max_gen2}");

        let mut verdict = GateVerdict::new(score, passed, details);
        verdict.recommend_if(!passed, || {
            "Review memory usage patterns and implement proper disposal".to_owned()
        });
        Ok(Some(verdict))
    }
}
