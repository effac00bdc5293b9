//! Static-analysis artifacts consumed by the quality gates.
//!
//! Each artifact is produced by an external tool (coverage runner, linter,
//! compiler, load test) and deserialized from JSON. Artifacts that carry a
//! verdict of their own expose it as a grade.

use mg_core::QualityGrade;
use serde::{Deserialize, Serialize};

/// Coverage fractions for one subject, each in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageResult {
    /// Line coverage over the whole subject.
    pub overall_coverage: f64,
    /// Line coverage over code marked as critical.
    pub critical_path_coverage: f64,
    /// Branch coverage.
    pub branch_coverage: f64,
    /// Statement coverage.
    pub statement_coverage: f64,
}

impl CoverageResult {
    /// Creates a result from the three gated fractions.
    #[must_use]
    pub const fn new(overall: f64, critical_path: f64, branch: f64) -> Self {
        Self {
            overall_coverage: overall,
            critical_path_coverage: critical_path,
            branch_coverage: branch,
            statement_coverage: overall,
        }
    }

    /// `0.4 × overall + 0.6 × critical path`, in [0, 1].
    #[must_use]
    pub fn weighted_coverage(&self) -> f64 {
        self.overall_coverage * 0.4 + self.critical_path_coverage * 0.6
    }

    /// Grades the weighted coverage.
    ///
    /// # Examples
    ///
    /// ```
    /// use mg_core::QualityGrade;
    /// use mg_quality::CoverageResult;
    ///
    /// assert_eq!(CoverageResult::new(0.97, 0.97, 0.90).grade(), QualityGrade::Excellent);
    /// assert_eq!(CoverageResult::new(0.60, 0.70, 0.50).grade(), QualityGrade::Poor);
    /// ```
    #[must_use]
    pub fn grade(&self) -> QualityGrade {
        let score = self.weighted_coverage();
        if score >= 0.95 {
            QualityGrade::Excellent
        } else if score >= 0.90 {
            QualityGrade::Good
        } else if score >= 0.80 {
            QualityGrade::Satisfactory
        } else if score >= 0.70 {
            QualityGrade::NeedsImprovement
        } else {
            QualityGrade::Poor
        }
    }
}

/// Cyclomatic complexity band of a single method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    /// 1 to 5.
    #[default]
    Low,
    /// 6 to 10.
    Moderate,
    /// 11 to 20.
    High,
    /// 21 to 50.
    VeryHigh,
    /// Above 50.
    Extreme,
}

impl ComplexityLevel {
    /// Bands a cyclomatic complexity score.
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        match score {
            0..=5 => Self::Low,
            6..=10 => Self::Moderate,
            11..=20 => Self::High,
            21..=50 => Self::VeryHigh,
            _ => Self::Extreme,
        }
    }
}

/// A method whose complexity exceeds its threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityViolation {
    /// Type declaring the method.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Method name.
    pub method: String,
    /// Measured cyclomatic complexity.
    pub complexity_score: u32,
    /// Threshold the method exceeded.
    pub threshold: u32,
    /// Band of `complexity_score`.
    pub level: ComplexityLevel,
    /// Suggested fix.
    pub recommendation: String,
}

/// Complexity measurements for one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityAnalysisResult {
    /// Methods over their threshold.
    pub violations: Vec<ComplexityViolation>,
    /// Mean complexity over all methods.
    pub average_complexity: f64,
    /// Highest complexity of any method.
    pub max_complexity: u32,
    /// Number of methods analysed.
    pub total_methods: u32,
}

impl ComplexityAnalysisResult {
    /// Share of methods in violation, `0` when no methods were analysed.
    #[must_use]
    pub fn violation_rate(&self) -> f64 {
        if self.total_methods == 0 {
            return 0.0;
        }
        count_as_f64(self.violations.len()) / f64::from(self.total_methods)
    }

    /// Grades the violation rate.
    #[must_use]
    pub fn grade(&self) -> QualityGrade {
        let rate = self.violation_rate();
        if rate <= 0.05 {
            QualityGrade::Excellent
        } else if rate <= 0.10 {
            QualityGrade::Good
        } else if rate <= 0.20 {
            QualityGrade::Satisfactory
        } else if rate <= 0.30 {
            QualityGrade::NeedsImprovement
        } else {
            QualityGrade::Poor
        }
    }
}

/// Severity of a security finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecuritySeverity {
    /// Informational.
    #[default]
    Low,
    /// Should be fixed.
    Medium,
    /// Must be fixed before release.
    High,
    /// Must be fixed immediately.
    Critical,
}

/// One security finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityViolation {
    /// Type the finding is about.
    #[serde(rename = "type")]
    pub type_name: String,
    /// What is wrong.
    pub issue: String,
    /// How bad it is.
    pub severity: SecuritySeverity,
    /// Suggested fix.
    pub recommendation: String,
    /// Rule that produced the finding.
    pub rule_name: String,
}

/// Security findings for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityAnalysisResult {
    /// All findings.
    pub violations: Vec<SecurityViolation>,
    /// Number of rules evaluated.
    pub rules_applied: u32,
}

impl SecurityAnalysisResult {
    /// Number of findings with the given severity.
    #[must_use]
    pub fn count(&self, severity: SecuritySeverity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Grades by critical and high-severity counts.
    ///
    /// Any critical finding is [`QualityGrade::Poor`].
    #[must_use]
    pub fn grade(&self) -> QualityGrade {
        match (
            self.count(SecuritySeverity::Critical),
            self.count(SecuritySeverity::High),
        ) {
            (0, 0) => QualityGrade::Excellent,
            (0, 1..=2) => QualityGrade::Good,
            (0, 3..=5) => QualityGrade::Satisfactory,
            (0, _) => QualityGrade::NeedsImprovement,
            _ => QualityGrade::Poor,
        }
    }
}

/// Outcome of building one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilationResult {
    /// Whether the build produced an artifact.
    pub compiled_successfully: bool,
    /// Number of compiler errors.
    pub error_count: u32,
    /// Number of compiler warnings.
    pub warning_count: u32,
}

impl CompilationResult {
    /// Grades by build success and warning count.
    #[must_use]
    pub const fn grade(&self) -> QualityGrade {
        if !self.compiled_successfully || self.error_count > 0 {
            return QualityGrade::Poor;
        }
        match self.warning_count {
            0 => QualityGrade::Excellent,
            1..=5 => QualityGrade::Good,
            6..=10 => QualityGrade::Satisfactory,
            _ => QualityGrade::NeedsImprovement,
        }
    }
}

/// A breach of a design principle, such as single responsibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureViolation {
    /// Offending type.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Principle that was breached.
    pub principle: String,
    /// What is wrong.
    pub issue: String,
}

/// Architecture findings for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureAnalysisResult {
    /// All findings.
    pub violations: Vec<ArchitectureViolation>,
}

/// Outcome of replaying one failure scenario through a retry policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicyResult {
    /// HTTP status the scenario injected.
    pub status_code: u16,
    /// Retries performed.
    pub retry_attempts: u32,
    /// Whether a retry eventually succeeded.
    pub eventually_succeeded: bool,
    /// Wall time of the whole scenario, in milliseconds.
    pub total_time_ms: f64,
    /// Delay before each retry, in milliseconds.
    pub retry_delays_ms: Vec<f64>,
}

/// Memory behaviour of one load run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryAnalysisResult {
    /// Growth of the heap over the run, in megabytes.
    pub memory_growth_mb: f64,
    /// Full (gen-2) garbage collections during the run.
    pub gen2_collections: u32,
    /// Operations performed.
    pub operations_performed: u64,
    /// Heap size before the run.
    pub initial_memory_bytes: u64,
    /// Heap size after the run.
    pub final_memory_bytes: u64,
}

/// Converts a count to `f64` for rate arithmetic.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn count_as_f64(count: usize) -> f64 {
    count as f64
}
