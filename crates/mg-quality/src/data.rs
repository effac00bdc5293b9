//! The per-subject bag of analysis artifacts fed to the validator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{
    ArchitectureAnalysisResult, CompilationResult, ComplexityAnalysisResult, CoverageResult,
    MemoryAnalysisResult, RetryPolicyResult, SecurityAnalysisResult,
};
use crate::perf::MapperPerformanceResult;

/// Analysis artifacts for one subject, each independently optional.
///
/// Gates whose artifact is absent fall back to their configured
/// [`MissingDataPolicy`](mg_core::MissingDataPolicy).
///
/// # Examples
///
/// ```
/// use mg_quality::{CoverageResult, QualityAssessmentData};
///
/// let data = QualityAssessmentData::new("Core")
///     .with_coverage(CoverageResult::new(0.85, 0.92, 0.80))
///     .with_metric("endpoints", 42);
///
/// assert!(data.coverage.is_some());
/// assert_eq!(data.metric::<u32>("endpoints"), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityAssessmentData {
    /// What is being assessed, e.g. a client or module name.
    pub subject: String,
    /// When the artifacts were collected.
    pub assessed_at: DateTime<Utc>,
    /// Coverage fractions.
    pub coverage: Option<CoverageResult>,
    /// Complexity measurements.
    pub complexity: Option<ComplexityAnalysisResult>,
    /// Security findings.
    pub security: Option<SecurityAnalysisResult>,
    /// Build outcome.
    pub compilation: Option<CompilationResult>,
    /// Architecture findings.
    pub architecture: Option<ArchitectureAnalysisResult>,
    /// One result per measured mapper.
    pub performance: Vec<MapperPerformanceResult>,
    /// One result per replayed failure scenario.
    pub resilience: Vec<RetryPolicyResult>,
    /// One result per load run.
    pub memory: Vec<MemoryAnalysisResult>,
    /// Free-form measurements that have no gate.
    pub additional_metrics: BTreeMap<String, Value>,
}

impl Default for QualityAssessmentData {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl QualityAssessmentData {
    /// Creates an empty bag for `subject`, stamped with the current time.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            assessed_at: Utc::now(),
            coverage: None,
            complexity: None,
            security: None,
            compilation: None,
            architecture: None,
            performance: Vec::new(),
            resilience: Vec::new(),
            memory: Vec::new(),
            additional_metrics: BTreeMap::new(),
        }
    }

    /// Sets the coverage artifact.
    #[must_use]
    pub fn with_coverage(mut self, coverage: CoverageResult) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Sets the complexity artifact.
    #[must_use]
    pub fn with_complexity(mut self, complexity: ComplexityAnalysisResult) -> Self {
        self.complexity = Some(complexity);
        self
    }

    /// Sets the security artifact.
    #[must_use]
    pub fn with_security(mut self, security: SecurityAnalysisResult) -> Self {
        self.security = Some(security);
        self
    }

    /// Sets the compilation artifact.
    #[must_use]
    pub fn with_compilation(mut self, compilation: CompilationResult) -> Self {
        self.compilation = Some(compilation);
        self
    }

    /// Sets the architecture artifact.
    #[must_use]
    pub fn with_architecture(mut self, architecture: ArchitectureAnalysisResult) -> Self {
        self.architecture = Some(architecture);
        self
    }

    /// Appends mapper performance results.
    #[must_use]
    pub fn with_performance(
        mut self,
        results: impl IntoIterator<Item = MapperPerformanceResult>,
    ) -> Self {
        self.performance.extend(results);
        self
    }

    /// Appends retry-policy results.
    #[must_use]
    pub fn with_resilience(mut self, results: impl IntoIterator<Item = RetryPolicyResult>) -> Self {
        self.resilience.extend(results);
        self
    }

    /// Appends memory results.
    #[must_use]
    pub fn with_memory(mut self, results: impl IntoIterator<Item = MemoryAnalysisResult>) -> Self {
        self.memory.extend(results);
        self
    }

    /// Records a free-form metric.
    #[must_use]
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_metric(key, value);
        self
    }

    /// Records a free-form metric, replacing any previous value.
    pub fn add_metric(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.additional_metrics.insert(key.into(), value.into());
    }

    /// Reads a free-form metric as `T`, or `None` if it is absent or of
    /// another shape.
    #[must_use]
    pub fn metric<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.additional_metrics
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let data: QualityAssessmentData = serde_json::from_str(
            r#"{"subject": "Core", "compilation": {"compiled_successfully": true}}"#,
        )
        .unwrap();
        assert_eq!(data.subject, "Core");
        assert!(data.coverage.is_none());
        assert!(data.performance.is_empty());
        assert_eq!(data.compilation.unwrap().warning_count, 0);
    }

    #[test]
    fn test_metric_shape_mismatch_is_none() {
        let mut data = QualityAssessmentData::new("Core");
        data.add_metric("owner", "platform-team");
        assert_eq!(data.metric::<String>("owner").as_deref(), Some("platform-team"));
        assert_eq!(data.metric::<u32>("owner"), None);
        assert_eq!(data.metric::<u32>("missing"), None);
    }
}
