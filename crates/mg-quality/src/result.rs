//! Gate verdicts and the per-subject assessment result.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mg_core::{GateKind, QualityGrade};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

/// Recommendations attached to one gate; rarely more than three.
pub type Recommendations = SmallVec<[String; 4]>;

/// Verdict of one quality gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityGateResult {
    /// Which gate this is.
    pub kind: GateKind,
    /// Report name, e.g. `CodeCoverage`.
    pub name: &'static str,
    /// What the gate checks.
    pub description: &'static str,
    /// Whether the gate's thresholds were met.
    pub passed: bool,
    /// Score in [0, 100].
    pub score: f64,
    /// Human-readable summary of the measurements.
    pub details: String,
    /// Suggested follow-ups.
    pub recommendations: Recommendations,
    /// Time spent evaluating the gate.
    pub duration: Duration,
    /// When the gate finished.
    pub validated_at: DateTime<Utc>,
    /// Gate-specific measurements.
    pub metadata: BTreeMap<String, Value>,
}

impl QualityGateResult {
    /// Creates a failed, unscored result for `kind`.
    #[must_use]
    pub fn new(kind: GateKind) -> Self {
        Self {
            kind,
            name: kind.name(),
            description: kind.description(),
            passed: false,
            score: 0.0,
            details: String::new(),
            recommendations: Recommendations::new(),
            duration: Duration::ZERO,
            validated_at: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Records a gate-specific measurement.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }
}

impl fmt::Display for QualityGateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "{}: {status} (Score: {:.1})", self.name, self.score)
    }
}

/// Outcome of assessing one subject against all eight gates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityGateResults {
    /// Assessed subject.
    pub subject: String,
    /// When the assessment started.
    pub assessment_started_at: DateTime<Utc>,
    /// Wall time of the whole assessment.
    pub total_validation_time: Duration,
    /// One result per gate, in [`GateKind::ALL`] order.
    pub gate_results: Vec<QualityGateResult>,
    /// Mean of the gate scores.
    pub overall_quality_score: f64,
    /// Band of `overall_quality_score`.
    pub overall_grade: QualityGrade,
    /// Whether every gate passed.
    pub passed_all_gates: bool,
    /// Why the assessment was aborted, if it was.
    pub validation_error: Option<String>,
    /// Free-form summary measurements.
    pub summary_metrics: BTreeMap<String, Value>,
}

impl QualityGateResults {
    /// Creates an empty result for `subject`.
    #[must_use]
    pub fn new(subject: impl Into<String>, assessment_started_at: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            assessment_started_at,
            total_validation_time: Duration::ZERO,
            gate_results: Vec::new(),
            overall_quality_score: 0.0,
            overall_grade: QualityGrade::Poor,
            passed_all_gates: false,
            validation_error: None,
            summary_metrics: BTreeMap::new(),
        }
    }

    /// Number of gates that passed.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.gate_results.iter().filter(|g| g.passed).count()
    }

    /// Number of gates that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    /// Number of gates evaluated.
    #[inline]
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.gate_results.len()
    }

    /// Share of gates that passed, `0` when none were evaluated.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.gate_results.is_empty() {
            return 0.0;
        }
        crate::analysis::count_as_f64(self.passed_count())
            / crate::analysis::count_as_f64(self.total_count())
    }

    /// Returns `true` if the assessment ran to completion.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.validation_error.is_none()
    }

    /// Looks up a gate by report name, ignoring ASCII case.
    #[must_use]
    pub fn gate_result(&self, name: &str) -> Option<&QualityGateResult> {
        self.gate_results
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a gate by kind.
    #[must_use]
    pub fn gate(&self, kind: GateKind) -> Option<&QualityGateResult> {
        self.gate_results.iter().find(|g| g.kind == kind)
    }

    /// Iterates over the gates that failed.
    pub fn failed_gates(&self) -> impl Iterator<Item = &QualityGateResult> {
        self.gate_results.iter().filter(|g| !g.passed)
    }

    /// Every recommendation across all gates, first occurrence kept.
    #[must_use]
    pub fn all_recommendations(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for rec in self.gate_results.iter().flat_map(|g| &g.recommendations) {
            if !seen.contains(&rec.as_str()) {
                seen.push(rec.as_str());
            }
        }
        seen
    }

    /// Records a free-form summary measurement.
    pub fn add_summary_metric(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.summary_metrics.insert(key.into(), value.into());
    }

    /// Renders the plain-text quality report.
    #[must_use]
    pub fn generate_report(&self) -> String {
        QualityReport(self).to_string()
    }
}

/// Plain-text rendering of [`QualityGateResults`].
struct QualityReport<'a>(&'a QualityGateResults);

impl fmt::Display for QualityReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "=== Quality Assessment Report for {} ===", r.subject)?;
        writeln!(
            f,
            "Assessment Time: {}",
            r.assessment_started_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(
            f,
            "Total Validation Time: {:.0}ms",
            r.total_validation_time.as_secs_f64() * 1000.0
        )?;
        writeln!(f, "Overall Score: {:.1}/100", r.overall_quality_score)?;
        writeln!(f, "Overall Grade: {}", r.overall_grade)?;
        writeln!(
            f,
            "Gates Passed: {}/{} ({:.2}%)",
            r.passed_count(),
            r.total_count(),
            r.pass_rate() * 100.0
        )?;
        writeln!(f)?;

        writeln!(f, "=== Gate Results ===")?;
        let mut by_score: Vec<&QualityGateResult> = r.gate_results.iter().collect();
        by_score.sort_by(|a, b| b.score.total_cmp(&a.score));
        for gate in by_score {
            let status = if gate.passed { "✓ PASS" } else { "✗ FAIL" };
            writeln!(
                f,
                "{status} {}: {:.1} - {}",
                gate.name, gate.score, gate.details
            )?;
            for rec in &gate.recommendations {
                writeln!(f, "  → {rec}")?;
            }
        }

        let recommendations = r.all_recommendations();
        if !recommendations.is_empty() {
            writeln!(f)?;
            writeln!(f, "=== Summary Recommendations ===")?;
            for rec in recommendations {
                writeln!(f, "• {rec}")?;
            }
        }

        if let Some(error) = &r.validation_error {
            writeln!(f)?;
            writeln!(f, "=== Validation Error ===")?;
            writeln!(f, "{error}")?;
        }
        Ok(())
    }
}
