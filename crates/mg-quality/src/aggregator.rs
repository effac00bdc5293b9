//! Cross-subject roll-up of assessment results.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mg_core::QualityGrade;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::analysis::count_as_f64;
use crate::result::QualityGateResults;

const MAX_FAILURES: usize = 5;
const MAX_RECOMMENDATIONS: usize = 10;
const EXECUTIVE_RECOMMENDATIONS: usize = 5;

/// Collects [`QualityGateResults`] from many subjects.
///
/// Safe to share between threads; each subject's assessment can push its
/// result as soon as it finishes.
///
/// # Examples
///
/// ```
/// use mg_core::QualityGateConfiguration;
/// use mg_quality::{QualityAssessmentData, QualityGateValidator, QualityMetricsAggregator};
///
/// let validator = QualityGateValidator::new();
/// let aggregator = QualityMetricsAggregator::new();
/// for subject in ["Core", "ProjectManagement"] {
///     let data = QualityAssessmentData::new(subject);
///     aggregator.add_result(validator.validate_all_gates(&data, &QualityGateConfiguration::default()));
/// }
///
/// let summary = aggregator.generate_summary();
/// assert_eq!(summary.total_subjects_analyzed, 2);
/// assert_eq!(summary.most_common_failures[0].failures, 2);
/// ```
#[derive(Debug, Default)]
pub struct QualityMetricsAggregator {
    results: Mutex<Vec<QualityGateResults>>,
}

impl QualityMetricsAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one subject's results.
    pub fn add_result(&self, result: QualityGateResults) {
        debug!(subject = %result.subject, score = result.overall_quality_score, "Result aggregated");
        self.results.lock().push(result);
    }

    /// Number of results collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Returns `true` if no results have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }

    /// Discards every collected result.
    pub fn reset(&self) {
        self.results.lock().clear();
    }

    /// Summarizes the collected results.
    #[must_use]
    pub fn generate_summary(&self) -> QualityMetricsSummary {
        let results = self.results.lock();
        let mut summary = QualityMetricsSummary::empty();
        if results.is_empty() {
            return summary;
        }

        let scores = results.iter().map(|r| r.overall_quality_score);
        summary.total_subjects_analyzed = results.len();
        summary.subjects_passing_all_gates = results.iter().filter(|r| r.passed_all_gates).count();
        summary.average_quality_score = scores.clone().sum::<f64>() / count_as_f64(results.len());
        summary.highest_quality_score = scores.clone().fold(f64::NEG_INFINITY, f64::max);
        summary.lowest_quality_score = scores.fold(f64::INFINITY, f64::min);
        summary.total_validation_time = results.iter().map(|r| r.total_validation_time).sum();

        for result in results.iter() {
            *summary.grade_distribution.entry(result.overall_grade).or_insert(0) += 1;
        }

        summary.most_common_failures = rank(
            results
                .iter()
                .flat_map(QualityGateResults::failed_gates)
                .map(|gate| gate.name),
            MAX_FAILURES,
        )
        .into_iter()
        .map(|(gate, failures)| GateFailureCount {
            gate: gate.to_owned(),
            failures,
        })
        .collect();

        summary.top_recommendations = rank(
            results.iter().flat_map(QualityGateResults::all_recommendations),
            MAX_RECOMMENDATIONS,
        )
        .into_iter()
        .map(|(rec, _)| rec.to_owned())
        .collect();

        summary
    }
}

/// Counts occurrences and keeps the `limit` most frequent, ties in
/// first-seen order.
fn rank<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(&'a str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// How often one gate failed across subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateFailureCount {
    /// Gate report name.
    pub gate: String,
    /// Number of subjects that failed it.
    pub failures: usize,
}

/// Roll-up of every collected assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetricsSummary {
    /// Number of subjects assessed.
    pub total_subjects_analyzed: usize,
    /// Subjects that passed every gate.
    pub subjects_passing_all_gates: usize,
    /// Mean overall score.
    pub average_quality_score: f64,
    /// Best overall score.
    pub highest_quality_score: f64,
    /// Worst overall score.
    pub lowest_quality_score: f64,
    /// Sum of per-subject validation times.
    pub total_validation_time: Duration,
    /// When the summary was built.
    pub generated_at: DateTime<Utc>,
    /// Subjects per overall grade.
    pub grade_distribution: BTreeMap<QualityGrade, usize>,
    /// The most frequently failed gates, most frequent first.
    pub most_common_failures: Vec<GateFailureCount>,
    /// The most frequent recommendations, most frequent first.
    pub top_recommendations: Vec<String>,
}

impl QualityMetricsSummary {
    fn empty() -> Self {
        Self {
            total_subjects_analyzed: 0,
            subjects_passing_all_gates: 0,
            average_quality_score: 0.0,
            highest_quality_score: 0.0,
            lowest_quality_score: 0.0,
            total_validation_time: Duration::ZERO,
            generated_at: Utc::now(),
            grade_distribution: BTreeMap::new(),
            most_common_failures: Vec::new(),
            top_recommendations: Vec::new(),
        }
    }

    /// Share of subjects that passed every gate, `0` for an empty summary.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total_subjects_analyzed == 0 {
            return 0.0;
        }
        count_as_f64(self.subjects_passing_all_gates) / count_as_f64(self.total_subjects_analyzed)
    }

    /// Renders the plain-text executive summary.
    #[must_use]
    pub fn generate_executive_summary(&self) -> String {
        ExecutiveSummary(self).to_string()
    }
}

struct ExecutiveSummary<'a>(&'a QualityMetricsSummary);

impl fmt::Display for ExecutiveSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        writeln!(f, "=== Executive Quality Summary ===")?;
        writeln!(f, "Generated: {}", s.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Subjects Analyzed: {}", s.total_subjects_analyzed)?;
        writeln!(
            f,
            "Overall Pass Rate: {:.2}% ({}/{})",
            s.pass_rate() * 100.0,
            s.subjects_passing_all_gates,
            s.total_subjects_analyzed
        )?;
        writeln!(f, "Average Quality Score: {:.1}/100", s.average_quality_score)?;
        writeln!(
            f,
            "Quality Range: {:.1} - {:.1}",
            s.lowest_quality_score, s.highest_quality_score
        )?;
        writeln!(
            f,
            "Total Analysis Time: {:.1} seconds",
            s.total_validation_time.as_secs_f64()
        )?;
        writeln!(f)?;

        if !s.grade_distribution.is_empty() {
            writeln!(f, "=== Grade Distribution ===")?;
            for (grade, &count) in &s.grade_distribution {
                let share = count_as_f64(count) / count_as_f64(s.total_subjects_analyzed);
                writeln!(f, "{grade}: {count} ({:.2}%)", share * 100.0)?;
            }
            writeln!(f)?;
        }

        if !s.most_common_failures.is_empty() {
            writeln!(f, "=== Most Common Gate Failures ===")?;
            for failure in &s.most_common_failures {
                writeln!(f, "{}: {} failures", failure.gate, failure.failures)?;
            }
            writeln!(f)?;
        }

        if !s.top_recommendations.is_empty() {
            writeln!(f, "=== Top Recommendations ===")?;
            for rec in s.top_recommendations.iter().take(EXECUTIVE_RECOMMENDATIONS) {
                writeln!(f, "• {rec}")?;
            }
        }
        Ok(())
    }
}
