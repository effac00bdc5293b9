//! Grade bands for quality scores and mapper performance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Banded verdict for a 0-100 quality score.
///
/// # Examples
///
/// ```
/// use mg_core::QualityGrade;
///
/// assert_eq!(QualityGrade::from_score(95.0), QualityGrade::Excellent);
/// assert_eq!(QualityGrade::from_score(59.9), QualityGrade::Poor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum QualityGrade {
    /// Score of 90 or above.
    Excellent,
    /// Score of 80 or above.
    Good,
    /// Score of 70 or above.
    Satisfactory,
    /// Score of 60 or above.
    NeedsImprovement,
    /// Anything lower, including non-finite scores.
    #[default]
    Poor,
}

impl QualityGrade {
    /// All grades from best to worst.
    pub const ALL: [Self; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Satisfactory,
        Self::NeedsImprovement,
        Self::Poor,
    ];

    /// Bands a 0-100 score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Good
        } else if score >= 70.0 {
            Self::Satisfactory
        } else if score >= 60.0 {
            Self::NeedsImprovement
        } else {
            Self::Poor
        }
    }

    /// Returns a human-readable label for this grade.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Poor => "Poor",
        }
    }

    /// Returns `true` for grades of [`Satisfactory`](Self::Satisfactory) or better.
    #[inline]
    #[must_use]
    pub const fn is_acceptable(self) -> bool {
        matches!(self, Self::Excellent | Self::Good | Self::Satisfactory)
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Banded verdict for a mapper's average latency and error rate.
///
/// A result lands in the best band whose latency *and* error-rate ceilings
/// it both meets.
///
/// | Grade        | avg ms | error rate |
/// |--------------|--------|------------|
/// | Excellent    | ≤ 0.5  | ≤ 0.001    |
/// | Good         | ≤ 1.0  | ≤ 0.005    |
/// | Acceptable   | ≤ 2.0  | ≤ 0.01     |
/// | Poor         | ≤ 5.0  | ≤ 0.05     |
/// | Unacceptable | else   |            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PerformanceGrade {
    /// Sub-half-millisecond with almost no errors.
    Excellent,
    /// Within the default one-millisecond target.
    Good,
    /// Within the default gate threshold.
    Acceptable,
    /// Slow or flaky, but not broken.
    Poor,
    /// Outside every band.
    Unacceptable,
}

impl PerformanceGrade {
    const BANDS: [(f64, f64, Self); 4] = [
        (0.5, 0.001, Self::Excellent),
        (1.0, 0.005, Self::Good),
        (2.0, 0.01, Self::Acceptable),
        (5.0, 0.05, Self::Poor),
    ];

    /// Grades an average latency in milliseconds and an error rate in [0, 1].
    ///
    /// # Examples
    ///
    /// ```
    /// use mg_core::PerformanceGrade;
    ///
    /// assert_eq!(PerformanceGrade::from_measurements(0.2, 0.0), PerformanceGrade::Excellent);
    /// assert_eq!(PerformanceGrade::from_measurements(0.2, 0.02), PerformanceGrade::Poor);
    /// ```
    #[must_use]
    pub fn from_measurements(average_ms: f64, error_rate: f64) -> Self {
        Self::BANDS
            .into_iter()
            .find(|&(max_ms, max_rate, _)| average_ms <= max_ms && error_rate <= max_rate)
            .map_or(Self::Unacceptable, |(_, _, grade)| grade)
    }

    /// Returns a human-readable label for this grade.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Acceptable => "Acceptable",
            Self::Poor => "Poor",
            Self::Unacceptable => "Unacceptable",
        }
    }
}

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
