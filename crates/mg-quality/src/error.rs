//! Error types for the mg-quality crate.
//!
//! - [`GateEvaluationError`] - one gate could not be evaluated; only that
//!   gate fails
//! - [`AssessmentError`] - the whole assessment was aborted

/// A gate evaluator rejected its input or panicked.
///
/// The validator turns this into a failed gate result with score 0. Sibling
/// gates are unaffected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateEvaluationError {
    /// A measurement was NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// Name of the measurement.
        field: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A measurement was outside its valid range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the measurement.
        field: &'static str,
        /// The offending value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },

    /// A measurement that cannot be negative was.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the measurement.
        field: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Counts in the input contradict each other.
    #[error("inconsistent counts: {0}")]
    InconsistentCounts(String),

    /// The evaluator panicked.
    #[error("evaluator panicked: {0}")]
    Panicked(String),
}

impl GateEvaluationError {
    /// Returns `value` if it is finite.
    pub fn finite(field: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { field, value })
        }
    }

    /// Returns `value` if it is finite and within `[min, max]`.
    pub fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, Self> {
        let value = Self::finite(field, value)?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }

    /// Returns `value` if it is a fraction in `[0, 1]`.
    #[inline]
    pub fn fraction(field: &'static str, value: f64) -> Result<f64, Self> {
        Self::in_range(field, value, 0.0, 1.0)
    }

    /// Returns `value` if it is finite and not negative.
    #[inline]
    pub fn non_negative(field: &'static str, value: f64) -> Result<f64, Self> {
        let value = Self::finite(field, value)?;
        if value < 0.0 {
            return Err(Self::Negative { field, value });
        }
        Ok(value)
    }

    /// Returns `true` if the evaluator itself misbehaved rather than the data.
    #[inline]
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// An assessment could not run to completion.
///
/// Returned results keep whatever gate results had completed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    /// The assessment data names no subject.
    #[error("assessment subject must not be empty")]
    EmptySubject,

    /// The gate configuration failed validation.
    #[error("invalid gate configuration: {0}")]
    InvalidConfiguration(String),

    /// Aggregation did not see one finite score per gate.
    #[error("aggregation produced {finite} finite gate scores, expected {expected}")]
    IncompleteAggregation {
        /// Number of finite scores found.
        finite: usize,
        /// Number of gates evaluated.
        expected: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_helpers() {
        assert_eq!(GateEvaluationError::fraction("coverage", 0.5), Ok(0.5));
        assert!(matches!(
            GateEvaluationError::fraction("coverage", 1.5),
            Err(GateEvaluationError::OutOfRange { field: "coverage", .. })
        ));
        assert!(matches!(
            GateEvaluationError::non_negative("growth", f64::NAN),
            Err(GateEvaluationError::NonFinite { .. })
        ));
        assert_eq!(
            GateEvaluationError::non_negative("growth", -0.1),
            Err(GateEvaluationError::Negative {
                field: "growth",
                value: -0.1
            })
        );
    }

    #[test]
    fn test_display() {
        let err = GateEvaluationError::fraction("overall_coverage", 1.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "overall_coverage must be within [0, 1], got 1.5"
        );
        assert_eq!(
            AssessmentError::IncompleteAggregation {
                finite: 7,
                expected: 8
            }
            .to_string(),
            "aggregation produced 7 finite gate scores, expected 8"
        );
    }
}
