//! Domain enums shared across the workspace.
//!
//! - [`GateKind`] - the eight quality gates, in evaluation order
//! - [`QualityGrade`] - banded verdict for a 0-100 quality score
//! - [`PerformanceGrade`] - banded verdict for a mapper's latency and error rate

mod gate;
mod grade;

pub use gate::GateKind;
pub use grade::{PerformanceGrade, QualityGrade};
