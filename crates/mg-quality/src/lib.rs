//! Quality-gate engine for mapgate.
//!
//! Scores one subject (a client, a module, a mapper set) against eight
//! quality gates and rolls results up across subjects.
//!
//! # Overview
//!
//! - [`QualityAssessmentData`]: the analysis artifacts for one subject, each
//!   optional
//! - [`QualityGateValidator`]: evaluates the eight gates concurrently and
//!   aggregates them into [`QualityGateResults`]
//! - [`GateEvaluator`]: the per-gate scoring seam; the built-in evaluators can
//!   be replaced one gate at a time
//! - [`MapperPerformanceResult`] / [`PerformanceProbe`]: performance gate input
//!   taken from live [`MapperRegistry`](mg_mapping::MapperRegistry) metrics or
//!   from a timed run
//! - [`QualityMetricsAggregator`]: cross-subject summary and executive report
//!
//! # Example
//!
//! ```
//! use mg_core::{GateKind, QualityGateConfiguration};
//! use mg_quality::{
//!     CompilationResult, CoverageResult, QualityAssessmentData, QualityGateValidator,
//! };
//!
//! let data = QualityAssessmentData::new("Core")
//!     .with_coverage(CoverageResult::new(0.95, 0.95, 0.95))
//!     .with_compilation(CompilationResult {
//!         compiled_successfully: true,
//!         error_count: 0,
//!         warning_count: 2,
//!     });
//!
//! let results = QualityGateValidator::new()
//!     .validate_all_gates(&data, &QualityGateConfiguration::default());
//!
//! let coverage = results.gate(GateKind::Coverage).unwrap();
//! assert!(coverage.passed);
//! assert!((coverage.score - 95.0).abs() < 0.01);
//! assert!(results.generate_report().contains("Compilation: 90.0"));
//! ```
//!
//! # Architecture
//!
//! ```text
//! QualityGateValidator::validate_all_gates(data, config)
//!     │
//!     ├── subject / config checks ──────────────► AssessmentError (abort)
//!     │
//!     ├── rayon par_iter over 8 evaluators (order-preserving collect)
//!     │       │
//!     │       ├── catch_unwind(evaluator.evaluate)
//!     │       ├── Ok(Some(verdict)) → scored result
//!     │       ├── Ok(None)          → MissingDataPolicy
//!     │       └── Err / panic       → failed result, score 0
//!     │
//!     └── mean score, grade, passed-all ────────► QualityGateResults
//!                                                    │
//!                                 QualityMetricsAggregator (Mutex<Vec<_>>)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod analysis;
pub mod data;
pub mod error;
pub mod gates;
pub mod perf;
pub mod result;
pub mod validator;

pub use aggregator::{GateFailureCount, QualityMetricsAggregator, QualityMetricsSummary};
pub use analysis::{
    ArchitectureAnalysisResult, ArchitectureViolation, CompilationResult, ComplexityAnalysisResult,
    ComplexityLevel, ComplexityViolation, CoverageResult, MemoryAnalysisResult, RetryPolicyResult,
    SecurityAnalysisResult, SecuritySeverity, SecurityViolation,
};
pub use data::QualityAssessmentData;
pub use error::{AssessmentError, GateEvaluationError};
pub use gates::{GateEvaluator, GateVerdict, default_evaluators};
pub use perf::{MapperPerformanceResult, PerformanceProbe};
pub use result::{QualityGateResult, QualityGateResults, Recommendations};
pub use validator::QualityGateValidator;
