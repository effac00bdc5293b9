//! Core types, configuration, and errors for mapgate.
//!
//! This crate provides the foundational types shared by the mapping and
//! quality crates:
//!
//! - [`ConfigError`] for configuration loading and validation
//! - [`QualityGateConfiguration`] and [`PerformanceTargets`], combined in [`Config`]
//! - [`MissingDataPolicy`] for gates whose input data is absent
//! - Domain enums ([`GateKind`], [`QualityGrade`], [`PerformanceGrade`])
//! - Type aliases for `FxHashMap`/`FxHashSet`

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{
    Config, GatePolicies, MissingDataPolicy, PerformanceTargets, QualityGateConfiguration,
};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
pub use types::{GateKind, PerformanceGrade, QualityGrade};
