//! Wrapper models, generated record shapes, and their entity mappers.
//!
//! # Overview
//!
//! - [`domain`]: hand-written models ([`CostCode`], [`Company`], [`User`])
//! - [`generated`]: the nullable, open-map records the REST client produces
//! - [`mappers`]: one [`TypeMapper`](mg_mapping::TypeMapper) per pair, plus
//!   [`register_default_mappers`]
//!
//! | Wrapper      | Generated               | Lost on round trip                          |
//! |--------------|-------------------------|---------------------------------------------|
//! | [`CostCode`] | [`GeneratedCostCode`]   | sub-cent precision                          |
//! | [`Company`]  | [`GeneratedCompanyRef`] | everything except name and custom fields    |
//! | [`User`]     | [`GeneratedUser`]       | company fields other than id and name       |
//!
//! # Example
//!
//! ```
//! use mg_mapping::{BidirectionalMapper, MapperRegistry};
//! use mg_models::{CostCode, GeneratedCostCode, register_default_mappers};
//! use rust_decimal::Decimal;
//! use serde_json::json;
//!
//! let registry = MapperRegistry::new();
//! register_default_mappers(&registry);
//!
//! let generated: GeneratedCostCode =
//!     serde_json::from_value(json!({ "id": 1, "code": "01.001", "budget_amount": 123.455 })).unwrap();
//!
//! let mapper = registry.get_mapper::<CostCode, GeneratedCostCode>().unwrap();
//! let cost_code = mapper.map_to_wrapper(Some(&generated)).unwrap();
//! assert_eq!(cost_code.budget_amount, Decimal::new(12_346, 2));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod domain;
pub mod generated;
pub mod mappers;

pub use domain::{Address, Company, CostCode, User};
pub use generated::{GeneratedCompanyRef, GeneratedCostCode, GeneratedUser, GeneratedVendor};
pub use mappers::{CompanyRefMapper, CostCodeMapper, UserMapper, register_default_mappers};
