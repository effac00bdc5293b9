//! Entity mappers and default registration.

pub mod company;
pub mod cost_code;
pub mod user;

use std::sync::Arc;

use mg_mapping::{MapperInfo, MapperRegistry};
use tracing::debug;

pub use company::CompanyRefMapper;
pub use cost_code::CostCodeMapper;
pub use user::UserMapper;

/// Registers every entity mapper in this crate, replacing any mapper already
/// registered for the same pair.
///
/// Returns the registered mappers in registration order.
pub fn register_default_mappers(registry: &MapperRegistry) -> Vec<Arc<dyn MapperInfo>> {
    let registered = vec![
        registry.register_mapper(CostCodeMapper) as Arc<dyn MapperInfo>,
        registry.register_mapper(CompanyRefMapper) as Arc<dyn MapperInfo>,
        registry.register_mapper(UserMapper) as Arc<dyn MapperInfo>,
    ];
    debug!(count = registered.len(), "Registered default mappers");
    registered
}
