//! [`Company`] ↔ [`GeneratedCompanyRef`].
//!
//! Company references carry a name and nothing else the client models. The
//! id, description, active flag, timestamps, logo, and address do not
//! survive a round trip: mapping back yields id `0`, an active company, and
//! the current time.

use chrono::Utc;
use mg_mapping::convert;
use mg_mapping::{BoxError, TypeMapper};

use crate::domain::Company;
use crate::generated::GeneratedCompanyRef;

/// Open-map keys owned by the typed fields of [`GeneratedCompanyRef`].
pub const SYSTEM_KEYS: &[&str] = &["name"];

/// Maps company references.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyRefMapper;

impl TypeMapper for CompanyRefMapper {
    type Wrapper = Company;
    type Generated = GeneratedCompanyRef;

    fn to_wrapper(&self, source: &GeneratedCompanyRef) -> Result<Company, BoxError> {
        let now = Utc::now();
        Ok(Company {
            id: 0,
            name: convert::map_string(source.name.as_deref()),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            logo_url: None,
            address: None,
            custom_fields: convert::extract_custom_fields(&source.additional_data, SYSTEM_KEYS),
        })
    }

    fn to_generated(&self, source: &Company) -> Result<GeneratedCompanyRef, BoxError> {
        Ok(GeneratedCompanyRef {
            name: Some(source.name.clone()),
            additional_data: convert::extract_custom_fields(&source.custom_fields, SYSTEM_KEYS),
        })
    }
}
