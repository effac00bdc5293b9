//! Record shapes as the generated REST client produces them.
//!
//! Every scalar is nullable and anything the client did not model lands in
//! `additional_data`. Serde flattens that map, so a JSON payload with unknown
//! keys deserializes without loss.

use chrono::{DateTime, Utc};
use mg_mapping::ModelType;
use mg_mapping::convert::AdditionalData;
use serde::{Deserialize, Serialize};

/// Cost code payload. The client models none of its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCostCode {
    /// Every field of the payload.
    #[serde(flatten)]
    pub additional_data: AdditionalData,
}

impl ModelType for GeneratedCostCode {
    const TYPE_NAME: &'static str = "GeneratedCostCode";
}

/// A company reference nested in other payloads. Only the name is modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCompanyRef {
    /// Company name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub additional_data: AdditionalData,
}

impl ModelType for GeneratedCompanyRef {
    const TYPE_NAME: &'static str = "GeneratedCompanyRef";
}

/// Vendor block nested in a user payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedVendor {
    /// Vendor identifier.
    #[serde(default)]
    pub id: Option<i64>,
    /// Vendor name.
    #[serde(default)]
    pub name: Option<String>,
}

/// User payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedUser {
    /// Identifier.
    pub id: Option<i64>,
    /// Email address.
    pub email_address: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Most recent sign-in.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Business phone number.
    pub business_phone: Option<String>,
    /// Mobile phone number.
    pub mobile_phone: Option<String>,
    /// Vendor the user belongs to.
    pub vendor: Option<GeneratedVendor>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State code.
    pub state_code: Option<String>,
    /// Country code.
    pub country_code: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub additional_data: AdditionalData,
}

impl ModelType for GeneratedUser {
    const TYPE_NAME: &'static str = "GeneratedUser";
}
