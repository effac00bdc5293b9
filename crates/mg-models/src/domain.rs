//! Hand-written wrapper models.
//!
//! These are the strongly typed shapes callers work with. Every field has a
//! value: the entity mappers fill gaps in generated records with the defaults
//! documented in [`mg_mapping::convert`].

use chrono::{DateTime, Utc};
use mg_mapping::ModelType;
use mg_mapping::convert::AdditionalData;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A budget line in a project's cost breakdown.
///
/// Amounts carry two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCode {
    /// Identifier, `0` when unknown.
    pub id: i64,
    /// Cost code, e.g. `01.001`.
    pub code: String,
    /// Free-text description.
    pub description: String,
    /// Budgeted amount.
    pub budget_amount: Decimal,
    /// Amount spent so far.
    pub actual_amount: Decimal,
    /// Amount committed by contracts.
    pub committed_amount: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl ModelType for CostCode {
    const TYPE_NAME: &'static str = "CostCode";
}

/// A company, either an account owner or a vendor referenced by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Identifier, `0` when unknown.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the company is active.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Logo location.
    pub logo_url: Option<String>,
    /// Postal address.
    pub address: Option<Address>,
    /// Fields the generated record carried that have no typed counterpart.
    #[serde(default)]
    pub custom_fields: AdditionalData,
}

impl ModelType for Company {
    const TYPE_NAME: &'static str = "Company";
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// First street line.
    pub street1: Option<String>,
    /// Second street line.
    pub street2: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or province code.
    pub state: Option<String>,
    /// Country code.
    pub country: Option<String>,
    /// Postal or ZIP code.
    pub postal_code: Option<String>,
}

/// A person with an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identifier, `0` when unknown.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Job title.
    pub job_title: Option<String>,
    /// Whether the account is active.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Most recent sign-in, if the user ever signed in.
    pub last_sign_in_at: Option<DateTime<Utc>>,
    /// Absolute URL of the avatar image.
    pub avatar_url: Option<String>,
    /// Preferred contact number.
    pub phone_number: Option<String>,
    /// Vendor company the user belongs to.
    pub company: Option<Company>,
    /// Fields the generated record carried that have no typed counterpart.
    #[serde(default)]
    pub custom_fields: AdditionalData,
}

impl ModelType for User {
    const TYPE_NAME: &'static str = "User";
}

impl User {
    /// Returns `first last`, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}
