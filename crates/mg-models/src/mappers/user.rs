//! [`User`] ↔ [`GeneratedUser`].
//!
//! The phone number is taken from the business phone, falling back to the
//! mobile phone. A vendor block becomes a [`Company`] holding only the
//! vendor's id and name; mapping back writes the company's address into the
//! user's address fields but does not read them again.
//!
//! Custom fields are the open-map entries whose keys are not [`SYSTEM_KEYS`].
//! A custom field that collides with a system key is dropped in both
//! directions.

use chrono::Utc;
use mg_mapping::convert;
use mg_mapping::{BoxError, FieldError, TypeMapper};

use crate::domain::{Company, User};
use crate::generated::{GeneratedUser, GeneratedVendor};

/// Keys the user payload reserves for its own fields.
pub const SYSTEM_KEYS: &[&str] = &[
    "address",
    "avatar",
    "business_id",
    "business_phone",
    "business_phone_extension",
    "city",
    "company_permission_template_id",
    "country_code",
    "created_at",
    "default_permission_template_id",
    "email_address",
    "email_signature",
    "employee_id",
    "fax_number",
    "first_name",
    "id",
    "initials",
    "is_active",
    "is_employee",
    "is_insurance_manager",
    "job_title",
    "last_login_at",
    "last_name",
    "locale",
    "mobile_phone",
    "name",
    "notes",
    "origin_data",
    "origin_id",
    "state_code",
    "updated_at",
    "vendor",
    "work_classification_id",
    "zip",
];

/// Maps users.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMapper;

impl TypeMapper for UserMapper {
    type Wrapper = User;
    type Generated = GeneratedUser;

    fn to_wrapper(&self, source: &GeneratedUser) -> Result<User, BoxError> {
        let avatar_url = convert::optional_string(source.avatar.as_deref());
        if let Some(url) = &avatar_url {
            if !is_absolute_url(url) {
                return Err(
                    FieldError::new("avatar", format!("'{url}' is not an absolute URL")).into(),
                );
            }
        }

        let phone_number = convert::first_non_blank(&[
            source.business_phone.as_deref(),
            source.mobile_phone.as_deref(),
        ])
        .map(str::to_owned);

        Ok(User {
            id: convert::map_id(source.id),
            email: convert::map_string(source.email_address.as_deref()),
            first_name: convert::map_string(source.first_name.as_deref()),
            last_name: convert::map_string(source.last_name.as_deref()),
            job_title: convert::optional_string(source.job_title.as_deref()),
            is_active: source.is_active.unwrap_or(false),
            created_at: convert::map_datetime(source.created_at),
            updated_at: convert::map_datetime(source.updated_at),
            last_sign_in_at: source.last_login_at,
            avatar_url,
            phone_number,
            company: source.vendor.as_ref().map(vendor_to_company),
            custom_fields: convert::extract_custom_fields(&source.additional_data, SYSTEM_KEYS),
        })
    }

    fn to_generated(&self, source: &User) -> Result<GeneratedUser, BoxError> {
        let address = source.company.as_ref().and_then(|c| c.address.as_ref());
        Ok(GeneratedUser {
            id: Some(source.id),
            email_address: Some(source.email.clone()),
            first_name: Some(source.first_name.clone()),
            last_name: Some(source.last_name.clone()),
            name: Some(source.full_name()),
            job_title: source.job_title.clone(),
            is_active: Some(source.is_active),
            created_at: Some(source.created_at),
            updated_at: Some(source.updated_at),
            last_login_at: source.last_sign_in_at,
            avatar: source.avatar_url.clone(),
            business_phone: source.phone_number.clone(),
            mobile_phone: None,
            vendor: source.company.as_ref().map(|c| GeneratedVendor {
                id: Some(c.id),
                name: Some(c.name.clone()),
            }),
            address: address.and_then(|a| a.street1.clone()),
            city: address.and_then(|a| a.city.clone()),
            state_code: address.and_then(|a| a.state.clone()),
            country_code: address.and_then(|a| a.country.clone()),
            zip: address.and_then(|a| a.postal_code.clone()),
            additional_data: convert::extract_custom_fields(&source.custom_fields, SYSTEM_KEYS),
        })
    }
}

fn vendor_to_company(vendor: &GeneratedVendor) -> Company {
    let now = Utc::now();
    Company {
        id: convert::map_id(vendor.id),
        name: convert::map_string(vendor.name.as_deref()),
        description: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        logo_url: None,
        address: None,
        custom_fields: convert::AdditionalData::default(),
    }
}

/// `scheme://rest` with a non-empty rest and an RFC 3986 scheme.
fn is_absolute_url(text: &str) -> bool {
    let Some((scheme, rest)) = text.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}
