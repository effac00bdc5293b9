//! Error types for the mg-mapping crate.
//!
//! - [`MappingError`] - a conversion could not be performed
//! - [`FieldError`] - a conversion hook's way of naming the offending field
//! - [`RegistryError`] - a strict registry lookup failed
//!
//! # Error Recovery Strategy
//!
//! - **Absent input** ([`MappingError::InvalidArgument`]): caller bug, never defaulted
//! - **Hook failure or panic** ([`MappingError::Conversion`]): wraps the cause once;
//!   an error that already is a [`MappingError`] passes through unchanged
//! - **Missing or unparseable fields**: not errors at all, see [`crate::convert`]

use std::error::Error as StdError;

use crate::mapper::MapperKey;

/// Boxed error returned by [`TypeMapper`](crate::TypeMapper) hooks.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced by [`Mapper`](crate::Mapper) conversions.
///
/// # Examples
///
/// ```
/// use mg_mapping::{FieldError, MappingError};
///
/// let err = MappingError::wrap("CostCodeDto", "CostCode", FieldError::new("code", "not a string").into());
/// assert_eq!(err.field(), Some("code"));
/// assert!(err.to_string().contains("CostCodeDto"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The input to a conversion was absent.
    #[error("cannot map {source_type} to {target_type}: input is absent")]
    InvalidArgument {
        /// Type name of the missing input.
        source_type: &'static str,
        /// Type name the call would have produced.
        target_type: &'static str,
    },

    /// A conversion hook failed or panicked.
    #[error("failed to map {source_type} to {target_type}{}: {cause}", describe_field(.field.as_deref()))]
    Conversion {
        /// Type name of the input.
        source_type: &'static str,
        /// Type name of the output.
        target_type: &'static str,
        /// Field that caused the failure, when the hook reported one.
        field: Option<String>,
        /// The underlying failure.
        #[source]
        cause: BoxError,
    },
}

fn describe_field(field: Option<&str>) -> String {
    field.map(|f| format!(" (field '{f}')")).unwrap_or_default()
}

impl MappingError {
    /// Creates a new [`MappingError::InvalidArgument`] error.
    #[inline]
    pub const fn invalid_argument(source_type: &'static str, target_type: &'static str) -> Self {
        Self::InvalidArgument {
            source_type,
            target_type,
        }
    }

    /// Wraps a hook failure.
    ///
    /// A cause that already is a `MappingError` is returned as-is. A
    /// [`FieldError`] cause contributes its field name.
    pub fn wrap(source_type: &'static str, target_type: &'static str, cause: BoxError) -> Self {
        let cause = match cause.downcast::<Self>() {
            Ok(already_wrapped) => return *already_wrapped,
            Err(cause) => cause,
        };
        let field = cause
            .downcast_ref::<FieldError>()
            .map(|e| e.field.clone());
        Self::Conversion {
            source_type,
            target_type,
            field,
            cause,
        }
    }

    /// Returns the input type name.
    #[must_use]
    pub const fn source_type(&self) -> &'static str {
        match self {
            Self::InvalidArgument { source_type, .. } | Self::Conversion { source_type, .. } => {
                source_type
            }
        }
    }

    /// Returns the output type name.
    #[must_use]
    pub const fn target_type(&self) -> &'static str {
        match self {
            Self::InvalidArgument { target_type, .. } | Self::Conversion { target_type, .. } => {
                target_type
            }
        }
    }

    /// Returns the offending field, if known.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Conversion { field, .. } => field.as_deref(),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Returns `true` for absent-input errors.
    #[inline]
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` if the failure should count against a mapper's error rate.
    ///
    /// Absent input is a caller error, not a mapper failure.
    #[inline]
    #[must_use]
    pub const fn counts_as_mapper_error(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }
}

/// A conversion failure attributable to one field.
///
/// Hooks return this (boxed) so that the resulting [`MappingError`] carries
/// the field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field '{field}': {reason}")]
pub struct FieldError {
    /// Name of the field.
    pub field: String,
    /// What was wrong with it.
    pub reason: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A panic caught inside a conversion hook.
#[derive(Debug, thiserror::Error)]
#[error("conversion panicked: {0}")]
pub(crate) struct ConversionPanic(pub(crate) String);

/// Errors produced by strict [`MapperRegistry`](crate::MapperRegistry) lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No mapper is registered under the key.
    #[error("no mapper registered for {key}")]
    NotRegistered {
        /// The key that was looked up.
        key: MapperKey,
    },

    /// A mapper is registered under the key, but for different Rust types
    /// that share the same type names.
    #[error("mapper registered for {key} does not convert the requested types")]
    TypeMismatch {
        /// The key that was looked up.
        key: MapperKey,
    },
}

impl RegistryError {
    /// Returns the key involved in the failed lookup.
    #[must_use]
    pub const fn key(&self) -> MapperKey {
        match self {
            Self::NotRegistered { key } | Self::TypeMismatch { key } => *key,
        }
    }
}
