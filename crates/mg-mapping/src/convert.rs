//! Field helpers shared by mapper implementations.
//!
//! Generated records are loosely typed: scalars may be absent, numbers may
//! arrive as strings, and unknown fields land in an open
//! `FxHashMap<String, serde_json::Value>`. These helpers turn that into
//! wrapper fields without failing:
//!
//! | Input                         | Result                    |
//! |-------------------------------|---------------------------|
//! | missing or non-positive id    | `0`                       |
//! | missing or blank string       | `""` (trimmed otherwise)  |
//! | missing or unparseable amount | `0`                       |
//! | missing or unparseable time   | `Utc::now()`              |
//!
//! Amounts are rounded half away from zero to two decimal places every time
//! they cross the mapping boundary.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use mg_core::FxHashMap;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Open map of fields the generated client did not model.
pub type AdditionalData = FxHashMap<String, Value>;

/// Decimal places kept for currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Normalises an identifier: positive values pass, anything else becomes 0.
#[inline]
#[must_use]
pub fn map_id(id: Option<i64>) -> i64 {
    id.filter(|&id| id > 0).unwrap_or(0)
}

/// Reads an identifier from a JSON number or numeric string.
#[must_use]
pub fn id_from_value(value: Option<&Value>) -> i64 {
    let id = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    map_id(id)
}

/// Trims a string, mapping absent or blank input to `""`.
#[must_use]
pub fn map_string(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_owned()
}

/// Reads a string field; non-string scalars are rendered, others become `""`.
#[must_use]
pub fn string_from_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => map_string(Some(s)),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Reads an optional string, keeping `None` for absent or blank values.
#[must_use]
pub fn optional_string(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Rounds to two decimal places, half away from zero.
///
/// # Examples
///
/// ```
/// use mg_mapping::convert::round_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_currency(Decimal::new(123_455, 3)), Decimal::new(12_346, 2));
/// assert_eq!(round_currency(Decimal::new(-5, 3)), Decimal::new(-1, 2));
/// ```
#[inline]
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a decimal from text, accepting plain and scientific notation.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

/// Reads a currency amount from a JSON number or numeric string.
///
/// Numbers are read through their shortest decimal rendering, so a JSON
/// `123.455` rounds to `123.46` rather than to the binary neighbour below it.
#[must_use]
pub fn decimal_from_value(value: Option<&Value>) -> Decimal {
    let parsed = match value {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s),
        _ => None,
    };
    round_currency(parsed.unwrap_or(Decimal::ZERO))
}

/// Renders a currency amount as a JSON number, or as a string when the
/// number would not read back as the same amount.
///
/// ```
/// use mg_mapping::convert::{decimal_from_value, decimal_to_value};
/// use rust_decimal::Decimal;
/// use serde_json::json;
///
/// assert_eq!(decimal_to_value(Decimal::new(12_346, 2)), json!(123.46));
///
/// let large = Decimal::new(1_234_567_890_123_456_78, 2);
/// assert_eq!(decimal_to_value(large), json!("1234567890123456.78"));
/// assert_eq!(decimal_from_value(Some(&decimal_to_value(large))), large);
/// ```
#[must_use]
pub fn decimal_to_value(amount: Decimal) -> Value {
    let amount = round_currency(amount);
    let text = amount.to_string();
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .filter(|n| parse_decimal(&n.to_string()).map(round_currency) == Some(amount))
        .map_or(Value::String(text), Value::Number)
}

/// Returns `value` or the current time.
#[inline]
#[must_use]
pub fn map_datetime(value: Option<DateTime<Utc>>) -> DateTime<Utc> {
    value.unwrap_or_else(Utc::now)
}

/// Reads a timestamp from an RFC 3339 string or Unix seconds.
#[must_use]
pub fn datetime_from_value(value: Option<&Value>) -> DateTime<Utc> {
    let parsed = match value {
        Some(Value::String(s)) => parse_datetime(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        _ => None,
    };
    map_datetime(parsed)
}

/// Parses an RFC 3339 timestamp into UTC.
#[must_use]
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Renders a timestamp as a full-precision RFC 3339 string.
#[must_use]
pub fn datetime_to_value(value: DateTime<Utc>) -> Value {
    Value::String(value.to_rfc3339())
}

/// Returns the value of the first key in `keys` present in `data`.
///
/// Precedence is the order of `keys`. JSON `null` counts as absent.
///
/// # Examples
///
/// ```
/// use mg_mapping::convert::{AdditionalData, first_present};
/// use serde_json::json;
///
/// let mut data = AdditionalData::default();
/// data.insert("cost_code_id".into(), json!(9));
/// data.insert("id".into(), json!(4));
///
/// assert_eq!(first_present(&data, &["id", "cost_code_id"]), Some(&json!(4)));
/// ```
#[must_use]
pub fn first_present<'a>(data: &'a AdditionalData, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|value| !value.is_null())
}

/// Returns the first candidate that is present and not blank.
#[must_use]
pub fn first_non_blank<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

/// Copies every entry of `data` whose key is not in `system_keys`.
#[must_use]
pub fn extract_custom_fields(data: &AdditionalData, system_keys: &[&str]) -> AdditionalData {
    data.iter()
        .filter(|(key, _)| !system_keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_map_id() {
        assert_eq!(map_id(Some(12)), 12);
        assert_eq!(map_id(Some(0)), 0);
        assert_eq!(map_id(Some(-4)), 0);
        assert_eq!(map_id(None), 0);
    }

    #[test]
    fn test_id_from_value() {
        assert_eq!(id_from_value(Some(&json!(17))), 17);
        assert_eq!(id_from_value(Some(&json!(" 23 "))), 23);
        assert_eq!(id_from_value(Some(&json!("abc"))), 0);
        assert_eq!(id_from_value(Some(&json!(1.5))), 0);
        assert_eq!(id_from_value(None), 0);
    }

    #[test]
    fn test_map_string() {
        assert_eq!(map_string(Some("  01.001 ")), "01.001");
        assert_eq!(map_string(Some("   ")), "");
        assert_eq!(map_string(None), "");
        assert_eq!(optional_string(Some(" ")), None);
        assert_eq!(optional_string(Some(" Site lead ")), Some("Site lead".to_owned()));
    }

    #[test]
    fn test_string_from_value() {
        assert_eq!(string_from_value(Some(&json!("Concrete"))), "Concrete");
        assert_eq!(string_from_value(Some(&json!(42))), "42");
        assert_eq!(string_from_value(Some(&json!(null))), "");
        assert_eq!(string_from_value(Some(&json!(["x"]))), "");
    }

    #[test]
    fn test_round_currency_midpoints() {
        assert_eq!(round_currency(Decimal::new(123_455, 3)), Decimal::new(12_346, 2));
        assert_eq!(round_currency(Decimal::new(-123_455, 3)), Decimal::new(-12_346, 2));
        assert_eq!(
            round_currency(Decimal::new(999_999_999, 3)),
            Decimal::new(100_000_000, 2)
        );
        assert_eq!(round_currency(Decimal::new(1_004, 3)), Decimal::new(100, 2));
    }

    #[test]
    fn test_decimal_from_value() {
        assert_eq!(decimal_from_value(Some(&json!(123.455))), Decimal::new(12_346, 2));
        assert_eq!(decimal_from_value(Some(&json!("999999.999"))), Decimal::new(100_000_000, 2));
        assert_eq!(decimal_from_value(Some(&json!(250))), Decimal::new(250, 0));
        assert_eq!(decimal_from_value(Some(&json!("1.5e3"))), Decimal::new(1500, 0));
        assert_eq!(decimal_from_value(Some(&json!("twelve"))), Decimal::ZERO);
        assert_eq!(decimal_from_value(Some(&json!(true))), Decimal::ZERO);
        assert_eq!(decimal_from_value(None), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_to_value() {
        assert_eq!(decimal_to_value(Decimal::new(12_346, 2)), json!(123.46));
        assert_eq!(decimal_from_value(Some(&decimal_to_value(Decimal::new(5, 2)))), Decimal::new(5, 2));
    }

    #[test]
    fn test_datetime_round_trip() {
        let ts = parse_datetime("2024-03-01T08:30:15.123456789Z").unwrap();
        assert_eq!(datetime_from_value(Some(&datetime_to_value(ts))), ts);

        let offset = parse_datetime("2024-03-01T10:30:15+02:00").unwrap();
        assert_eq!(offset, parse_datetime("2024-03-01T08:30:15Z").unwrap());
    }

    #[test]
    fn test_datetime_from_unix_seconds() {
        let ts = datetime_from_value(Some(&json!(86_400)));
        assert_eq!(ts, parse_datetime("1970-01-02T00:00:00Z").unwrap());
    }

    #[test]
    fn test_datetime_defaults_to_now() {
        let before = Utc::now();
        let ts = datetime_from_value(Some(&json!("yesterday-ish")));
        assert!(ts >= before);
        assert!(datetime_from_value(None) >= before);
    }

    #[test]
    fn test_first_present_precedence() {
        let mut data = AdditionalData::default();
        data.insert("cost_code_id".into(), json!(9));
        assert_eq!(first_present(&data, &["id", "cost_code_id"]), Some(&json!(9)));

        data.insert("id".into(), json!(null));
        assert_eq!(first_present(&data, &["id", "cost_code_id"]), Some(&json!(9)));

        data.insert("id".into(), json!(4));
        assert_eq!(first_present(&data, &["id", "cost_code_id"]), Some(&json!(4)));
        assert_eq!(first_present(&data, &["code"]), None);
    }

    #[test]
    fn test_first_non_blank() {
        assert_eq!(first_non_blank(&[Some("555-0100"), Some("555-0199")]), Some("555-0100"));
        assert_eq!(first_non_blank(&[Some(""), Some("555-0199")]), Some("555-0199"));
        assert_eq!(first_non_blank(&[None, Some("  ")]), None);
    }

    #[test]
    fn test_extract_custom_fields() {
        let mut data = AdditionalData::default();
        data.insert("name".into(), json!("Acme"));
        data.insert("tier".into(), json!("gold"));
        let custom = extract_custom_fields(&data, &["name"]);
        assert_eq!(custom.len(), 1);
        assert_eq!(custom.get("tier"), Some(&json!("gold")));
    }

    #[test]
    fn test_large_amount_keeps_cents() {
        let amount = Decimal::new(1_234_567_890_123_456_78, 2);
        let value = decimal_to_value(amount);
        assert!(value.is_string());
        assert_eq!(decimal_from_value(Some(&value)), amount);

        let small = Decimal::new(-12_345, 2);
        assert_eq!(decimal_to_value(small), json!(-123.45));
    }

    proptest! {
        #[test]
        fn prop_round_currency_is_idempotent_and_close(units in -10_000_000_000i64..10_000_000_000, scale in 0u32..6) {
            let amount = Decimal::new(units, scale);
            let rounded = round_currency(amount);
            prop_assert!(rounded.scale() <= CURRENCY_SCALE);
            prop_assert_eq!(round_currency(rounded), rounded);
            prop_assert!((rounded - amount).abs() <= Decimal::new(5, 3));
        }

        #[test]
        fn prop_cents_survive_json(cents in any::<i64>()) {
            let amount = Decimal::new(cents, 2);
            prop_assert_eq!(decimal_from_value(Some(&decimal_to_value(amount))), amount);
        }
    }
}
