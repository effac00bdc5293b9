//! [`CostCode`] ↔ [`GeneratedCostCode`].
//!
//! The generated payload is an open map, so every field is read by key.
//! Amounts are rounded to cents in both directions.

use mg_mapping::convert::{self, AdditionalData};
use mg_mapping::{BoxError, TypeMapper};
use serde_json::Value;

use crate::domain::CostCode;
use crate::generated::GeneratedCostCode;

/// Keys tried, in order, for the cost code identifier.
pub const ID_KEYS: &[&str] = &["id", "cost_code_id"];

/// Maps cost codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostCodeMapper;

impl TypeMapper for CostCodeMapper {
    type Wrapper = CostCode;
    type Generated = GeneratedCostCode;

    fn to_wrapper(&self, source: &GeneratedCostCode) -> Result<CostCode, BoxError> {
        let data = &source.additional_data;
        Ok(CostCode {
            id: convert::id_from_value(convert::first_present(data, ID_KEYS)),
            code: convert::string_from_value(data.get("code")),
            description: convert::string_from_value(data.get("description")),
            budget_amount: convert::decimal_from_value(data.get("budget_amount")),
            actual_amount: convert::decimal_from_value(data.get("actual_amount")),
            committed_amount: convert::decimal_from_value(data.get("committed_amount")),
            created_at: convert::datetime_from_value(data.get("created_at")),
            updated_at: convert::datetime_from_value(data.get("updated_at")),
        })
    }

    fn to_generated(&self, source: &CostCode) -> Result<GeneratedCostCode, BoxError> {
        let mut data = AdditionalData::default();
        data.insert("id".to_owned(), Value::from(source.id));
        data.insert("code".to_owned(), Value::from(source.code.as_str()));
        data.insert(
            "description".to_owned(),
            Value::from(source.description.as_str()),
        );
        data.insert(
            "budget_amount".to_owned(),
            convert::decimal_to_value(source.budget_amount),
        );
        data.insert(
            "actual_amount".to_owned(),
            convert::decimal_to_value(source.actual_amount),
        );
        data.insert(
            "committed_amount".to_owned(),
            convert::decimal_to_value(source.committed_amount),
        );
        data.insert(
            "created_at".to_owned(),
            convert::datetime_to_value(source.created_at),
        );
        data.insert(
            "updated_at".to_owned(),
            convert::datetime_to_value(source.updated_at),
        );
        Ok(GeneratedCostCode {
            additional_data: data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mg_mapping::{BidirectionalMapper, Mapper, MapperInfo};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn generated(pairs: &[(&str, Value)]) -> GeneratedCostCode {
        GeneratedCostCode {
            additional_data: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
        }
    }

    fn sample() -> CostCode {
        let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        CostCode {
            id: 1,
            code: "01.001".to_owned(),
            description: "Site preparation".to_owned(),
            budget_amount: Decimal::new(123_455, 3),
            actual_amount: Decimal::new(999_999_999, 3),
            committed_amount: Decimal::ZERO,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn test_budget_rounds_half_away_from_zero_across_round_trip() {
        let mapper = Mapper::new(CostCodeMapper);
        let generated = mapper.map_to_generated(Some(&sample())).unwrap();
        let back = mapper.map_to_wrapper(Some(&generated)).unwrap();

        assert_eq!(back.budget_amount, Decimal::new(12_346, 2));
        assert_eq!(back.actual_amount, Decimal::new(100_000_000, 2));
        assert_eq!(back.id, 1);
        assert_eq!(back.code, "01.001");
        assert_eq!(back.created_at, sample().created_at);
    }

    #[test]
    fn test_round_trip_of_cent_precise_values() {
        let mapper = Mapper::new(CostCodeMapper);
        let mut code = sample();
        code.budget_amount = Decimal::new(12_346, 2);
        code.actual_amount = Decimal::new(-4_050, 2);

        let generated = mapper.map_to_generated(Some(&code)).unwrap();
        assert_eq!(mapper.map_to_wrapper(Some(&generated)).unwrap(), code);
    }

    #[test]
    fn test_missing_fields_default() {
        let mapper = Mapper::new(CostCodeMapper);
        let before = Utc::now();
        let code = mapper
            .map_to_wrapper(Some(&GeneratedCostCode::default()))
            .unwrap();

        assert_eq!(code.id, 0);
        assert_eq!(code.code, "");
        assert_eq!(code.budget_amount, Decimal::ZERO);
        assert!(code.created_at >= before);
        assert_eq!(mapper.metrics().to_wrapper_errors(), 0);
    }

    #[test]
    fn test_string_amounts_parse_or_fall_back_to_zero() {
        let mapper = Mapper::new(CostCodeMapper);
        let code = mapper
            .map_to_wrapper(Some(&generated(&[
                ("budget_amount", json!("2500.005")),
                ("actual_amount", json!("n/a")),
            ])))
            .unwrap();
        assert_eq!(code.budget_amount, Decimal::new(250_001, 2));
        assert_eq!(code.actual_amount, Decimal::ZERO);
    }

    #[test]
    fn test_id_precedence() {
        let mapper = Mapper::new(CostCodeMapper);
        let both = generated(&[("cost_code_id", json!(9)), ("id", json!(4))]);
        assert_eq!(mapper.map_to_wrapper(Some(&both)).unwrap().id, 4);

        let fallback = generated(&[("cost_code_id", json!(9)), ("id", Value::Null)]);
        assert_eq!(mapper.map_to_wrapper(Some(&fallback)).unwrap().id, 9);
    }

    proptest! {
        #[test]
        fn test_cent_amounts_survive_round_trip(cents in -1_000_000_000_i64..1_000_000_000) {
            let mapper = Mapper::new(CostCodeMapper);
            let mut code = sample();
            code.budget_amount = Decimal::new(cents, 2);
            let generated = mapper.map_to_generated(Some(&code)).unwrap();
            let back = mapper.map_to_wrapper(Some(&generated)).unwrap();
            prop_assert_eq!(back.budget_amount, code.budget_amount);
        }
    }
}
