//! Mapping overhead benchmarks: instrumented conversions, registry lookups,
//! and the field helpers.
#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use mg_mapping::convert::{self, AdditionalData};
use mg_mapping::{BidirectionalMapper, BoxError, MapperRegistry, ModelType, TypeMapper};
use rust_decimal::Decimal;
use serde_json::{Value, json};

struct Budget {
    id: i64,
    amount: Decimal,
}

impl ModelType for Budget {
    const TYPE_NAME: &'static str = "Budget";
}

struct BudgetDto {
    additional_data: AdditionalData,
}

impl ModelType for BudgetDto {
    const TYPE_NAME: &'static str = "BudgetDto";
}

struct BudgetMapper;

impl TypeMapper for BudgetMapper {
    type Wrapper = Budget;
    type Generated = BudgetDto;

    fn to_wrapper(&self, source: &BudgetDto) -> Result<Budget, BoxError> {
        let data = &source.additional_data;
        Ok(Budget {
            id: convert::id_from_value(data.get("id")),
            amount: convert::decimal_from_value(data.get("amount")),
        })
    }

    fn to_generated(&self, source: &Budget) -> Result<BudgetDto, BoxError> {
        let mut additional_data = AdditionalData::default();
        additional_data.insert("id".to_owned(), Value::from(source.id));
        additional_data.insert("amount".to_owned(), convert::decimal_to_value(source.amount));
        Ok(BudgetDto { additional_data })
    }
}

fn sample_dto() -> BudgetDto {
    let mut additional_data = AdditionalData::default();
    additional_data.insert("id".to_owned(), json!(42));
    additional_data.insert("amount".to_owned(), json!(123.455));
    BudgetDto { additional_data }
}

fn bench_conversions(c: &mut Criterion) {
    let registry = MapperRegistry::new();
    let mapper = registry.register_mapper(BudgetMapper);
    let dto = sample_dto();
    let budget = Budget {
        id: 42,
        amount: Decimal::new(12_346, 2),
    };

    let mut group = c.benchmark_group("conversion");
    group.bench_function("to_wrapper", |b| {
        b.iter(|| mapper.map_to_wrapper(black_box(Some(&dto))));
    });
    group.bench_function("to_generated", |b| {
        b.iter(|| mapper.map_to_generated(black_box(Some(&budget))));
    });
    group.bench_function("absent_input", |b| {
        b.iter(|| mapper.try_map_to_wrapper(black_box(None)));
    });
    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let registry = MapperRegistry::new();
    registry.register_mapper(BudgetMapper);

    c.bench_function("registry_get_mapper", |b| {
        b.iter(|| black_box(registry.try_get_mapper::<Budget, BudgetDto>()));
    });
    c.bench_function("registry_validate_performance", |b| {
        b.iter(|| black_box(registry.validate_performance(1.0, 0.01)));
    });
}

fn bench_field_helpers(c: &mut Criterion) {
    let amount = json!(999_999.999);
    let stamp = json!("2024-03-01T12:30:00Z");

    c.bench_function("decimal_from_value", |b| {
        b.iter(|| convert::decimal_from_value(black_box(Some(&amount))));
    });
    c.bench_function("datetime_from_value", |b| {
        b.iter(|| convert::datetime_from_value(black_box(Some(&stamp))));
    });
}

criterion_group!(benches, bench_conversions, bench_registry, bench_field_helpers);
criterion_main!(benches);
