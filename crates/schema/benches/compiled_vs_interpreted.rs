//! Benchmarks comparing compiled and interpreted validation.
//!
//! Each group validates the same input through the schema tree directly and
//! through the compiled validator built from it.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nebula_schema::prelude::*;
use serde_json::json;

// ============================================================================
// FIXTURES
// ============================================================================

fn user_schema() -> Schema {
    let role = enumeration(["admin", "editor", "viewer"]).expect("non-empty enum");
    object()
        .field("id", string().uuid())
        .field("name", string().trim().min(1).max(64))
        .field("email", string().email())
        .field("age", number().int().gte(0.0).lte(150.0).optional())
        .field("roles", array(role).unique())
        .field(
            "address",
            object()
                .field("city", string().min(1))
                .field("zip", string().length(5))
                .optional(),
        )
        .strict()
        .into()
}

fn valid_user() -> Value {
    json!({
        "id": "5f1d7a4e-3c2b-4a8e-9f10-2b3c4d5e6f70",
        "name": "  Ada Lovelace ",
        "email": "ada@example.org",
        "age": 36,
        "roles": ["admin", "editor"],
        "address": {"city": "London", "zip": "12345"}
    })
    .into()
}

fn invalid_user() -> Value {
    json!({
        "id": "not-a-uuid",
        "name": "",
        "email": "ada",
        "age": -1,
        "roles": ["admin", "admin", "root"],
        "address": {"city": "", "zip": "1"},
        "extra": true
    })
    .into()
}

fn numbers(len: usize) -> Value {
    Value::Array((0..len).map(|i| Value::from(i as f64)).collect())
}

// ============================================================================
// BENCHMARKS
// ============================================================================

fn bench_object(c: &mut Criterion) {
    let mut group = c.benchmark_group("object");
    let schema = user_schema();
    let compiled = schema.compile(ValidationOptions::new());

    for (label, input) in [("valid", valid_user()), ("invalid", invalid_user())] {
        group.bench_with_input(BenchmarkId::new("interpreted", label), &input, |b, input| {
            b.iter(|| schema.validate(black_box(input)));
        });
        group.bench_with_input(BenchmarkId::new("compiled", label), &input, |b, input| {
            b.iter(|| compiled.validate(black_box(input)));
        });
    }

    group.finish();
}

fn bench_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("number_array");
    let schema: Schema = array(number().int().nonnegative()).into();
    let compiled = schema.compile(ValidationOptions::new());

    for len in [10, 100, 1000] {
        let input = numbers(len);
        group.bench_with_input(BenchmarkId::new("interpreted", len), &input, |b, input| {
            b.iter(|| schema.validate(black_box(input)));
        });
        group.bench_with_input(BenchmarkId::new("compiled", len), &input, |b, input| {
            b.iter(|| compiled.validate(black_box(input)));
        });
    }

    group.finish();
}

fn bench_is(c: &mut Criterion) {
    let mut group = c.benchmark_group("is");
    let schema = user_schema();
    let compiled = schema.compile(ValidationOptions::new());
    let input = valid_user();

    group.bench_function("interpreted", |b| b.iter(|| schema.is(black_box(&input))));
    group.bench_function("compiled", |b| b.iter(|| compiled.is(black_box(&input))));

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let schema = user_schema();
    c.bench_function("compile_user_schema", |b| {
        b.iter(|| black_box(&schema).compile(ValidationOptions::new()));
    });
}

criterion_group!(benches, bench_object, bench_array, bench_is, bench_compile);
criterion_main!(benches);
