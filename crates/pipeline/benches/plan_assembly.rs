//! Benchmarks for validation and plan assembly
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses the largest batch the sequence endpoint accepts (200 items).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeline::{assemble_plan, fallback_order, fallback_plan, CandidatePlan, ValidationPipeline};
use serde_json::json;
use shot_types::normalize::items_from_values;
use shot_types::{ItemSet, PlannerKind};

fn build_items(n: usize) -> ItemSet {
    let entries: Vec<_> = (0..n)
        .map(|i| json!({"id": format!("img-{i}"), "subject": "street", "visual_energy": 6}))
        .collect();
    items_from_values(&entries)
}

fn bench_validate(c: &mut Criterion) {
    let items = build_items(200);
    let mut ordered = fallback_order(&items, items.len());
    ordered.reverse();
    let pipeline = ValidationPipeline::standard();

    c.bench_function("validate_200", |b| {
        b.iter(|| {
            let result = pipeline.validate(black_box(Some(ordered.as_slice())), &items, 200);
            black_box(result)
        })
    });
}

fn bench_assemble(c: &mut Criterion) {
    let items = build_items(200);
    let ordered = fallback_order(&items, items.len());
    let candidate = CandidatePlan::from_value(&json!({
        "orderedIds": ordered,
        "beats": ordered.iter().map(|id| json!({"id": id, "role": "build", "reason": "bench"})).collect::<Vec<_>>(),
    }));

    c.bench_function("assemble_plan_200", |b| {
        b.iter(|| {
            let plan = assemble_plan(&items, ordered.clone(), Some(&candidate), PlannerKind::Ai);
            black_box(plan)
        })
    });
}

fn bench_fallback_plan(c: &mut Criterion) {
    let items = build_items(200);

    c.bench_function("fallback_plan_200", |b| {
        b.iter(|| black_box(fallback_plan(black_box(&items), None)))
    });
}

criterion_group!(benches, bench_validate, bench_assemble, bench_fallback_plan);
criterion_main!(benches);
