//! Benchmarks the Fitness Evaluator's scoring function (spec §4.5), a hot,
//! pure component invoked twice per generation. Grounded on the teacher's
//! `benches/*.rs` + `benches/helpers` criterion harness shape.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evo_core::fitness;
use evo_shared::{BenchmarkSnapshot, METRIC_CODE_SIZE_LINES, METRIC_EXECUTION_TIME_US, METRIC_MEMORY_BYTES};

fn snapshot(time: f64, memory: f64, lines: f64) -> BenchmarkSnapshot {
    let mut m = HashMap::new();
    m.insert(METRIC_EXECUTION_TIME_US.to_string(), time);
    m.insert(METRIC_MEMORY_BYTES.to_string(), memory);
    m.insert(METRIC_CODE_SIZE_LINES.to_string(), lines);
    BenchmarkSnapshot::new(m)
}

fn bench_score(c: &mut Criterion) {
    let before = snapshot(100.0, 1_000.0, 50.0);
    let after = snapshot(80.0, 900.0, 48.0);

    c.bench_function("fitness::score", |b| {
        b.iter(|| fitness::score(black_box(&before), black_box(&after)))
    });

    c.bench_function("fitness::evaluate", |b| {
        b.iter(|| fitness::evaluate(black_box(&before), black_box(&after)))
    });
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
