use criterion::{black_box, criterion_group, criterion_main, Criterion};

use yanzi_core::{canonicalize_meta, hash_intent};
use yanzi_testkit::fixtures::sample_record;

const META: &str = r#"{ "team": "infra", "env": "prod", "attempt": 1.50e1, "tags": ["a", "b"], "nested": { "z": null, "a": true } }"#;

fn bench_canonicalize(c: &mut Criterion) {
    c.bench_function("canonicalize_meta", |b| {
        b.iter(|| canonicalize_meta(black_box(META)))
    });
}

fn bench_hash(c: &mut Criterion) {
    let record = sample_record(7);
    c.bench_function("hash_intent", |b| b.iter(|| hash_intent(black_box(&record))));

    let mut long = sample_record(8);
    long.prompt = "line\r\n".repeat(4096);
    c.bench_function("hash_intent_long_prompt", |b| {
        b.iter(|| hash_intent(black_box(&long)))
    });
}

criterion_group!(benches, bench_canonicalize, bench_hash);
criterion_main!(benches);
