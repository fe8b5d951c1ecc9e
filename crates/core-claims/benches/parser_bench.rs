use core_claims::{Assertion, Authorization, MAX_CLAIMS_PER_STRING};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Generate an authorization string with `count` scoped composite claims
fn generate_claims(count: usize) -> String {
    (0..count)
        .map(|i| format!("role:r{i}@doc:d{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn benchmark_parse_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_authorization");

    for count in [1, 16, 64, MAX_CLAIMS_PER_STRING].iter() {
        let input = generate_claims(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| Authorization::parse(black_box(input)));
        });
    }

    group.finish();
}

fn benchmark_serialize(c: &mut Criterion) {
    let auth = Authorization::parse(&generate_claims(MAX_CLAIMS_PER_STRING)).unwrap();

    c.bench_function("serialize_authorization", |b| {
        b.iter(|| black_box(&auth).to_string());
    });
}

fn benchmark_reject_malformed(c: &mut Criterion) {
    // Malformed claim at the end forces a full scan before failing
    let mut input = generate_claims(MAX_CLAIMS_PER_STRING - 1);
    input.push_str(" a:b:c");

    c.bench_function("reject_malformed_tail", |b| {
        b.iter(|| Assertion::parse(black_box(&input)));
    });
}

criterion_group!(
    benches,
    benchmark_parse_by_size,
    benchmark_serialize,
    benchmark_reject_malformed
);
criterion_main!(benches);
