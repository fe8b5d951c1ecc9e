use core_claims::{
    Assertion, Authorization, MemoryCache, ModelBuilder, PermissionsChecker, PermissionsModel,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

/// Build a model whose atoms form one include chain: `t0 -> t1 -> ... -> tN`
fn chain_model(depth: usize) -> PermissionsModel {
    (0..=depth)
        .fold(ModelBuilder::new(), |builder, i| {
            if i < depth {
                builder.token_with(format!("t{i}"), |t| t.includes(format!("t{}", i + 1)))
            } else {
                builder.token(format!("t{i}"))
            }
        })
        .build()
        .unwrap()
}

fn benchmark_include_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("include_chain_depth");

    for depth in [1, 16, 128, 1023].iter() {
        let checker = PermissionsChecker::new(chain_model(*depth));
        let authorization = Authorization::parse("t0").unwrap();
        let assertion = Assertion::parse(&format!("t{depth}")).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
            b.iter(|| checker.can(black_box(&authorization), black_box(&assertion)));
        });
    }

    group.finish();
}

fn benchmark_wildcard_scan(c: &mut Criterion) {
    let model = ModelBuilder::new()
        .composite("role", |role| {
            (0..100).fold(role, |role, i| role.token(format!("r{i}")))
        })
        .build()
        .unwrap();
    let checker = PermissionsChecker::new(model);
    let authorization: String = (0..100)
        .map(|i| format!("role:r{i}"))
        .collect::<Vec<_>>()
        .join(" ");

    c.bench_function("wildcard_last_match", |b| {
        b.iter(|| checker.can(black_box(authorization.as_str()), "role:r99"));
    });
}

fn benchmark_cache(c: &mut Criterion) {
    let model = chain_model(16);
    let uncached = PermissionsChecker::new(model.clone());
    let cached = PermissionsChecker::new(model).with_cache(Arc::new(MemoryCache::new()));
    let authorization = "t0 t3 t7";
    let assertion = "t16 !t15@t1";

    c.bench_function("raw_strings_uncached", |b| {
        b.iter(|| uncached.test(black_box(authorization), black_box(assertion)));
    });
    c.bench_function("raw_strings_cached", |b| {
        b.iter(|| cached.test(black_box(authorization), black_box(assertion)));
    });
}

criterion_group!(
    benches,
    benchmark_include_depth,
    benchmark_wildcard_scan,
    benchmark_cache
);
criterion_main!(benches);
