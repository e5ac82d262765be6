// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use breakwater::{CircuitBreaker, FixedRandom};
use breakwater_counter::testing::MockCounterStore;
use breakwater_memory::InMemoryCounterStore;
use criterion::{Criterion, criterion_group, criterion_main};

fn entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("decision");

    // Healthy previous period, circuit closed
    let store = InMemoryCounterStore::new();
    let breaker = CircuitBreaker::builder("bench")
        .counter_store(store.clone())
        .fixed_time(60)
        .build()
        .unwrap();
    group.bench_function("closed", |b| b.iter(|| breaker.is_closed().unwrap()));

    // Tripped previous period, probabilistic admission
    let tripped = MockCounterStore::new();
    tripped.set_raw("bench.0.successes", 2_u64);
    tripped.set_raw("bench.0.failures", 8_u64);
    let breaker = CircuitBreaker::builder("bench")
        .counter_store(tripped)
        .fixed_time(60)
        .random_source(FixedRandom::new(10))
        .build()
        .unwrap();
    group.bench_function("throttled", |b| b.iter(|| breaker.is_closed().unwrap()));

    // Disabled breaker skips the store entirely
    let breaker = CircuitBreaker::builder("bench")
        .counter_store(store.clone())
        .fixed_time(60)
        .disabled()
        .build()
        .unwrap();
    group.bench_function("disabled", |b| b.iter(|| breaker.is_closed().unwrap()));

    let breaker = CircuitBreaker::builder("bench")
        .counter_store(store)
        .fixed_time(60)
        .build()
        .unwrap();
    group.bench_function("register_success", |b| b.iter(|| breaker.register_success().unwrap()));

    group.finish();
}

criterion_group!(benches, entry);
criterion_main!(benches);
