// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `InMemoryCounterStore`.

use std::sync::Arc;
use std::thread;

use breakwater_counter::{CounterStore, CounterValue};
use breakwater_memory::{InMemoryCounterStore, InMemoryCounterStoreBuilder};

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn new_store_is_empty() {
    let store = InMemoryCounterStore::new();
    assert_eq!(store.entry_count(), 0);
    assert!(store.multi_get(&keys(&["a", "b"])).unwrap().is_empty());
}

#[test]
fn default_matches_new() {
    let store = InMemoryCounterStore::default();
    assert_eq!(store.entry_count(), 0);
}

#[test]
fn multi_get_returns_only_present_counters() {
    let store = InMemoryCounterStore::new();
    store.increment("svc.7.successes", 1, 1).unwrap();
    store.increment("svc.7.successes", 1, 1).unwrap();
    store.increment("svc.7.failures", 1, 1).unwrap();

    let values = store
        .multi_get(&keys(&["svc.7.successes", "svc.7.failures", "svc.7.rejections"]))
        .unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values["svc.7.successes"], CounterValue::Integer(2));
    assert_eq!(values["svc.7.failures"], CounterValue::Integer(1));
}

#[test]
fn clones_share_counters() {
    let store = InMemoryCounterStore::new();
    let clone = store.clone();

    clone.increment("k", 1, 1).unwrap();
    assert_eq!(store.increment("k", 1, 1).unwrap(), 2);
}

#[test]
fn builder_produces_working_store() {
    let store = InMemoryCounterStoreBuilder::new()
        .max_capacity(1_000)
        .time_to_live(std::time::Duration::from_secs(3_600))
        .name("test-counters")
        .build();

    assert_eq!(store.increment("k", 1, 1).unwrap(), 1);
    assert_eq!(store.entry_count(), 1);
}

#[test]
fn concurrent_increments_are_atomic() {
    let store = Arc::new(InMemoryCounterStore::for_sample_period(60));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..500 {
                    store.increment("svc.1.failures", 1, 1).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let values = store.multi_get(&keys(&["svc.1.failures"])).unwrap();
    assert_eq!(values["svc.1.failures"].as_count(), 4_000);
}
