// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory counter store implementation using moka.

use std::collections::HashMap;
use std::time::Duration;

use breakwater_counter::{CounterStore, CounterValue, Result};
use moka::sync::Cache;

use crate::builder::InMemoryCounterStoreBuilder;

/// Number of sample periods kept by [`InMemoryCounterStore::for_sample_period`].
const RETAINED_PERIODS: u64 = 100;

/// An in-memory counter store backed by moka.
///
/// Increments are atomic per key. Clones share the same underlying counters.
///
/// # Examples
///
/// ```
/// use breakwater_counter::CounterStore;
/// use breakwater_memory::InMemoryCounterStore;
///
/// let store = InMemoryCounterStore::new();
/// assert_eq!(store.increment("svc.1.successes", 1, 1)?, 1);
///
/// let values = store.multi_get(&["svc.1.successes".to_string(), "svc.1.failures".to_string()])?;
/// assert_eq!(values.len(), 1);
/// # Ok::<(), breakwater_counter::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryCounterStore {
    inner: Cache<String, u64>,
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCounterStore {
    /// Creates a new unbounded store whose counters never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a store that retains a hundred sample periods of history.
    ///
    /// A `sample_period_secs` of zero is treated as one second.
    #[must_use]
    pub fn for_sample_period(sample_period_secs: u32) -> Self {
        let period = u64::from(sample_period_secs.max(1));
        Self::builder()
            .time_to_live(Duration::from_secs(period * RETAINED_PERIODS))
            .build()
    }

    /// Creates a new builder for configuring an in-memory store.
    #[must_use]
    pub fn builder() -> InMemoryCounterStoreBuilder {
        InMemoryCounterStoreBuilder::new()
    }

    /// Returns the approximate number of counters held by the store.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub(crate) fn from_builder(builder: &InMemoryCounterStoreBuilder) -> Self {
        let mut moka_builder = Cache::builder();

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(ttl) = builder.time_to_live {
            moka_builder = moka_builder.time_to_live(ttl);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }
}

impl CounterStore for InMemoryCounterStore {
    fn increment(&self, key: &str, amount: u64, initial_value: u64) -> Result<u64> {
        let entry = self
            .inner
            .entry(key.to_owned())
            .and_upsert_with(|existing| existing.map_or(initial_value, |e| e.into_value().saturating_add(amount)));

        Ok(entry.into_value())
    }

    fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, CounterValue>> {
        Ok(keys
            .iter()
            .filter_map(|key| self.inner.get(key).map(|value| (key.clone(), CounterValue::Integer(value))))
            .collect())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_increment_stores_initial_value() {
        let store = InMemoryCounterStore::new();

        assert_eq!(store.increment("k", 10, 3).unwrap(), 3);
        assert_eq!(store.increment("k", 10, 3).unwrap(), 13);
    }

    #[test]
    fn increment_saturates() {
        let store = InMemoryCounterStore::new();
        store.increment("k", 1, u64::MAX).unwrap();

        assert_eq!(store.increment("k", 1, 1).unwrap(), u64::MAX);
    }

    #[test]
    fn zero_sample_period_still_builds() {
        let store = InMemoryCounterStore::for_sample_period(0);
        store.increment("k", 1, 1).unwrap();

        assert_eq!(store.entry_count(), 1);
    }

    static_assertions::assert_impl_all!(InMemoryCounterStore: Send, Sync, CounterStore);
}
