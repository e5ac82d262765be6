// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory counter stores.

use std::time::Duration;

use crate::store::InMemoryCounterStore;

/// Builder for configuring an [`InMemoryCounterStore`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use breakwater_memory::InMemoryCounterStore;
///
/// let store = InMemoryCounterStore::builder()
///     .max_capacity(10_000)
///     .time_to_live(Duration::from_secs(6_000))
///     .name("breaker-counters")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCounterStoreBuilder {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) time_to_live: Option<Duration>,
    pub(crate) name: Option<String>,
}

impl InMemoryCounterStoreBuilder {
    /// Creates a new builder with default settings.
    ///
    /// The default configuration creates an unbounded store whose counters never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of counters kept by the store.
    ///
    /// Once the capacity is reached, the least valuable counters are evicted. Evicting
    /// a counter of the period being evaluated resets it, so keep this comfortably above
    /// three counters per circuit per retained period.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets how long a counter lives after it was created.
    ///
    /// Should be at least a hundred times the sample period of the circuits using the store.
    #[must_use]
    pub fn time_to_live(mut self, duration: Duration) -> Self {
        self.time_to_live = Some(duration);
        self
    }

    /// Sets a name for the store, visible in debugging output of the underlying cache.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured store.
    #[must_use]
    pub fn build(self) -> InMemoryCounterStore {
        InMemoryCounterStore::from_builder(&self)
    }
}
