// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for counter storage backends.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::{CounterValue, Result};

/// Trait for counter store implementations.
///
/// A counter store holds named unsigned counters. It is shared by every process that
/// participates in the same circuit, so `increment` must be atomic with respect to
/// concurrent callers.
pub trait CounterStore: Send + Sync + Debug {
    /// Atomically increments a counter and returns its new value.
    ///
    /// When `key` does not exist yet, the counter is created holding `initial_value`
    /// and `amount` is not added on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot complete the operation.
    fn increment(&self, key: &str, amount: u64, initial_value: u64) -> Result<u64>;

    /// Reads several counters in one round trip.
    ///
    /// Keys that do not exist are absent from the returned map; absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot complete the operation.
    fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, CounterValue>>;
}

impl<T: CounterStore + ?Sized> CounterStore for Arc<T> {
    fn increment(&self, key: &str, amount: u64, initial_value: u64) -> Result<u64> {
        (**self).increment(key, amount, initial_value)
    }

    fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, CounterValue>> {
        (**self).multi_get(keys)
    }
}

impl<T: CounterStore + ?Sized> CounterStore for Box<T> {
    fn increment(&self, key: &str, amount: u64, initial_value: u64) -> Result<u64> {
        (**self).increment(key, amount, initial_value)
    }

    fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, CounterValue>> {
        (**self).multi_get(keys)
    }
}
