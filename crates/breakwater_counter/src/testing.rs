// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock counter store implementation for testing.
//!
//! This module provides `MockCounterStore`, a configurable in-memory store that
//! records all operations and supports failure injection for testing error paths.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{CounterStore, CounterValue, Error, Result};

/// Recorded counter store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterOp {
    /// An increment was performed on the given key.
    Increment {
        /// The key that was incremented.
        key: String,
        /// The amount added to an existing counter.
        amount: u64,
        /// The value stored when the counter did not exist.
        initial_value: u64,
    },
    /// A batched read of the given keys was performed.
    MultiGet(Vec<String>),
}

type FailPredicate = Box<dyn Fn(&CounterOp) -> bool + Send + Sync>;

/// A configurable mock counter store for testing.
///
/// Clones share the same data, so a test can keep a handle while the store itself is
/// moved into a circuit breaker.
///
/// # Examples
///
/// ```
/// use breakwater_counter::CounterStore;
/// use breakwater_counter::testing::{CounterOp, MockCounterStore};
///
/// let store = MockCounterStore::new();
/// assert_eq!(store.increment("svc.1.failures", 1, 1).unwrap(), 1);
/// assert_eq!(store.increment("svc.1.failures", 1, 1).unwrap(), 2);
///
/// store.fail_when(|op| matches!(op, CounterOp::MultiGet(_)));
/// assert!(store.multi_get(&["svc.1.failures".to_string()]).is_err());
/// ```
#[derive(Clone, Default)]
pub struct MockCounterStore {
    data: Arc<Mutex<HashMap<String, CounterValue>>>,
    operations: Arc<Mutex<Vec<CounterOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockCounterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCounterStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl MockCounterStore {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value under `key`, replacing whatever was there.
    ///
    /// Use this to simulate backends that return counters as text.
    pub fn set_raw(&self, key: impl Into<String>, value: impl Into<CounterValue>) {
        self.data.lock().insert(key.into(), value.into());
    }

    /// Returns the current numeric value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u64> {
        self.data.lock().get(key).map(CounterValue::as_count)
    }

    /// Returns a snapshot of all stored values.
    #[must_use]
    pub fn contents(&self) -> HashMap<String, CounterValue> {
        self.data.lock().clone()
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// Failed operations are still recorded but do not touch the stored data.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&CounterOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<CounterOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: CounterOp) -> Result<()> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        if fail { Err(Error::caused_by("mock: operation failed")) } else { Ok(()) }
    }
}

impl CounterStore for MockCounterStore {
    fn increment(&self, key: &str, amount: u64, initial_value: u64) -> Result<u64> {
        self.record(CounterOp::Increment {
            key: key.to_owned(),
            amount,
            initial_value,
        })?;

        let mut data = self.data.lock();
        let value = match data.get(key) {
            Some(existing) => existing.as_count().saturating_add(amount),
            None => initial_value,
        };
        data.insert(key.to_owned(), CounterValue::Integer(value));
        Ok(value)
    }

    fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, CounterValue>> {
        self.record(CounterOp::MultiGet(keys.to_vec()))?;

        let data = self.data.lock();
        Ok(keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_initializes_then_adds() {
        let store = MockCounterStore::new();

        assert_eq!(store.increment("k", 5, 1).unwrap(), 1);
        assert_eq!(store.increment("k", 5, 1).unwrap(), 6);
        assert_eq!(store.get("k"), Some(6));
    }

    #[test]
    fn increment_continues_from_text_value() {
        let store = MockCounterStore::new();
        store.set_raw("k", "4");

        assert_eq!(store.increment("k", 1, 1).unwrap(), 5);
        assert_eq!(store.contents().get("k"), Some(&CounterValue::Integer(5)));
    }

    #[test]
    fn multi_get_omits_missing_keys() {
        let store = MockCounterStore::new();
        store.set_raw("a", 1_u64);
        store.set_raw("b", "2");

        let values = store.multi_get(&["a".to_string(), "b".to_string(), "c".to_string()]).unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values["a"], CounterValue::Integer(1));
        assert_eq!(values["b"], CounterValue::Text("2".to_string()));
        assert!(!values.contains_key("c"));
    }

    #[test]
    fn operations_are_recorded_in_order() {
        let store = MockCounterStore::new();
        store.increment("a", 1, 1).unwrap();
        store.multi_get(&["a".to_string()]).unwrap();

        assert_eq!(
            store.operations(),
            vec![
                CounterOp::Increment {
                    key: "a".to_string(),
                    amount: 1,
                    initial_value: 1,
                },
                CounterOp::MultiGet(vec!["a".to_string()]),
            ]
        );

        store.clear_operations();
        assert!(store.operations().is_empty());
    }

    #[test]
    fn failing_increment_leaves_data_untouched() {
        let store = MockCounterStore::new();
        store.fail_when(|op| matches!(op, CounterOp::Increment { key, .. } if key == "bad"));

        store.increment("bad", 1, 1).unwrap_err();
        store.increment("good", 1, 1).unwrap();

        assert_eq!(store.get("bad"), None);
        assert_eq!(store.get("good"), Some(1));
        assert_eq!(store.operations().len(), 2);

        store.clear_failures();
        assert_eq!(store.increment("bad", 1, 1).unwrap(), 1);
    }

    #[test]
    fn clones_share_state() {
        let store = MockCounterStore::new();
        let clone = store.clone();
        clone.increment("k", 1, 1).unwrap();

        assert_eq!(store.get("k"), Some(1));
        assert!(format!("{store:?}").contains("MockCounterStore"));
    }
}
