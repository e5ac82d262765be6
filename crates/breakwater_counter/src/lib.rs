// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Counter store abstractions for the breakwater circuit breaker.
//!
//! This crate defines the [`CounterStore`] trait that every counter backend must satisfy,
//! along with [`CounterValue`] for values read back from a store and [`Error`] for
//! fallible operations.
//!
//! # Overview
//!
//! A circuit breaker only needs two things from its storage: an atomic
//! "initialize or add" on a named counter, and a batched read of several counters
//! at once. Keeping that contract small lets the same decision engine run against
//! an in-process store, a shared network cache, or a test double.
//!
//! # Implementing a Counter Store
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//!
//! use breakwater_counter::{CounterStore, CounterValue, Error, Result};
//!
//! #[derive(Debug, Default)]
//! struct SimpleStore(Mutex<HashMap<String, u64>>);
//!
//! impl CounterStore for SimpleStore {
//!     fn increment(&self, key: &str, amount: u64, initial_value: u64) -> Result<u64> {
//!         let mut data = self.0.lock().map_err(|e| Error::from_message(e.to_string()))?;
//!         let value = data
//!             .entry(key.to_owned())
//!             .and_modify(|v| *v += amount)
//!             .or_insert(initial_value);
//!         Ok(*value)
//!     }
//!
//!     fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, CounterValue>> {
//!         let data = self.0.lock().map_err(|e| Error::from_message(e.to_string()))?;
//!         Ok(keys
//!             .iter()
//!             .filter_map(|k| data.get(k).map(|v| (k.clone(), CounterValue::Integer(*v))))
//!             .collect())
//!     }
//! }
//! ```

pub mod error;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
mod value;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use store::CounterStore;
#[doc(inline)]
pub use value::CounterValue;
