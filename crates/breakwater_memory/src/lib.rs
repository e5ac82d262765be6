// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process counter store backed by moka.
//!
//! This crate provides [`InMemoryCounterStore`], a concurrent implementation of
//! [`CounterStore`](breakwater_counter::CounterStore) for single-process deployments
//! and for tests. Use [`InMemoryCounterStoreBuilder`] to configure capacity and expiry
//! without exposing moka types directly.
//!
//! # Quick Start
//!
//! ```
//! use breakwater_counter::CounterStore;
//! use breakwater_memory::InMemoryCounterStore;
//!
//! let store = InMemoryCounterStore::for_sample_period(60);
//!
//! store.increment("checkout.100.failures", 1, 1)?;
//! let count = store.increment("checkout.100.failures", 1, 1)?;
//! assert_eq!(count, 2);
//! # Ok::<(), breakwater_counter::Error>(())
//! ```
//!
//! # Expiry
//!
//! Counters are written once per sample period and never deleted explicitly, so the
//! store should be given a time-to-live. [`InMemoryCounterStore::for_sample_period`]
//! keeps one hundred periods worth of history, which is enough for short-term
//! inspection of past periods.

pub mod builder;
pub mod store;

#[doc(inline)]
pub use builder::InMemoryCounterStoreBuilder;
#[doc(inline)]
pub use store::InMemoryCounterStore;
