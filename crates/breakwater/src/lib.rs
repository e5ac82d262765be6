// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(feature = "memory"),
    expect(rustdoc::broken_intra_doc_links, reason = "the default counter store is only linkable with `memory`")
)]

//! Probabilistic circuit breaking driven by shared, time-bucketed counters.
//!
//! A [`CircuitBreaker`] decides whether calls to a dependency may proceed. Every process
//! guarding the same dependency records call outcomes into one counter store, so the
//! decision reflects the health of the dependency as a whole rather than the experience
//! of a single process.
//!
//! # How It Works
//!
//! Time is split into sample periods of fixed width. [`CircuitMonitor`] keeps three
//! counters per period (successes, failures and rejections) and turns them into
//! [`PeriodStats`]: a failure rate over the calls that reached the dependency and a
//! throttle, the share of all calls that were admitted.
//!
//! Decisions only look at the previous, complete period:
//!
//! - The circuit **trips** when that period saw enough requests and its failure rate
//!   reached the threshold, or when the breaker was still throttling heavily.
//! - A tripped breaker with **deterministic** dynamics rejects every call.
//! - A tripped breaker with **probabilistic** dynamics admits a share of calls that
//!   grows by the recovery factor each period, starting at 10 percent, and closes fully
//!   once the share passes 80 percent.
//!
//! # Quick Start
//!
//! ```
//! use breakwater::CircuitBreaker;
//!
//! # fn call_inventory() -> Result<u32, std::io::Error> { Ok(3) }
//! let breaker = CircuitBreaker::builder("inventory")
//!     .sample_period(30)
//!     .percentage_failure_threshold(40.0)
//!     .build()?;
//!
//! if breaker.is_closed()? {
//!     match call_inventory() {
//!         Ok(_) => breaker.register_success()?,
//!         Err(_) => breaker.register_failure()?,
//!     }
//! } else {
//!     breaker.register_rejection()?;
//! }
//! # Ok::<(), breakwater::Error>(())
//! ```
//!
//! # Counter Stores
//!
//! Counters live behind the [`CounterStore`] trait from `breakwater_counter`. The
//! `memory` feature, on by default, provides
//! [`InMemoryCounterStore`](breakwater_memory::InMemoryCounterStore) for single-process
//! use and tests. Distributed deployments plug in a store shared by all instances.
//!
//! # Features
//!
//! - `memory` *(default)*: in-memory counter store, used when no other store is configured.
//! - `metrics`: OpenTelemetry counter of registered events, see [`telemetry`].
//! - `logs`: `tracing` events for rejected and throttled calls.
//! - `serde`: serialization of [`BreakerConfig`], [`PeriodStats`] and [`EventKind`].
//! - `test-util`: a mock monitor in `testing`, test doubles from `breakwater_counter` and a
//!   controllable clock from `tick`.

mod breaker;
mod builder;
mod config;
mod error;
mod event;
mod monitor;
mod rnd;
mod stats;
pub mod telemetry;
mod time;

#[cfg(any(feature = "test-util", test))]
pub mod testing;

pub use breaker::{CircuitBreaker, FIRST_RECOVERY_STEP, THROTTLE_SNAPBACK};
pub use breakwater_counter::{CounterStore, CounterValue};
pub use builder::CircuitBreakerBuilder;
pub use config::BreakerConfig;
pub use error::{Error, ErrorKind, Result};
pub use event::EventKind;
pub use monitor::{CircuitMonitor, Monitor};
pub use rnd::{FastRandom, FixedRandom, RandomSource, SequentialRandom};
pub use stats::PeriodStats;
pub use time::{FixedTimeSource, SystemTimeSource, TimeSource};
