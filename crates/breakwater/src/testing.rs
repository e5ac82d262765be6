// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock monitor for testing code that drives a circuit breaker.
//!
//! This module provides `MockCircuitMonitor`, a [`Monitor`] returning preset
//! statistics. It records every operation and supports failure injection for
//! testing error paths.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::DEFAULT_SAMPLE_PERIOD;
use crate::{EventKind, Monitor, PeriodStats, Result};

/// Recorded monitor operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOp {
    /// An event was registered.
    RegisterEvent(EventKind),
    /// The statistics of the previous period were read.
    ReadPreviousPeriod,
}

type FailPredicate = Box<dyn Fn(&MonitorOp) -> bool + Send + Sync>;

/// A monitor with preset statistics for testing.
///
/// The statistics returned as the previous period stay the same until replaced with
/// [`set_stats`](Self::set_stats); registered events are recorded but never change
/// them. Clones share their state.
///
/// # Examples
///
/// ```
/// use breakwater::testing::MockCircuitMonitor;
/// use breakwater::{CircuitBreaker, EventKind, FixedRandom};
///
/// // 3 failures out of 4 requests in the previous period
/// let monitor = MockCircuitMonitor::with_counts(1, 3, 0);
/// let breaker = CircuitBreaker::new(monitor.clone(), FixedRandom::new(50));
///
/// // 25% success rate caps admission, and 50 is not below it
/// assert!(!breaker.is_closed()?);
/// breaker.register_rejection()?;
///
/// assert_eq!(monitor.events(), vec![EventKind::Rejection]);
/// # Ok::<(), breakwater::Error>(())
/// ```
///
/// # Failure Injection
///
/// ```
/// use breakwater::testing::{MockCircuitMonitor, MonitorOp};
/// use breakwater::{CircuitBreaker, ErrorKind, FastRandom};
///
/// let monitor = MockCircuitMonitor::with_counts(10, 0, 0);
/// monitor.fail_when(|op| matches!(op, MonitorOp::ReadPreviousPeriod));
///
/// let breaker = CircuitBreaker::new(monitor, FastRandom);
/// assert_eq!(breaker.is_closed().unwrap_err().kind(), ErrorKind::CounterStore);
/// assert!(breaker.register_success().is_ok());
/// ```
#[derive(Clone)]
pub struct MockCircuitMonitor {
    service_name: Arc<str>,
    sample_period: u32,
    stats: Arc<Mutex<PeriodStats>>,
    operations: Arc<Mutex<Vec<MonitorOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockCircuitMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCircuitMonitor")
            .field("service_name", &self.service_name)
            .field("sample_period", &self.sample_period)
            .field("stats", &self.stats)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl MockCircuitMonitor {
    /// Creates a monitor named `mock` reporting `stats` as the previous period.
    #[must_use]
    pub fn new(stats: PeriodStats) -> Self {
        Self {
            service_name: Arc::from("mock"),
            sample_period: DEFAULT_SAMPLE_PERIOD,
            stats: Arc::new(Mutex::new(stats)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a monitor whose previous period, `0..=59`, holds the given counts.
    #[must_use]
    pub fn with_counts(successes: u64, failures: u64, rejections: u64) -> Self {
        let end = i64::from(DEFAULT_SAMPLE_PERIOD) - 1;
        Self::new(PeriodStats::from_counts(0, end, successes, failures, rejections))
    }

    /// Renames the monitored service.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl AsRef<str>) -> Self {
        self.service_name = Arc::from(service_name.as_ref());
        self
    }

    /// Replaces the statistics reported as the previous period.
    pub fn set_stats(&self, stats: PeriodStats) {
        *self.stats.lock() = stats;
    }

    /// Returns the events registered successfully, in order.
    #[must_use]
    pub fn events(&self) -> Vec<EventKind> {
        self.operations
            .lock()
            .iter()
            .filter_map(|op| match op {
                MonitorOp::RegisterEvent(kind) => Some(*kind),
                MonitorOp::ReadPreviousPeriod => None,
            })
            .collect()
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// Failed operations are not recorded.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&MonitorOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<MonitorOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: MonitorOp) -> Result<()> {
        if self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op)) {
            return Err(breakwater_counter::Error::from_message("mock: operation failed").into());
        }
        self.operations.lock().push(op);
        Ok(())
    }
}

impl Monitor for MockCircuitMonitor {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn sample_period(&self) -> u32 {
        self.sample_period
    }

    fn register_event(&self, kind: EventKind) -> Result<()> {
        self.record(MonitorOp::RegisterEvent(kind))
    }

    fn results_for_previous_period(&self) -> Result<PeriodStats> {
        self.record(MonitorOp::ReadPreviousPeriod)?;
        Ok(*self.stats.lock())
    }
}
