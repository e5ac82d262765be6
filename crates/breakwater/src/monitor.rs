// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Time-bucketed event aggregation.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use breakwater_counter::{CounterStore, CounterValue};

use crate::{Error, EventKind, PeriodStats, Result, TimeSource};

/// Records call outcomes and reports statistics of past periods.
///
/// [`CircuitBreaker`](crate::CircuitBreaker) consumes this trait, so it can be driven by
/// a monitor with canned statistics in tests.
pub trait Monitor: Send + Sync + Debug {
    /// Returns the name of the monitored service.
    fn service_name(&self) -> &str;

    /// Returns the width of a period in seconds.
    fn sample_period(&self) -> u32;

    /// Records one event in the current period.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be stored.
    fn register_event(&self, kind: EventKind) -> Result<()>;

    /// Returns the statistics of the period preceding the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the counters cannot be read.
    fn results_for_previous_period(&self) -> Result<PeriodStats>;
}

/// Aggregates call outcomes into fixed-width time periods held in a counter store.
///
/// Each event increments the counter `{service}.{period}.{successes|failures|rejections}`,
/// where `period` is the current Unix time divided by the sample period, rounded down.
/// Every process that shares a counter store and a service name contributes to the same
/// counters, so the statistics describe the dependency as a whole.
///
/// # Examples
///
/// ```
/// use breakwater::{CircuitMonitor, EventKind, FixedTimeSource};
/// use breakwater_memory::InMemoryCounterStore;
///
/// let monitor = CircuitMonitor::new("search", InMemoryCounterStore::new(), FixedTimeSource::new(125), 60)?;
/// monitor.register_event(EventKind::Failure)?;
///
/// let stats = monitor.results_for_period(125)?;
/// assert_eq!(stats.period_start, 120);
/// assert_eq!(stats.period_end, 179);
/// assert_eq!(stats.failures, 1);
/// # Ok::<(), breakwater::Error>(())
/// ```
#[derive(Debug)]
pub struct CircuitMonitor {
    service_name: String,
    store: Arc<dyn CounterStore>,
    time: Arc<dyn TimeSource>,
    sample_period: AtomicU32,
}

impl CircuitMonitor {
    /// Creates a monitor for `service_name` using periods of `sample_period` seconds.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if
    /// `sample_period` is zero.
    pub fn new(
        service_name: impl Into<String>,
        store: impl CounterStore + 'static,
        time: impl TimeSource + 'static,
        sample_period: u32,
    ) -> Result<Self> {
        Self::from_parts(service_name.into(), Arc::new(store), Arc::new(time), sample_period)
    }

    pub(crate) fn from_parts(
        service_name: String,
        store: Arc<dyn CounterStore>,
        time: Arc<dyn TimeSource>,
        sample_period: u32,
    ) -> Result<Self> {
        validate_sample_period(sample_period)?;

        Ok(Self {
            service_name,
            store,
            time,
            sample_period: AtomicU32::new(sample_period),
        })
    }

    /// Returns the width of a period in seconds.
    #[must_use]
    pub fn sample_period(&self) -> u32 {
        self.sample_period.load(Ordering::Relaxed)
    }

    /// Changes the width of a period.
    ///
    /// Counters already written are not re-bucketed; they are read back under the new
    /// period numbering.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if
    /// `seconds` is zero.
    pub fn set_sample_period(&self, seconds: u32) -> Result<()> {
        validate_sample_period(seconds)?;
        self.sample_period.store(seconds, Ordering::Relaxed);
        Ok(())
    }

    /// Records one event in the current period.
    ///
    /// # Errors
    ///
    /// Returns a [`CounterStore`](crate::ErrorKind::CounterStore) error if the increment fails.
    pub fn register_event(&self, kind: EventKind) -> Result<()> {
        let period = Period::containing(self.time.now(), self.sample_period());
        self.store.increment(&period.key(&self.service_name, kind), 1, 1)?;
        Ok(())
    }

    /// Returns the statistics of the period containing `timestamp`.
    ///
    /// Counters missing from the store count as zero.
    ///
    /// # Errors
    ///
    /// Returns a [`CounterStore`](crate::ErrorKind::CounterStore) error if the read fails.
    pub fn results_for_period(&self, timestamp: i64) -> Result<PeriodStats> {
        let period = Period::containing(timestamp, self.sample_period());
        let keys = period.keys(&self.service_name);
        let values = self.store.multi_get(&keys)?;

        Ok(period.stats(&keys, &values))
    }

    /// Returns the statistics of the period preceding the current one.
    ///
    /// # Errors
    ///
    /// Returns a [`CounterStore`](crate::ErrorKind::CounterStore) error if the read fails.
    pub fn results_for_previous_period(&self) -> Result<PeriodStats> {
        let sample_period = i64::from(self.sample_period());
        self.results_for_period(self.time.now().saturating_sub(sample_period))
    }

    /// Returns the statistics of the `count` periods preceding the current one.
    ///
    /// The map is keyed by offset from the current period: `-1` is the previous period,
    /// `-count` the oldest. All counters are fetched in a single read.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if `count`
    /// is zero, or a [`CounterStore`](crate::ErrorKind::CounterStore) error if the read fails.
    pub fn results_for_previous_periods(&self, count: u32) -> Result<BTreeMap<i64, PeriodStats>> {
        if count == 0 {
            return Err(Error::invalid_argument("period count must be positive"));
        }

        let now = self.time.now();
        let sample_period = self.sample_period();

        let periods: Vec<(i64, Period)> = (1..=i64::from(count))
            .map(|offset| {
                let timestamp = now.saturating_sub(offset.saturating_mul(i64::from(sample_period)));
                (-offset, Period::containing(timestamp, sample_period))
            })
            .collect();

        let keys: Vec<String> = periods
            .iter()
            .flat_map(|(_, period)| period.keys(&self.service_name))
            .collect();
        let values = self.store.multi_get(&keys)?;

        Ok(periods
            .iter()
            .zip(keys.chunks(EventKind::ALL.len()))
            .map(|((offset, period), keys)| (*offset, period.stats(keys, &values)))
            .collect())
    }
}

impl Monitor for CircuitMonitor {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn sample_period(&self) -> u32 {
        Self::sample_period(self)
    }

    fn register_event(&self, kind: EventKind) -> Result<()> {
        Self::register_event(self, kind)
    }

    fn results_for_previous_period(&self) -> Result<PeriodStats> {
        Self::results_for_previous_period(self)
    }
}

fn validate_sample_period(seconds: u32) -> Result<()> {
    if seconds == 0 {
        Err(Error::invalid_argument("sample period must be at least one second"))
    } else {
        Ok(())
    }
}

/// One sample period, identified by its index since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Period {
    index: i64,
    width: i64,
}

impl Period {
    fn containing(timestamp: i64, sample_period: u32) -> Self {
        let width = i64::from(sample_period);
        Self {
            index: timestamp.div_euclid(width),
            width,
        }
    }

    fn start(self) -> i64 {
        self.index.saturating_mul(self.width)
    }

    fn end(self) -> i64 {
        self.start().saturating_add(self.width - 1)
    }

    fn key(self, service_name: &str, kind: EventKind) -> String {
        format!("{service_name}.{}.{}", self.index, kind.counter_suffix())
    }

    /// Keys of the success, failure and rejection counters, in that order.
    fn keys(self, service_name: &str) -> Vec<String> {
        EventKind::ALL.iter().map(|kind| self.key(service_name, *kind)).collect()
    }

    fn stats(self, keys: &[String], values: &HashMap<String, CounterValue>) -> PeriodStats {
        let count = |index: usize| keys.get(index).and_then(|key| values.get(key)).map_or(0, CounterValue::as_count);

        PeriodStats::from_counts(self.start(), self.end(), count(0), count(1), count(2))
    }
}
