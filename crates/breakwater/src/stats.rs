// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Aggregated outcome counts for one sample period.
///
/// Statistics are recomputed from the counter store each time they are requested and
/// are never persisted. Values produced by [`PeriodStats::from_counts`] always keep
/// `failure_rate` and `throttle` within `0..=100`. A fractional `throttle` is
/// tolerated by the breaker for statistics sourced elsewhere.
///
/// # Examples
///
/// ```
/// use breakwater::PeriodStats;
///
/// let stats = PeriodStats::from_counts(120, 179, 1, 4, 5);
///
/// assert_eq!(stats.total_requests, 5);
/// assert_eq!(stats.failure_rate, 80);
/// assert_eq!(stats.throttle, 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(any(feature = "serde", test), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(feature = "serde", test), serde(rename_all = "camelCase"))]
pub struct PeriodStats {
    /// First second of the period, inclusive.
    pub period_start: i64,
    /// Last second of the period, inclusive.
    pub period_end: i64,
    /// Calls that succeeded.
    pub successes: u64,
    /// Calls that failed.
    pub failures: u64,
    /// Calls turned away by the breaker.
    pub rejections: u64,
    /// Calls that reached the dependency; rejections are excluded.
    pub total_requests: u64,
    /// Percentage of requests that failed, rounded half up.
    pub failure_rate: u64,
    /// Percentage of attempted calls that were admitted.
    pub throttle: f64,
}

impl PeriodStats {
    /// Computes the statistics of a period from its raw counters.
    #[must_use]
    pub fn from_counts(period_start: i64, period_end: i64, successes: u64, failures: u64, rejections: u64) -> Self {
        let total_requests = successes.saturating_add(failures);
        let attempts = total_requests.saturating_add(rejections);

        let failure_rate = if total_requests == 0 {
            0
        } else {
            u64::from(rounded_percentage(failures, total_requests))
        };

        let throttle = if attempts == 0 {
            100.0
        } else {
            f64::from(100 - rounded_percentage(rejections, attempts))
        };

        Self {
            period_start,
            period_end,
            successes,
            failures,
            rejections,
            total_requests,
            failure_rate,
            throttle,
        }
    }

    /// Returns the number of calls attempted, whether admitted or rejected.
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.total_requests.saturating_add(self.rejections)
    }

    /// Returns the percentage of requests that did not fail.
    #[must_use]
    pub fn success_rate(&self) -> u64 {
        100_u64.saturating_sub(self.failure_rate)
    }
}

/// Returns `round(part / whole * 100)` with halves rounded up, for `part <= whole`.
fn rounded_percentage(part: u64, whole: u64) -> u8 {
    debug_assert!(whole > 0 && part <= whole);

    let part = u128::from(part);
    let whole = u128::from(whole);
    let rounded = (200 * part + whole) / (2 * whole);

    // part <= whole keeps the result within 0..=100
    u8::try_from(rounded).unwrap_or(100)
}
