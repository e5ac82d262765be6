// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Sources of the current time.

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use tick::Clock;

/// Supplies the current time as whole seconds since the Unix epoch.
///
/// Time is injected so that period boundaries can be made deterministic in tests.
/// [`tick::Clock`] implements this trait, which lets tests drive time with
/// `tick::ClockControl`.
pub trait TimeSource: Send + Sync + Debug {
    /// Returns the current Unix timestamp in seconds.
    fn now(&self) -> i64;
}

/// Reads the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> i64 {
        unix_seconds(SystemTime::now())
    }
}

/// Always reports the same instant.
///
/// # Examples
///
/// ```
/// use breakwater::{FixedTimeSource, TimeSource};
///
/// let time = FixedTimeSource::new(1_700_000_000);
/// assert_eq!(time.now(), 1_700_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTimeSource(i64);

impl FixedTimeSource {
    /// Creates a source frozen at `timestamp` seconds since the Unix epoch.
    #[must_use]
    pub fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> i64 {
        self.0
    }
}

impl TimeSource for Clock {
    fn now(&self) -> i64 {
        unix_seconds(self.system_time())
    }
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        // Round towards negative infinity so pre-epoch instants land in the right period.
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
            if before.subsec_nanos() > 0 { -secs - 1 } else { -secs }
        }
    }
}
