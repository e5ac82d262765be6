// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Sources of random draws for probabilistic recovery.

use std::fmt::Debug;

use parking_lot::Mutex;

/// Supplies uniformly distributed integers.
///
/// The breaker asks for one draw in `0..=100` per decision taken while the circuit is
/// recovering. Draws are injected so tests can make them deterministic.
pub trait RandomSource: Send + Sync + Debug {
    /// Returns an integer in `min..=max`, inclusive at both ends.
    fn rand(&self, min: u32, max: u32) -> u32;
}

/// Non-cryptographic random source backed by `fastrand`.
///
/// This source is **NOT cryptographically secure**. Admission sampling does not need
/// cryptographic guarantees.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastRandom;

impl RandomSource for FastRandom {
    fn rand(&self, min: u32, max: u32) -> u32 {
        if min >= max { min } else { fastrand::u32(min..=max) }
    }
}

/// Always returns the same value, clamped to the requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRandom(u32);

impl FixedRandom {
    /// Creates a source that always draws `value`.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

impl RandomSource for FixedRandom {
    fn rand(&self, min: u32, max: u32) -> u32 {
        self.0.clamp(min, max.max(min))
    }
}

/// Counts upwards through the requested range and wraps around.
///
/// The first draw returns `min`, each following draw returns one more, and the draw
/// after `max` starts over at `min`. Over `max - min + 1` consecutive draws every value
/// appears exactly once, which makes admission ratios exact in tests.
///
/// # Examples
///
/// ```
/// use breakwater::{RandomSource, SequentialRandom};
///
/// let random = SequentialRandom::new();
/// let draws: Vec<u32> = (0..5).map(|_| random.rand(0, 2)).collect();
///
/// assert_eq!(draws, [0, 1, 2, 0, 1]);
/// ```
#[derive(Debug, Default)]
pub struct SequentialRandom {
    last: Mutex<Option<u32>>,
}

impl SequentialRandom {
    /// Creates a source whose first draw is the lower bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomSource for SequentialRandom {
    fn rand(&self, min: u32, max: u32) -> u32 {
        let mut last = self.last.lock();
        let next = match *last {
            Some(previous) if previous >= min && previous < max => previous + 1,
            _ => min,
        };
        *last = Some(next);
        next
    }
}
