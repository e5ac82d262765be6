// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Drives a circuit breaker against a dependency that fails about half of the time.
//!
//! Each call prints one character:
//!
//! - `S`: the call was admitted and succeeded
//! - `F`: the call was admitted and failed
//! - `R`: the call was rejected by the open circuit
//!
//! With a one-second sample period the output shows the breaker tripping after the
//! first second, then throttling and ramping admissions back up.
//!
//! Pass the number of calls as the first argument, 1000 by default.

use std::io::Write;
use std::time::Duration;

use breakwater::CircuitBreaker;
use breakwater_memory::InMemoryCounterStore;
use ohno::AppError;

const DEFAULT_ITERATIONS: usize = 1000;
const CALLS_PER_LINE: usize = 100;

fn main() -> Result<(), AppError> {
    let iterations = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_ITERATIONS);

    let breaker = CircuitBreaker::builder("flaky_dependency")
        .counter_store(InMemoryCounterStore::for_sample_period(1))
        .sample_period(1)
        .probabilistic_dynamics()
        .build()?;

    let mut out = std::io::stdout().lock();
    for call in 1..=iterations {
        let symbol = if breaker.is_closed()? {
            if call_dependency() {
                breaker.register_success()?;
                'S'
            } else {
                breaker.register_failure()?;
                'F'
            }
        } else {
            breaker.register_rejection()?;
            'R'
        };

        write!(out, "{symbol}")?;
        if call % CALLS_PER_LINE == 0 {
            writeln!(out)?;
        }
        out.flush()?;

        std::thread::sleep(Duration::from_millis(10));
    }
    writeln!(out)?;

    let stats = breaker.monitor().results_for_previous_period()?;
    writeln!(
        out,
        "last complete period: {} requests, {}% failed, {}% admitted",
        stats.total_requests, stats.failure_rate, stats.throttle
    )?;

    Ok(())
}

fn call_dependency() -> bool {
    fastrand::bool()
}
