// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for period statistics.

use std::time::Duration;

use breakwater::{CircuitMonitor, Error, EventKind, FixedTimeSource};
use breakwater_counter::testing::{CounterOp, MockCounterStore};
use breakwater_memory::InMemoryCounterStore;
use tick::ClockControl;

type TestResult = Result<(), Error>;

fn register(monitor: &CircuitMonitor, kind: EventKind, times: usize) -> TestResult {
    for _ in 0..times {
        monitor.register_event(kind)?;
    }
    Ok(())
}

#[test]
fn failure_rate_of_mixed_period() -> TestResult {
    let monitor = CircuitMonitor::new("search", InMemoryCounterStore::new(), FixedTimeSource::new(30), 60)?;

    register(&monitor, EventKind::Failure, 7)?;
    register(&monitor, EventKind::Success, 3)?;

    let stats = monitor.results_for_period(30)?;
    assert_eq!(stats.failure_rate, 70);
    assert_eq!(stats.total_requests, 10);
    assert!((stats.throttle - 100.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn rejections_lower_throttle_but_not_requests() -> TestResult {
    let monitor = CircuitMonitor::new("search", InMemoryCounterStore::new(), FixedTimeSource::new(30), 60)?;

    register(&monitor, EventKind::Failure, 4)?;
    register(&monitor, EventKind::Success, 1)?;
    register(&monitor, EventKind::Rejection, 5)?;

    let stats = monitor.results_for_period(30)?;
    assert_eq!(stats.total_requests, 5);
    assert_eq!(stats.total_attempts(), 10);
    assert_eq!(stats.failure_rate, 80);
    assert!((stats.throttle - 50.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn repeated_reads_without_writes_are_identical() -> TestResult {
    let monitor = CircuitMonitor::new("search", InMemoryCounterStore::new(), FixedTimeSource::new(30), 60)?;

    register(&monitor, EventKind::Failure, 2)?;
    register(&monitor, EventKind::Rejection, 1)?;
    register(&monitor, EventKind::Success, 1)?;

    let first = monitor.results_for_period(30)?;
    let second = monitor.results_for_period(30)?;

    assert_eq!(first, second);
    assert_eq!((first.successes, first.failures, first.rejections), (1, 2, 1));
    Ok(())
}

#[test]
fn text_values_are_coerced() -> TestResult {
    let store = MockCounterStore::new();
    store.set_raw("search.0.failures", "4");
    store.set_raw("search.0.successes", " 1");
    store.set_raw("search.0.rejections", "5 calls");

    let monitor = CircuitMonitor::new("search", store, FixedTimeSource::new(60), 60)?;
    let stats = monitor.results_for_previous_period()?;

    assert_eq!((stats.successes, stats.failures, stats.rejections), (1, 4, 5));
    assert_eq!(stats.failure_rate, 80);
    assert!((stats.throttle - 50.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn previous_period_follows_the_clock() -> TestResult {
    let control = ClockControl::new_at(std::time::SystemTime::UNIX_EPOCH + Duration::from_secs(600));
    let monitor = CircuitMonitor::new("search", InMemoryCounterStore::new(), control.to_clock(), 60)?;

    register(&monitor, EventKind::Failure, 2)?;
    assert_eq!(monitor.results_for_previous_period()?.total_requests, 0);

    control.advance(Duration::from_secs(60));
    let stats = monitor.results_for_previous_period()?;
    assert_eq!(stats.failures, 2);
    assert_eq!((stats.period_start, stats.period_end), (600, 659));

    control.advance(Duration::from_secs(60));
    assert_eq!(monitor.results_for_previous_period()?.total_requests, 0);
    Ok(())
}

#[test]
fn history_covers_requested_periods() -> TestResult {
    let control = ClockControl::new_at(std::time::SystemTime::UNIX_EPOCH + Duration::from_secs(0));
    let monitor = CircuitMonitor::new("search", InMemoryCounterStore::new(), control.to_clock(), 10)?;

    for period in 0..4_usize {
        register(&monitor, EventKind::Success, period + 1)?;
        control.advance(Duration::from_secs(10));
    }

    let history = monitor.results_for_previous_periods(3)?;
    let offsets: Vec<i64> = history.keys().copied().collect();
    assert_eq!(offsets, [-3, -2, -1]);

    let starts: Vec<i64> = history.values().map(|stats| stats.period_start).collect();
    assert_eq!(starts, [10, 20, 30]);
    assert_eq!(history[&-3].successes, 2);
    assert_eq!(history[&-1].successes, 4);
    Ok(())
}

#[test]
fn statistics_read_in_one_round_trip() -> TestResult {
    let store = MockCounterStore::new();
    let monitor = CircuitMonitor::new("search", store.clone(), FixedTimeSource::new(125), 60)?;

    monitor.results_for_previous_period()?;

    let operations = store.operations();
    assert_eq!(operations.len(), 1);
    assert!(matches!(
        &operations[0],
        CounterOp::MultiGet(keys) if keys == &["search.1.successes", "search.1.failures", "search.1.rejections"]
    ));
    Ok(())
}

#[test]
fn sample_period_change_applies_to_new_events() -> TestResult {
    let store = MockCounterStore::new();
    let monitor = CircuitMonitor::new("search", store.clone(), FixedTimeSource::new(125), 60)?;

    monitor.register_event(EventKind::Success)?;
    monitor.set_sample_period(5)?;
    monitor.register_event(EventKind::Success)?;

    assert_eq!(store.get("search.2.successes"), Some(1));
    assert_eq!(store.get("search.25.successes"), Some(1));
    monitor.set_sample_period(0).unwrap_err();
    assert_eq!(monitor.sample_period(), 5);
    Ok(())
}
