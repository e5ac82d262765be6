// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for circuit breakers and monitors.

use std::sync::Arc;

use breakwater_counter::CounterStore;

use crate::telemetry::TelemetryHelper;
use crate::{
    BreakerConfig, CircuitBreaker, CircuitMonitor, FastRandom, FixedTimeSource, RandomSource, Result, SystemTimeSource, TimeSource,
};

/// Builder for configuring a [`CircuitBreaker`] and the [`CircuitMonitor`] behind it.
///
/// Every setting has a default:
///
/// | Setting | Default |
/// |---|---|
/// | counter store | [`InMemoryCounterStore`](breakwater_memory::InMemoryCounterStore), `memory` feature |
/// | time source | [`SystemTimeSource`] |
/// | random source | [`FastRandom`] |
/// | configuration | [`BreakerConfig::default`] |
///
/// The configuration is validated when the breaker is built.
///
/// # Examples
///
/// ```
/// use breakwater::CircuitBreaker;
/// use breakwater_memory::InMemoryCounterStore;
///
/// let breaker = CircuitBreaker::builder("payments")
///     .counter_store(InMemoryCounterStore::new())
///     .sample_period(30)
///     .percentage_failure_threshold(25.0)
///     .minimum_requests_before_trigger(10)
///     .recovery_factor(3.0)
///     .build()?;
///
/// assert_eq!(breaker.monitor().sample_period(), 30);
/// # Ok::<(), breakwater::Error>(())
/// ```
#[derive(Debug)]
pub struct CircuitBreakerBuilder {
    service_name: String,
    store: Option<Arc<dyn CounterStore>>,
    time: Arc<dyn TimeSource>,
    random: Arc<dyn RandomSource>,
    config: BreakerConfig,
    telemetry: TelemetryHelper,
}

impl CircuitBreakerBuilder {
    /// Creates a builder for a breaker guarding `service_name`.
    ///
    /// Breakers that share a counter store and a service name share their statistics.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            store: None,
            time: Arc::new(SystemTimeSource),
            random: Arc::new(FastRandom),
            config: BreakerConfig::default(),
            telemetry: TelemetryHelper::default(),
        }
    }

    /// Sets the counter store holding the period counters.
    #[must_use]
    pub fn counter_store(mut self, store: impl CounterStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets a counter store already shared with other components.
    #[must_use]
    pub fn shared_counter_store(mut self, store: Arc<dyn CounterStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Creates the counter store with `factory`, falling back to an in-memory store.
    ///
    /// A failing factory is reported as an error log event and does not fail the build.
    /// The fallback store is local to this process, so the statistics it collects are
    /// not shared with other instances of the service.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn counter_store_with<S, E, F>(mut self, factory: F) -> Self
    where
        S: CounterStore + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: FnOnce() -> std::result::Result<S, E>,
    {
        match factory() {
            Ok(store) => self.store = Some(Arc::new(store)),
            Err(error) => {
                let error: Box<dyn std::error::Error + Send + Sync> = error.into();
                self.log_store_failure(error.as_ref());
                self.store = None;
            }
        }
        self
    }

    /// Sets the source of the current time.
    #[must_use]
    pub fn time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Arc::new(time);
        self
    }

    /// Pins the current time to `timestamp` seconds since the Unix epoch.
    #[must_use]
    pub fn fixed_time(self, timestamp: i64) -> Self {
        self.time_source(FixedTimeSource::new(timestamp))
    }

    /// Reads the current time from the system clock. This is the default.
    #[must_use]
    pub fn system_time(self) -> Self {
        self.time_source(SystemTimeSource)
    }

    /// Sets the random source used for probabilistic admission.
    #[must_use]
    pub fn random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: BreakerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the width of a counting period, in seconds.
    #[must_use]
    pub fn sample_period(mut self, seconds: u32) -> Self {
        self.config.sample_period = seconds;
        self
    }

    /// Enables the breaker. This is the default.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.config.enabled = true;
        self
    }

    /// Disables the breaker: every call is admitted, events are still recorded.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.config.enabled = false;
        self
    }

    /// Sets how many requests a period needs before its failure rate can trip the circuit.
    #[must_use]
    pub fn minimum_requests_before_trigger(mut self, requests: u64) -> Self {
        self.config.minimum_requests_before_trigger = requests;
        self
    }

    /// Sets the failure rate, in percent, at or above which the circuit trips.
    #[must_use]
    pub fn percentage_failure_threshold(mut self, percentage: f64) -> Self {
        self.config.percentage_failure_threshold = percentage;
        self
    }

    /// Recovers a tripped circuit by admitting a growing share of calls. This is the default.
    #[must_use]
    pub fn probabilistic_dynamics(mut self) -> Self {
        self.config.probabilistic_dynamics = true;
        self
    }

    /// Rejects every call while the circuit is tripped.
    #[must_use]
    pub fn deterministic_dynamics(mut self) -> Self {
        self.config.probabilistic_dynamics = false;
        self
    }

    /// Sets the multiplier applied to the admitted share after each recovering period.
    #[must_use]
    pub fn recovery_factor(mut self, factor: f64) -> Self {
        self.config.recovery_factor = factor;
        self
    }

    /// Enable metrics reporting with the given OpenTelemetry meter provider.
    #[must_use]
    #[cfg(any(feature = "metrics", test))]
    pub fn enable_metrics(mut self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        let meter = crate::telemetry::metrics::create_meter(provider);
        self.telemetry.event_reporter = Some(crate::telemetry::metrics::create_event_counter(&meter));
        self
    }

    /// Enable structured logging of rejected and throttled calls.
    #[must_use]
    #[cfg(any(feature = "logs", test))]
    pub fn enable_logs(mut self) -> Self {
        self.telemetry.logs_enabled = true;
        self
    }

    /// Builds only the monitor, for callers that read statistics without making decisions.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if the
    /// configuration does not validate or no counter store is available.
    pub fn build_monitor(self) -> Result<CircuitMonitor> {
        self.config.validate()?;
        let store = resolve_store(self.store, self.config.sample_period)?;
        CircuitMonitor::from_parts(self.service_name, store, self.time, self.config.sample_period)
    }

    /// Builds the circuit breaker.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if the
    /// configuration does not validate or no counter store is available.
    pub fn build(self) -> Result<CircuitBreaker> {
        self.config.validate()?;
        let store = resolve_store(self.store, self.config.sample_period)?;
        let monitor = CircuitMonitor::from_parts(self.service_name, store, self.time, self.config.sample_period)?;

        Ok(CircuitBreaker::from_parts(monitor, self.random, self.config, self.telemetry))
    }

    #[cfg(feature = "memory")]
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "unused when logs are disabled")
    )]
    fn log_store_failure(&self, error: &(dyn std::error::Error + Send + Sync)) {
        #[cfg(any(feature = "logs", test))]
        tracing::event!(
            name: "breakwater.builder.counter_store_failed",
            tracing::Level::ERROR,
            breaker.name = %self.service_name,
            error = %error,
            "breakwater.builder.counter_store_failed"
        );
    }
}

#[cfg(feature = "memory")]
#[expect(clippy::unnecessary_wraps, reason = "fallible when the memory feature is disabled")]
fn resolve_store(store: Option<Arc<dyn CounterStore>>, sample_period: u32) -> Result<Arc<dyn CounterStore>> {
    Ok(store.unwrap_or_else(|| Arc::new(breakwater_memory::InMemoryCounterStore::for_sample_period(sample_period))))
}

#[cfg(not(feature = "memory"))]
fn resolve_store(store: Option<Arc<dyn CounterStore>>, _sample_period: u32) -> Result<Arc<dyn CounterStore>> {
    store.ok_or_else(|| crate::Error::invalid_argument("no counter store configured and the `memory` feature is disabled"))
}
