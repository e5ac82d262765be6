// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The trip and recovery policy.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::builder::CircuitBreakerBuilder;
use crate::config::{validate_failure_threshold, validate_recovery_factor};
use crate::telemetry::TelemetryHelper;
#[cfg(any(feature = "metrics", test))]
use crate::telemetry::{BREAKER_NAME, EVENT_NAME};
use crate::{BreakerConfig, CircuitMonitor, EventKind, Monitor, PeriodStats, RandomSource, Result};

/// Admission threshold used when the previous period admitted nothing at all.
pub const FIRST_RECOVERY_STEP: f64 = 10.0;

/// Throttle level separating a recovering circuit from a healthy one.
///
/// A period that admitted less than this share of calls keeps the circuit tripped, and
/// a recovery threshold above it closes the circuit completely.
pub const THROTTLE_SNAPBACK: f64 = 80.0;

/// Decides whether calls to a dependency may proceed.
///
/// The decision is based only on the statistics of the previous sample period:
///
/// - The circuit trips when the previous period saw at least
///   `minimum_requests_before_trigger` requests and its failure rate reached
///   `percentage_failure_threshold`, or when the breaker was still throttling more
///   than [`THROTTLE_SNAPBACK`] percent of calls away.
/// - A tripped deterministic breaker rejects every call.
/// - A tripped probabilistic breaker admits a growing share of calls. The share is
///   the previous throttle multiplied by `recovery_factor`, capped by the previous
///   success rate, and snaps back to admitting everything once it exceeds
///   [`THROTTLE_SNAPBACK`].
///
/// Callers report each outcome with [`register_success`](Self::register_success),
/// [`register_failure`](Self::register_failure) or
/// [`register_rejection`](Self::register_rejection). Rejections feed the throttle.
///
/// # Examples
///
/// ```
/// use breakwater::CircuitBreaker;
///
/// let breaker = CircuitBreaker::builder("inventory").build()?;
///
/// if breaker.is_closed()? {
///     // call the dependency, then report what happened
///     breaker.register_success()?;
/// } else {
///     breaker.register_rejection()?;
/// }
/// # Ok::<(), breakwater::Error>(())
/// ```
#[derive(Debug)]
pub struct CircuitBreaker<M = CircuitMonitor> {
    monitor: M,
    random: Arc<dyn RandomSource>,
    config: RwLock<BreakerConfig>,
    telemetry: TelemetryHelper,
}

impl CircuitBreaker {
    /// Creates a builder for a breaker guarding `service_name`.
    #[must_use]
    pub fn builder(service_name: impl Into<String>) -> CircuitBreakerBuilder {
        CircuitBreakerBuilder::new(service_name)
    }
}

impl<M: Monitor> CircuitBreaker<M> {
    /// Creates a breaker with the default configuration.
    ///
    /// The monitor keeps its own sample period, which [`config`](Self::config) reports.
    #[must_use]
    pub fn new(monitor: M, random: impl RandomSource + 'static) -> Self {
        Self::from_parts(monitor, Arc::new(random), BreakerConfig::default(), TelemetryHelper::default())
    }

    /// Creates a breaker from its collaborators and a configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error if the
    /// configuration does not validate.
    pub fn with_config(monitor: M, random: impl RandomSource + 'static, config: BreakerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(monitor, Arc::new(random), config, TelemetryHelper::default()))
    }

    pub(crate) fn from_parts(monitor: M, random: Arc<dyn RandomSource>, config: BreakerConfig, telemetry: TelemetryHelper) -> Self {
        Self {
            monitor,
            random,
            config: RwLock::new(config),
            telemetry,
        }
    }

    /// Returns `true` if the next call should be made.
    ///
    /// A disabled breaker admits every call without reading the counter store. An open
    /// circuit is reported as `Ok(false)`, never as an error.
    ///
    /// # Errors
    ///
    /// Returns a [`CounterStore`](crate::ErrorKind::CounterStore) error if the statistics
    /// of the previous period cannot be read.
    pub fn is_closed(&self) -> Result<bool> {
        let config = self.config.read().clone();
        if !config.enabled {
            return Ok(true);
        }

        let stats = self.monitor.results_for_previous_period()?;
        if !has_tripped(&config, &stats) {
            return Ok(true);
        }

        Ok(self.trip_response(&config, &stats))
    }

    /// Records a successful call.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be stored.
    pub fn register_success(&self) -> Result<()> {
        self.register(EventKind::Success)
    }

    /// Records a failed call.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be stored.
    pub fn register_failure(&self) -> Result<()> {
        self.register(EventKind::Failure)
    }

    /// Records a call that was not made because the circuit was open.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be stored.
    pub fn register_rejection(&self) -> Result<()> {
        self.register(EventKind::Rejection)
    }

    /// Enables or disables the breaker. Events are recorded either way.
    pub fn set_enabled(&self, enabled: bool) {
        self.config.write().enabled = enabled;
    }

    /// Sets how many requests a period needs before its failure rate can trip the circuit.
    pub fn set_minimum_requests_before_trigger(&self, requests: u64) {
        self.config.write().minimum_requests_before_trigger = requests;
    }

    /// Sets the failure rate, in percent, at or above which the circuit trips.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error and keeps
    /// the previous value if `percentage` is not within `0..=100`.
    pub fn set_percentage_failure_threshold(&self, percentage: f64) -> Result<()> {
        validate_failure_threshold(percentage)?;
        self.config.write().percentage_failure_threshold = percentage;
        Ok(())
    }

    /// Chooses between probabilistic recovery and rejecting every call while tripped.
    pub fn set_probabilistic_dynamics(&self, probabilistic: bool) {
        self.config.write().probabilistic_dynamics = probabilistic;
    }

    /// Sets the multiplier applied to the admitted share after each recovering period.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error and keeps
    /// the previous value unless `factor` is greater than one.
    pub fn set_recovery_factor(&self, factor: f64) -> Result<()> {
        validate_recovery_factor(factor)?;
        self.config.write().recovery_factor = factor;
        Ok(())
    }

    /// Returns a snapshot of the current configuration.
    ///
    /// The sample period is read from the monitor, so changes made through
    /// [`CircuitMonitor::set_sample_period`] are reflected.
    #[must_use]
    pub fn config(&self) -> BreakerConfig {
        let mut snapshot = self.config.read().clone();
        snapshot.sample_period = self.monitor.sample_period();
        snapshot
    }

    /// Returns the monitor feeding this breaker.
    #[must_use]
    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    /// Returns the name of the guarded service.
    #[must_use]
    pub fn name(&self) -> &str {
        self.monitor.service_name()
    }

    fn register(&self, kind: EventKind) -> Result<()> {
        self.monitor.register_event(kind)?;

        #[cfg(any(feature = "metrics", test))]
        if self.telemetry.metrics_enabled() {
            self.telemetry.report_metrics(&[
                opentelemetry::KeyValue::new(BREAKER_NAME, self.name().to_owned()),
                opentelemetry::KeyValue::new(EVENT_NAME, kind.as_str()),
            ]);
        }

        Ok(())
    }

    fn trip_response(&self, config: &BreakerConfig, stats: &PeriodStats) -> bool {
        if !config.probabilistic_dynamics {
            self.log_rejected(stats, 0.0);
            return false;
        }

        let threshold = admission_threshold(config, stats);
        if threshold > THROTTLE_SNAPBACK {
            return true;
        }

        let admitted = f64::from(self.random.rand(0, 100)) < threshold;
        if admitted {
            self.log_throttled(stats, threshold);
        } else {
            self.log_rejected(stats, threshold);
        }

        admitted
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "unused when logs are disabled")
    )]
    fn log_rejected(&self, stats: &PeriodStats, threshold: f64) {
        #[cfg(any(feature = "logs", test))]
        if self.telemetry.logs_enabled {
            tracing::event!(
                name: "breakwater.circuit_breaker.rejected",
                tracing::Level::WARN,
                breaker.name = %self.name(),
                breaker.threshold = threshold,
                period.failure_rate = stats.failure_rate,
                period.throttle = stats.throttle,
                period.total_requests = stats.total_requests,
                "breakwater.circuit_breaker.rejected"
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "unused when logs are disabled")
    )]
    fn log_throttled(&self, stats: &PeriodStats, threshold: f64) {
        #[cfg(any(feature = "logs", test))]
        if self.telemetry.logs_enabled {
            tracing::event!(
                name: "breakwater.circuit_breaker.throttled",
                tracing::Level::DEBUG,
                breaker.name = %self.name(),
                breaker.threshold = threshold,
                period.failure_rate = stats.failure_rate,
                period.throttle = stats.throttle,
                period.total_requests = stats.total_requests,
                "breakwater.circuit_breaker.throttled"
            );
        }
    }
}

#[expect(clippy::cast_precision_loss, reason = "percentages never exceed 100")]
fn has_tripped(config: &BreakerConfig, stats: &PeriodStats) -> bool {
    let sufficient_requests = stats.total_requests >= config.minimum_requests_before_trigger;
    let failure_rate_met = stats.failure_rate as f64 >= config.percentage_failure_threshold;
    let recovering = stats.throttle < THROTTLE_SNAPBACK;

    (sufficient_requests && failure_rate_met) || recovering
}

/// Share of calls, in percent, admitted while the circuit is tripped.
#[expect(clippy::cast_precision_loss, reason = "percentages never exceed 100")]
fn admission_threshold(config: &BreakerConfig, stats: &PeriodStats) -> f64 {
    let success_rate = stats.success_rate() as f64;

    let mut new_throttle = stats.throttle * config.recovery_factor;
    if new_throttle <= 0.0 {
        new_throttle = FIRST_RECOVERY_STEP;
    }

    success_rate.min(new_throttle)
}
