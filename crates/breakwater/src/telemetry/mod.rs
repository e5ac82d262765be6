// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! # Circuit Breaker Telemetry
//!
//! Well-known attribute keys attached to the metrics and log events emitted by circuit
//! breakers.
//!
//! With the `metrics` feature every registered event adds one to the `breakwater.event`
//! counter, tagged with [`BREAKER_NAME`] and [`EVENT_NAME`]. With the `logs` feature,
//! rejections and throttled admissions are reported as `tracing` events.
//!
//! # Conventions
//!
//! Names follow the [OpenTelemetry naming guidelines](https://opentelemetry.io/docs/specs/semconv/general/naming/#general-naming-considerations).

#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// Key used to annotate the name of the circuit breaker, i.e. the monitored service.
///
/// Examples: `payments`, `user_profile`, `search_backend`.
pub const BREAKER_NAME: &str = "breakwater.breaker.name";

/// Key used to annotate the event being reported.
///
/// Values are `success`, `failure` and `rejection`.
pub const EVENT_NAME: &str = "breakwater.event.name";

#[derive(Debug, Clone, Default)]
pub(crate) struct TelemetryHelper {
    #[cfg(any(feature = "metrics", test))]
    pub(crate) event_reporter: Option<opentelemetry::metrics::Counter<u64>>,
    #[cfg(any(feature = "logs", test))]
    pub(crate) logs_enabled: bool,
}

impl TelemetryHelper {
    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn metrics_enabled(&self) -> bool {
        self.event_reporter.is_some()
    }

    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn report_metrics(&self, attributes: &[opentelemetry::KeyValue]) {
        if let Some(reporter) = &self.event_reporter {
            reporter.add(1, attributes);
        }
    }
}
