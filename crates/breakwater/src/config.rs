// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Error, Result};

pub(crate) const DEFAULT_SAMPLE_PERIOD: u32 = 60;
pub(crate) const DEFAULT_FAILURE_THRESHOLD: f64 = 50.0;
pub(crate) const DEFAULT_MINIMUM_REQUESTS: u64 = 3;
pub(crate) const DEFAULT_RECOVERY_FACTOR: f64 = 2.0;

/// Tunable settings of a circuit breaker.
///
/// With the `serde` feature the struct deserializes from camel-cased maps, and missing
/// fields take their default values:
///
/// ```json
/// {
///   "enabled": true,
///   "samplePeriod": 60,
///   "percentageFailureThreshold": 50,
///   "minimumRequestsBeforeTrigger": 3,
///   "probabilisticDynamics": true,
///   "recoveryFactor": 2
/// }
/// ```
///
/// Deserialized values are not checked until [`BreakerConfig::validate`] runs, which
/// happens when a breaker is built from the configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(any(feature = "serde", test), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(feature = "serde", test), serde(default, rename_all = "camelCase"))]
pub struct BreakerConfig {
    /// A disabled breaker admits every call but still records events.
    pub enabled: bool,
    /// Width of a counting period, in seconds.
    pub sample_period: u32,
    /// Failure rate, in percent, at or above which the circuit trips.
    pub percentage_failure_threshold: f64,
    /// Requests a period must see before its failure rate can trip the circuit.
    pub minimum_requests_before_trigger: u64,
    /// Recover through a probabilistic ramp instead of rejecting every call.
    pub probabilistic_dynamics: bool,
    /// Multiplier applied to the admitted share after each recovering period.
    pub recovery_factor: f64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_period: DEFAULT_SAMPLE_PERIOD,
            percentage_failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            minimum_requests_before_trigger: DEFAULT_MINIMUM_REQUESTS,
            probabilistic_dynamics: true,
            recovery_factor: DEFAULT_RECOVERY_FACTOR,
        }
    }
}

impl BreakerConfig {
    /// Checks every field and reports the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error when the
    /// sample period is zero, the failure threshold is outside `0..=100`, or the recovery
    /// factor is not greater than one.
    pub fn validate(&self) -> Result<()> {
        if self.sample_period == 0 {
            return Err(Error::invalid_argument("sample period must be at least one second"));
        }

        validate_failure_threshold(self.percentage_failure_threshold)?;
        validate_recovery_factor(self.recovery_factor)
    }
}

pub(crate) fn validate_failure_threshold(percentage: f64) -> Result<()> {
    if percentage.is_finite() && (0.0..=100.0).contains(&percentage) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "percentage failure threshold must be between 0 and 100, got {percentage}"
        )))
    }
}

pub(crate) fn validate_recovery_factor(factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!("recovery factor must be greater than 1, got {factor}")))
    }
}
