// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The outcome of a call made through a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(any(feature = "serde", test), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(feature = "serde", test), serde(rename_all = "snake_case"))]
pub enum EventKind {
    /// The call reached the dependency and succeeded.
    Success,
    /// The call reached the dependency and failed.
    Failure,
    /// The call was not made because the circuit was open.
    Rejection,
}

impl EventKind {
    /// All event kinds, in the order their counters are read.
    pub const ALL: [Self; 3] = [Self::Success, Self::Failure, Self::Rejection];

    /// Returns the short name of the event, e.g. `success`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Rejection => "rejection",
        }
    }

    /// Returns the suffix of the counter key recording this event, e.g. `successes`.
    #[must_use]
    pub fn counter_suffix(self) -> &'static str {
        match self {
            Self::Success => "successes",
            Self::Failure => "failures",
            Self::Rejection => "rejections",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "rejection" => Ok(Self::Rejection),
            other => Err(Error::invalid_argument(format!("unrecognized event kind: {other}"))),
        }
    }
}
