// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

/// Classifies an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A configuration value or call argument was rejected.
    ///
    /// These errors are raised synchronously and retrying the same call cannot succeed.
    InvalidArgument,

    /// The counter store failed to complete an operation.
    ///
    /// The store error is available through [`std::error::Error::source`].
    CounterStore,
}

/// An error raised by a circuit breaker or circuit monitor.
///
/// An open circuit is not an error: [`CircuitBreaker::is_closed`](crate::CircuitBreaker::is_closed)
/// reports it as `Ok(false)`.
///
/// # Examples
///
/// ```
/// use breakwater::{CircuitBreaker, ErrorKind};
///
/// let breaker = CircuitBreaker::builder("payments").build()?;
/// let error = breaker.set_recovery_factor(0.5).unwrap_err();
///
/// assert_eq!(error.kind(), ErrorKind::InvalidArgument);
/// # Ok::<(), breakwater::Error>(())
/// ```
#[ohno::error]
#[display("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if the error was caused by an invalid argument.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        self.kind == ErrorKind::InvalidArgument
    }

    pub(crate) fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub(crate) fn counter_store(error: breakwater_counter::Error) -> Self {
        Self::caused_by(ErrorKind::CounterStore, "counter store operation failed", error)
    }
}

impl From<breakwater_counter::Error> for Error {
    fn from(error: breakwater_counter::Error) -> Self {
        Self::counter_store(error)
    }
}

/// A specialized [`Result`] type for circuit breaker operations.
pub type Result<T> = std::result::Result<T, Error>;
