// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for counter store operations.

/// An error from a counter store operation.
///
/// This is an opaque error type that can wrap any underlying error from a store
/// implementation, such as a lost connection to a remote cache. Use
/// [`std::error::Error::source()`] to access the underlying cause if needed.
///
/// # Example
///
/// ```
/// use breakwater_counter::Error;
///
/// let error = Error::from_message("connection reset");
/// ```
#[ohno::error]
pub struct Error {}

impl Error {
    /// Creates a new error from any type that can be converted to an error.
    ///
    /// Store backends living in other crates use this to report their failures.
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }
}

/// A specialized [`Result`] type for counter store operations.
pub type Result<T> = std::result::Result<T, Error>;
