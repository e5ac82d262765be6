// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// A counter value as returned by [`CounterStore::multi_get`](crate::CounterStore::multi_get).
///
/// Network caches commonly hand counters back as text, so a store may return either
/// form. Use [`CounterValue::as_count`] to obtain the numeric value.
///
/// # Examples
///
/// ```
/// use breakwater_counter::CounterValue;
///
/// assert_eq!(CounterValue::Integer(7).as_count(), 7);
/// assert_eq!(CounterValue::from("12").as_count(), 12);
/// assert_eq!(CounterValue::from("garbage").as_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterValue {
    /// A native integer value.
    Integer(u64),
    /// A textual value holding a decimal count.
    Text(String),
}

impl CounterValue {
    /// Returns the value as an unsigned count.
    ///
    /// Text is read from its leading decimal digits, after optional whitespace and an
    /// optional sign. Text without leading digits counts as zero, negative numbers clamp
    /// to zero and values too large for `u64` saturate.
    #[must_use]
    pub fn as_count(&self) -> u64 {
        match self {
            Self::Integer(value) => *value,
            Self::Text(text) => parse_leading_count(text),
        }
    }
}

fn parse_leading_count(text: &str) -> u64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: u64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(u64::from(byte - b'0'));
    }

    if negative { 0 } else { value }
}

impl From<u64> for CounterValue {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for CounterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CounterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for CounterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}
