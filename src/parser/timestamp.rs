//! Timestamp parsing for OSD log lines.
//!
//! Ceph stamps every line as `YYYY-MM-DD HH:MM:SS.ffffff`. The fractional
//! part is normalized to microseconds: short fractions are right-padded
//! with zeros, long ones are truncated. Nothing is ever rounded.
//!
//! Instants are naive. All comparisons happen between lines of the same
//! log, so no timezone is applied.

use crate::utils::config::TIMESTAMP_FRACTION_DIGITS;
use crate::utils::error::ParseError;
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

/// Format of the whole-second part of a timestamp
const WHOLE_SECONDS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A log timestamp with microsecond resolution
///
/// **Public** - totally ordered, subtracting two yields a signed duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Underlying naive date/time
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Microseconds past the whole second
    pub fn microsecond(&self) -> u32 {
        self.0.nanosecond() / 1_000
    }
}

impl Sub for Timestamp {
    type Output = chrono::Duration;

    fn sub(self, earlier: Timestamp) -> chrono::Duration {
        self.0.signed_duration_since(earlier.0)
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timestamp(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

/// Parse a log timestamp
///
/// **Public** - used by the event matcher for every matched line
///
/// # Errors
/// * `ParseError::MalformedTimestamp` - no fractional part, non-digit
///   fraction, or a date/time that does not fit the fixed pattern
pub fn parse_timestamp(text: &str) -> Result<Timestamp, ParseError> {
    let malformed = || ParseError::MalformedTimestamp(text.to_string());

    let (whole, fraction) = text.trim().split_once('.').ok_or_else(malformed)?;
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    // Date and time may be separated by any run of whitespace
    let whole = whole.split_whitespace().collect::<Vec<_>>().join(" ");
    let datetime =
        NaiveDateTime::parse_from_str(&whole, WHOLE_SECONDS_FORMAT).map_err(|_| malformed())?;

    let datetime = datetime
        .with_nanosecond(fraction_to_micros(fraction) * 1_000)
        .ok_or_else(malformed)?;

    Ok(Timestamp(datetime))
}

/// Normalize an all-digit fraction to exactly six digits
///
/// **Private** - truncates past microseconds, pads short fractions
fn fraction_to_micros(fraction: &str) -> u32 {
    let digits = &fraction.as_bytes()[..fraction.len().min(TIMESTAMP_FRACTION_DIGITS)];
    let value = digits
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));

    value * 10u32.pow((TIMESTAMP_FRACTION_DIGITS - digits.len()) as u32)
}
