//! Point timestamp parsing.
//!
//! Export timestamps use a fixed-width, offset-aware layout:
//! `YYYY-MM-DD HH:MM:SS ±HHMM`, e.g. `2024-01-02 10:00:00 +0100`. The offset is
//! taken literally, no timezone database is consulted.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// `chrono` format string for the export timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Byte layout of a valid timestamp: `d` is an ASCII digit, `s` an offset sign.
const LAYOUT: &[u8; 25] = b"dddd-dd-dd dd:dd:dd sdddd";

/// Errors that can occur while parsing a point timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The input does not follow the fixed layout.
    #[error("invalid timestamp {input:?}: expected format YYYY-MM-DD HH:MM:SS ±HHMM")]
    Malformed {
        /// The rejected input.
        input: String,
    },

    /// The input follows the layout but names an impossible date or time.
    #[error("invalid timestamp {input:?}: {source}")]
    Impossible {
        /// The rejected input.
        input: String,
        /// Underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// The seconds field is 60. chrono reads it as a leap second, which the
    /// export format never carries.
    #[error("invalid timestamp {input:?}: second out of range")]
    SecondOutOfRange {
        /// The rejected input.
        input: String,
    },

    /// The instant cannot be expressed as nanoseconds since the Unix epoch.
    #[error("invalid timestamp {input:?}: outside the representable nanosecond range")]
    OutOfRange {
        /// The rejected input.
        input: String,
    },
}

impl TimestampError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::Malformed { input }
            | Self::Impossible { input, .. }
            | Self::SecondOutOfRange { input }
            | Self::OutOfRange { input } => input,
        }
    }
}

/// A parsed point timestamp.
///
/// Ordering compares absolute instants, so `10:00 +0100` sorts before
/// `09:30 +0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    unix_nanos: i64,
}

impl Timestamp {
    /// Returns the instant with the offset it was written in.
    #[must_use]
    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    /// Returns the instant in UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.instant.with_timezone(&Utc)
    }

    /// Nanoseconds since the Unix epoch.
    #[must_use]
    pub fn unix_nanos(&self) -> i64 {
        self.unix_nanos
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instant.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timestamp(s)
    }
}

/// Parses a point timestamp.
///
/// # Errors
///
/// Returns an error if:
/// - The input does not match `YYYY-MM-DD HH:MM:SS ±HHMM` byte for byte
/// - The date, time or offset is impossible (e.g. February 30th, hour 25, second 60)
/// - The instant lies outside the range of `i64` epoch nanoseconds
///
/// # Example
///
/// ```
/// use shared::timestamp::parse_timestamp;
///
/// let ts = parse_timestamp("2024-01-02 11:00:00 +0100").unwrap();
/// assert_eq!(ts.to_utc().to_rfc3339(), "2024-01-02T10:00:00+00:00");
/// assert_eq!(ts.unix_nanos(), 1_704_189_600_000_000_000);
/// ```
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimestampError> {
    if !matches_layout(input) {
        return Err(TimestampError::Malformed {
            input: input.to_string(),
        });
    }

    let instant = DateTime::parse_from_str(input, TIMESTAMP_FORMAT).map_err(|source| {
        TimestampError::Impossible {
            input: input.to_string(),
            source,
        }
    })?;

    if instant.nanosecond() >= 1_000_000_000 {
        return Err(TimestampError::SecondOutOfRange {
            input: input.to_string(),
        });
    }

    let unix_nanos = instant
        .timestamp_nanos_opt()
        .ok_or_else(|| TimestampError::OutOfRange {
            input: input.to_string(),
        })?;

    Ok(Timestamp {
        instant,
        unix_nanos,
    })
}

fn matches_layout(input: &str) -> bool {
    input.len() == LAYOUT.len()
        && input.bytes().zip(LAYOUT).all(|(b, &expected)| match expected {
            b'd' => b.is_ascii_digit(),
            b's' => b == b'+' || b == b'-',
            literal => b == literal,
        })
}
