//! InfluxDB v2 line protocol encoding of write records.
//!
//! Line protocol format:
//! ```text
//! measurement,tag1=val1 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! A record becomes one line: the metric name is the measurement, the unit is
//! the `unit` tag and every meaningful measurement is a field.
//!
//! See: <https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>

use crate::models::{FieldValue, WriteRecord};
use thiserror::Error;

/// Tag carrying the metric unit.
pub const UNIT_TAG: &str = "unit";

/// Errors that can occur while encoding a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineProtocolError {
    /// InfluxDB requires at least one field per point.
    #[error("record {measurement:?} has no fields to write")]
    NoFields {
        /// Measurement of the rejected record.
        measurement: String,
    },

    /// The measurement name is empty.
    #[error("record has an empty measurement name")]
    EmptyMeasurement,

    /// The timestamp does not fit in epoch nanoseconds.
    #[error("record {measurement:?} has a timestamp outside the nanosecond range")]
    TimestampOutOfRange {
        /// Measurement of the rejected record.
        measurement: String,
    },
}

/// Formats a field value.
///
/// - Numbers are written as floats (e.g., `72`, `1.25`)
/// - Text is quoted, inner quotes and backslashes escaped (e.g., `"a \"b\""`)
fn field_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Number(v) => format!("{v}"),
        FieldValue::Text(v) => {
            let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        }
    }
}

/// Encodes a record as a single line.
///
/// An empty unit drops the `unit` tag, since InfluxDB rejects empty tag
/// values.
///
/// # Errors
///
/// Returns an error if the record has no fields, no measurement name, or a
/// timestamp outside the epoch-nanosecond range.
///
/// # Example
///
/// ```
/// use shared::influx::to_line_protocol;
/// use shared::models::{FieldKey, Fields, WriteRecord};
/// use chrono::{TimeZone, Utc};
///
/// let record = WriteRecord {
///     name: "HeartRate".to_string(),
///     unit: "bpm".to_string(),
///     timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
///     data: Fields::new().with(FieldKey::Quantity, 72.0),
/// };
///
/// assert_eq!(
///     to_line_protocol(&record).unwrap(),
///     "HeartRate,unit=bpm qty=72 1704189600000000000"
/// );
/// ```
pub fn to_line_protocol(record: &WriteRecord) -> Result<String, LineProtocolError> {
    if record.name.is_empty() {
        return Err(LineProtocolError::EmptyMeasurement);
    }
    if record.data.is_empty() {
        return Err(LineProtocolError::NoFields {
            measurement: record.name.clone(),
        });
    }
    let timestamp_ns =
        record
            .timestamp
            .timestamp_nanos_opt()
            .ok_or_else(|| LineProtocolError::TimestampOutOfRange {
                measurement: record.name.clone(),
            })?;

    let mut line = escape_measurement(&record.name);

    if !record.unit.is_empty() {
        line.push(',');
        line.push_str(UNIT_TAG);
        line.push('=');
        line.push_str(&escape_key(&record.unit));
    }

    line.push(' ');

    for (i, (key, value)) in record.data.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key.as_str()));
        line.push('=');
        line.push_str(&field_value(value));
    }

    line.push(' ');
    line.push_str(&timestamp_ns.to_string());

    Ok(line)
}

/// Escape measurement name: spaces and commas.
fn escape_measurement(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace(' ', "\\ ")
}

/// Escape tag keys, tag values and field keys: commas, equals signs and spaces.
fn escape_key(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
