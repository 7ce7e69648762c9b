//! Mapping of (metric, point) pairs into sink records.
//!
//! Both sinks carry the same sparse field set: a measurement appears in the
//! output exactly when it was meaningful in the input.

use crate::models::{Fields, Point, WriteRecord};
use crate::timestamp::Timestamp;
use serde::Serialize;

/// JSON line stored in the log sink.
///
/// `name` and `units` lead, measurements follow in schema order.
#[derive(Serialize)]
struct LogLine<'a> {
    name: &'a str,
    units: &'a str,
    #[serde(flatten)]
    fields: &'a Fields,
}

/// Encodes a point as a JSON log line.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
///
/// # Example
///
/// ```
/// use shared::mapping::log_line;
/// use shared::models::{FieldKey, Point};
///
/// let point = Point::new("2024-01-02 10:00:00 +0000").with_field(FieldKey::Quantity, 72.0);
/// let line = log_line("heart_rate", "count/min", &point).unwrap();
/// assert_eq!(line, r#"{"name":"heart_rate","units":"count/min","qty":72}"#);
/// ```
pub fn log_line(name: &str, unit: &str, point: &Point) -> Result<String, serde_json::Error> {
    serde_json::to_string(&LogLine {
        name,
        units: unit,
        fields: &point.fields,
    })
}

/// Builds the metrics-sink record for a point.
#[must_use]
pub fn write_record(name: &str, unit: &str, timestamp: Timestamp, point: &Point) -> WriteRecord {
    WriteRecord {
        name: name.to_string(),
        unit: unit.to_string(),
        timestamp: timestamp.to_utc(),
        data: point.fields.clone(),
    }
}
