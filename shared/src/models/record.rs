//! Metrics-sink write record.

use super::export::Fields;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One time-series point handed to the metrics sink.
///
/// `name` and `unit` are metadata: they become the measurement and its `unit`
/// tag, not fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteRecord {
    /// Metric name.
    pub name: String,
    /// Unit label.
    pub unit: String,
    /// Instant of the measurement.
    pub timestamp: DateTime<Utc>,
    /// Meaningful measurements.
    pub data: Fields,
}
