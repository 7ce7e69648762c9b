//! Log-sink payload model.
//!
//! Mirrors the JSON body of the Loki push API:
//!
//! ```json
//! {"streams": [{"stream": {"metric": "heart_rate", "units": "count/min"},
//!               "values": [["1704189600000000000", "{\"name\":...}"]]}]}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label naming the metric of a stream.
pub const METRIC_LABEL: &str = "metric";

/// Label naming the unit of a stream.
pub const UNITS_LABEL: &str = "units";

/// A set of timestamped lines sharing one label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Stream labels.
    #[serde(rename = "stream")]
    pub labels: BTreeMap<String, String>,

    /// `[epoch nanoseconds, line]` pairs, in push order.
    pub values: Vec<[String; 2]>,
}

impl Stream {
    /// Creates an empty stream labelled with a metric name and unit.
    #[must_use]
    pub fn for_metric(name: &str, unit: &str) -> Self {
        let labels = BTreeMap::from([
            (METRIC_LABEL.to_string(), name.to_string()),
            (UNITS_LABEL.to_string(), unit.to_string()),
        ]);
        Self {
            labels,
            values: Vec::new(),
        }
    }

    /// Appends a line stamped with `unix_nanos`.
    pub fn push(&mut self, unix_nanos: i64, line: String) {
        self.values.push([unix_nanos.to_string(), line]);
    }

    /// Number of lines in the stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the stream has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The full request body handed to the log sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// One stream per metric.
    pub streams: Vec<Stream>,
}

impl Payload {
    /// Total number of lines across all streams.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.streams.iter().map(Stream::len).sum()
    }
}
