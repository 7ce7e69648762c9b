//! Health export data model.
//!
//! Defines the decoded shape of a health data export: an [`Export`] holds
//! [`Metric`]s, each carrying a series of [`Point`]s. Point measurements are
//! sparse, so they are kept in a [`Fields`] map that only ever contains
//! meaningful (non-zero, non-empty) values.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Name of a measurement carried by a point.
///
/// Variants are declared in the fixed schema order, which is also the order
/// fields are encoded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    /// `qty`
    Quantity,
    /// `avg`
    Average,
    /// `min`
    Minimum,
    /// `max`
    Maximum,
    /// `deep`
    Deep,
    /// `core`
    Core,
    /// `awake`
    Awake,
    /// `asleep`
    Asleep,
    /// `sleep_end`
    SleepEnd,
    /// `in_bed_start`
    InBedStart,
    /// `in_bed_end`
    InBedEnd,
    /// `sleep_start`
    SleepStart,
    /// `rem`
    Rem,
    /// `in_bed`
    InBed,
}

impl FieldKey {
    /// All keys in schema order.
    pub const ALL: [Self; 14] = [
        Self::Quantity,
        Self::Average,
        Self::Minimum,
        Self::Maximum,
        Self::Deep,
        Self::Core,
        Self::Awake,
        Self::Asleep,
        Self::SleepEnd,
        Self::InBedStart,
        Self::InBedEnd,
        Self::SleepStart,
        Self::Rem,
        Self::InBed,
    ];

    /// Returns the wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quantity => "qty",
            Self::Average => "avg",
            Self::Minimum => "min",
            Self::Maximum => "max",
            Self::Deep => "deep",
            Self::Core => "core",
            Self::Awake => "awake",
            Self::Asleep => "asleep",
            Self::SleepEnd => "sleep_end",
            Self::InBedStart => "in_bed_start",
            Self::InBedEnd => "in_bed_end",
            Self::SleepStart => "sleep_start",
            Self::Rem => "rem",
            Self::InBed => "in_bed",
        }
    }

    /// Returns true for the sleep-interval boundaries, which are textual.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            Self::SleepEnd | Self::InBedStart | Self::InBedEnd | Self::SleepStart
        )
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single measurement value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Numeric measurement (quantities, averages, sleep stage durations).
    Number(f64),
    /// Textual measurement (sleep interval boundaries).
    Text(String),
}

impl FieldValue {
    /// Returns true if the value is the zero value of its kind.
    #[must_use]
    pub fn is_default(&self) -> bool {
        match self {
            Self::Number(n) => *n == 0.0,
            Self::Text(s) => s.is_empty(),
        }
    }

    /// Returns the numeric value, if any.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the textual value, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// Largest magnitude below which an integral float is written as an integer.
///
/// Above 2^53 not every integer is representable, so those values keep the
/// float encoding (`1e20`). Health measurements never get near it.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Whole numbers keep the shape they arrived in (`72`, not `72.0`).
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Sparse set of measurements.
///
/// Zero numbers and empty strings are never stored, so a key is present
/// exactly when the measurement is meaningful. Iteration follows the schema
/// order of [`FieldKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<FieldKey, FieldValue>);

impl Fields {
    /// Creates an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, dropping it if it is the default of its kind.
    ///
    /// Returns true if the value was stored.
    pub fn insert(&mut self, key: FieldKey, value: impl Into<FieldValue>) -> bool {
        let value = value.into();
        if value.is_default() {
            self.0.remove(&key);
            return false;
        }
        self.0.insert(key, value);
        true
    }

    /// Builder-style variant of [`Fields::insert`].
    #[must_use]
    pub fn with(mut self, key: FieldKey, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: FieldKey) -> Option<&FieldValue> {
        self.0.get(&key)
    }

    /// Returns true if `key` carries a meaningful value.
    #[must_use]
    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    /// Number of meaningful values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no value is meaningful.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the stored values in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Iterates over the present keys in schema order.
    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.0.keys().copied()
    }
}

/// A single measurement instant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPoint")]
pub struct Point {
    /// Timestamp in `YYYY-MM-DD HH:MM:SS ±HHMM` form, unparsed.
    pub date: String,

    /// Device that produced the measurement.
    pub source: Option<String>,

    /// Meaningful measurements.
    pub fields: Fields,
}

impl Point {
    /// Creates a point with no measurements.
    #[must_use]
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            source: None,
            fields: Fields::new(),
        }
    }

    /// Sets the originating device.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        let source = source.into();
        self.source = (!source.is_empty()).then_some(source);
        self
    }

    /// Adds a measurement; default values are dropped.
    #[must_use]
    pub fn with_field(mut self, key: FieldKey, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// Returns true if the point carries no meaningful measurement.
    ///
    /// Neither `source` nor the timestamp count towards this.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Wire shape of a point. Every measurement is optional and `null` counts as
/// absent.
#[derive(Deserialize)]
struct RawPoint {
    date: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    qty: Option<f64>,
    #[serde(default)]
    avg: Option<f64>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    deep: Option<f64>,
    #[serde(default)]
    core: Option<f64>,
    #[serde(default)]
    awake: Option<f64>,
    #[serde(default)]
    asleep: Option<f64>,
    #[serde(default)]
    sleep_end: Option<String>,
    #[serde(default)]
    in_bed_start: Option<String>,
    #[serde(default)]
    in_bed_end: Option<String>,
    #[serde(default)]
    sleep_start: Option<String>,
    #[serde(default)]
    rem: Option<f64>,
    #[serde(default)]
    in_bed: Option<f64>,
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        let numbers = [
            (FieldKey::Quantity, raw.qty),
            (FieldKey::Average, raw.avg),
            (FieldKey::Minimum, raw.min),
            (FieldKey::Maximum, raw.max),
            (FieldKey::Deep, raw.deep),
            (FieldKey::Core, raw.core),
            (FieldKey::Awake, raw.awake),
            (FieldKey::Asleep, raw.asleep),
            (FieldKey::Rem, raw.rem),
            (FieldKey::InBed, raw.in_bed),
        ];
        let texts = [
            (FieldKey::SleepEnd, raw.sleep_end),
            (FieldKey::InBedStart, raw.in_bed_start),
            (FieldKey::InBedEnd, raw.in_bed_end),
            (FieldKey::SleepStart, raw.sleep_start),
        ];

        let mut fields = Fields::new();
        for (key, value) in numbers {
            if let Some(value) = value {
                fields.insert(key, value);
            }
        }
        for (key, value) in texts {
            if let Some(value) = value {
                fields.insert(key, value);
            }
        }

        Self {
            date: raw.date,
            source: raw.source.filter(|s| !s.is_empty()),
            fields,
        }
    }
}

/// A named, unit-tagged series of points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Metric {
    /// Metric name, e.g. `heart_rate`.
    pub name: String,

    /// Unit label, e.g. `count/min`.
    #[serde(rename = "units", default)]
    pub unit: String,

    /// Points in the order they were submitted.
    #[serde(rename = "data", default)]
    pub points: Vec<Point>,
}

impl Metric {
    /// Creates a metric without points.
    #[must_use]
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            points: Vec::new(),
        }
    }

    /// Appends a point.
    #[must_use]
    pub fn with_point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }
}

/// A decoded health data export.
///
/// On the wire the metrics are wrapped as `{"data": {"metrics": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "ExportEnvelope")]
pub struct Export {
    /// Submitted metrics, in submission order.
    pub metrics: Vec<Metric>,
}

impl Export {
    /// Creates an export from metrics.
    #[must_use]
    pub fn new(metrics: Vec<Metric>) -> Self {
        Self { metrics }
    }

    /// Total number of points across all metrics.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.metrics.iter().map(|m| m.points.len()).sum()
    }
}

#[derive(Deserialize)]
struct ExportEnvelope {
    #[serde(default)]
    data: ExportData,
}

#[derive(Default, Deserialize)]
struct ExportData {
    #[serde(default)]
    metrics: Vec<Metric>,
}

impl From<ExportEnvelope> for Export {
    fn from(envelope: ExportEnvelope) -> Self {
        Self {
            metrics: envelope.data.metrics,
        }
    }
}
