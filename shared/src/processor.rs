//! Export processing pipeline.
//!
//! Drives a decoded [`Export`] through ordering, emptiness filtering and
//! record mapping, then hands the result to a sink:
//!
//! ```text
//! bytes ─decode─▶ Export ─transform─▶ Payload | Vec<WriteRecord> ─forward─▶ sink
//! ```
//!
//! Every stage short-circuits on the first error. Client faults (bad JSON,
//! bad timestamps) are always detected before anything is forwarded.

use crate::mapping::{log_line, write_record};
use crate::models::{Export, Payload, Stream, WriteRecord};
use crate::ordering::order_chronologically;
use crate::sinks::{LogSink, MetricsSink, SinkError};
use crate::timestamp::{parse_timestamp, TimestampError};
use thiserror::Error;

/// Errors that can occur while processing an export.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The request body is not a valid export.
    #[error("invalid request: {0}")]
    Decode(#[source] serde_json::Error),

    /// A point timestamp could not be parsed.
    #[error("invalid timestamp in metric {metric:?}: {source}")]
    InvalidTimestamp {
        /// Metric holding the offending point.
        metric: String,
        /// Parse failure, carrying the offending input.
        #[source]
        source: TimestampError,
    },

    /// A metric with measurements has no name to write them under.
    #[error("invalid metric: name must not be empty")]
    EmptyMetricName,

    /// A well-formed point could not be encoded.
    #[error("invalid data in metric {metric:?} at {date:?}: {source}")]
    Mapping {
        /// Metric holding the offending point.
        metric: String,
        /// Date of the offending point.
        date: String,
        /// Encoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// The sink rejected the data or could not be reached.
    #[error("forwarding to sink failed: {0}")]
    Sink(#[from] SinkError),
}

impl ProcessError {
    /// Returns true if the caller is at fault.
    ///
    /// Decode, metric name and timestamp failures come from the submitted
    /// data. Mapping
    /// failures are internal encoding problems and sink failures are backend
    /// problems, so both are server faults.
    #[must_use]
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::EmptyMetricName | Self::InvalidTimestamp { .. }
        )
    }
}

/// What a successful forward handed to the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardSummary {
    /// Metrics in the export.
    pub metrics: usize,
    /// Lines or records forwarded.
    pub forwarded: usize,
    /// Empty points that were skipped.
    pub skipped: usize,
}

/// Decodes a request body into an [`Export`].
///
/// # Errors
///
/// Returns [`ProcessError::Decode`] if the body is not valid JSON or does not
/// match the export shape.
pub fn decode_export(body: &[u8]) -> Result<Export, ProcessError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to decode health export");
        ProcessError::Decode(e)
    })
}

/// Builds the log-sink payload: one stream per metric, lines in chronological
/// order.
///
/// Empty points are kept; they become lines carrying only the labels.
///
/// # Errors
///
/// Returns the first timestamp or mapping failure. No partial payload is
/// produced.
pub fn build_log_payload(export: Export) -> Result<Payload, ProcessError> {
    let mut streams = Vec::with_capacity(export.metrics.len());

    for metric in export.metrics {
        let ordered = order_chronologically(metric.points).map_err(|source| {
            tracing::warn!(
                metric = %metric.name,
                date = %source.input(),
                error = %source,
                "Failed to parse point timestamp"
            );
            invalid_timestamp(&metric.name, source)
        })?;

        let mut stream = Stream::for_metric(&metric.name, &metric.unit);
        for timed in ordered {
            let line = log_line(&metric.name, &metric.unit, &timed.point).map_err(|source| {
                tracing::error!(
                    metric = %metric.name,
                    date = %timed.point.date,
                    error = %source,
                    "Failed to encode log line"
                );
                ProcessError::Mapping {
                    metric: metric.name.clone(),
                    date: timed.point.date.clone(),
                    source,
                }
            })?;
            stream.push(timed.timestamp.unix_nanos(), line);
        }

        streams.push(stream);
    }

    Ok(Payload { streams })
}

/// Builds the metrics-sink records, skipping empty points.
///
/// Records keep submission order; no sorting is applied. Empty points are
/// skipped before their timestamp is looked at.
///
/// # Errors
///
/// Returns [`ProcessError::EmptyMetricName`] if a metric without a name has
/// a non-empty point, or the first timestamp failure among non-empty points.
pub fn build_write_records(export: &Export) -> Result<(Vec<WriteRecord>, usize), ProcessError> {
    let mut records = Vec::with_capacity(export.point_count());
    let mut skipped = 0;

    for metric in &export.metrics {
        for point in &metric.points {
            if point.is_empty() {
                tracing::trace!(metric = %metric.name, date = %point.date, "Skipping empty point");
                skipped += 1;
                continue;
            }

            // The name becomes the measurement, which cannot be empty.
            if metric.name.is_empty() {
                tracing::warn!(date = %point.date, "Metric with measurements has no name");
                return Err(ProcessError::EmptyMetricName);
            }

            let timestamp = parse_timestamp(&point.date).map_err(|source| {
                tracing::warn!(
                    metric = %metric.name,
                    date = %point.date,
                    error = %source,
                    "Failed to parse point timestamp"
                );
                invalid_timestamp(&metric.name, source)
            })?;

            records.push(write_record(&metric.name, &metric.unit, timestamp, point));
        }
    }

    Ok((records, skipped))
}

fn invalid_timestamp(metric: &str, source: TimestampError) -> ProcessError {
    ProcessError::InvalidTimestamp {
        metric: metric.to_string(),
        source,
    }
}

/// Transforms an export and pushes it to a log sink in a single call.
///
/// # Errors
///
/// Returns a transform error (nothing is pushed) or the sink's error.
pub async fn forward_logs(
    export: Export,
    sink: &dyn LogSink,
) -> Result<ForwardSummary, ProcessError> {
    let metrics = export.metrics.len();
    let payload = build_log_payload(export)?;
    let forwarded = payload.line_count();

    sink.push(&payload).await.map_err(|e| {
        tracing::error!(
            error = %e,
            streams = payload.streams.len(),
            "Failed to push log payload"
        );
        ProcessError::Sink(e)
    })?;

    tracing::debug!(metrics, lines = forwarded, "Pushed log payload");

    Ok(ForwardSummary {
        metrics,
        forwarded,
        skipped: 0,
    })
}

/// Transforms an export and writes each record to a metrics sink.
///
/// The whole export is transformed first, so a bad timestamp forwards nothing.
/// Records are then written one call at a time in submission order. A write
/// failure stops the loop; records already written stay written.
///
/// # Errors
///
/// Returns a transform error or the first sink error.
pub async fn forward_metrics(
    export: Export,
    sink: &dyn MetricsSink,
) -> Result<ForwardSummary, ProcessError> {
    let (records, skipped) = build_write_records(&export)?;

    for (written, record) in records.iter().enumerate() {
        sink.write(record).await.map_err(|e| {
            tracing::error!(
                metric = %record.name,
                timestamp = %record.timestamp,
                written,
                remaining = records.len() - written,
                error = %e,
                "Failed to write metric record"
            );
            ProcessError::Sink(e)
        })?;
    }

    tracing::debug!(
        metrics = export.metrics.len(),
        records = records.len(),
        skipped,
        "Wrote metric records"
    );

    Ok(ForwardSummary {
        metrics: export.metrics.len(),
        forwarded: records.len(),
        skipped,
    })
}
