//! Sink contracts and in-memory implementations.
//!
//! The pipeline hands its output to one of two collaborators: a [`LogSink`]
//! that receives a whole batch of streams in one call, or a [`MetricsSink`]
//! that receives one write per record. Implementations must be safe to share
//! between concurrent requests.

pub mod log_sink;
pub mod metrics_sink;

pub use log_sink::{InMemoryLogSink, LogSink};
pub use metrics_sink::{InMemoryMetricsSink, MetricsSink};

use thiserror::Error;

/// Errors reported by a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The backend could not be reached or the exchange broke off.
    #[error("sink transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("sink rejected request with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The payload could not be encoded for the backend.
    #[error("failed to encode sink payload: {0}")]
    Encoding(String),

    /// Failed to acquire lock on an in-memory sink.
    #[error("Failed to acquire lock on sink")]
    LockError,
}
