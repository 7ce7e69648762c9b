//! Log sink trait and in-memory implementation.

use super::SinkError;
use crate::models::Payload;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// A backend that ingests batches of labelled log streams.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Pushes a whole payload in a single call.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the payload or cannot be
    /// reached.
    async fn push(&self, payload: &Payload) -> Result<(), SinkError>;
}

/// In-memory log sink.
///
/// Keeps every pushed payload in a `Vec` protected by a `RwLock`. Clones share
/// the same storage, which makes it handy for development and tests.
///
/// # Example
///
/// ```
/// use shared::models::{Payload, Stream};
/// use shared::sinks::{InMemoryLogSink, LogSink};
///
/// # tokio_test::block_on(async {
/// let sink = InMemoryLogSink::new();
/// let payload = Payload { streams: vec![Stream::for_metric("steps", "count")] };
///
/// sink.push(&payload).await.unwrap();
/// assert_eq!(sink.payloads(), vec![payload]);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryLogSink {
    payloads: Arc<RwLock<Vec<Payload>>>,
}

impl InMemoryLogSink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every payload pushed so far, oldest first.
    #[must_use]
    pub fn payloads(&self) -> Vec<Payload> {
        self.payloads
            .read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Number of push calls received.
    #[must_use]
    pub fn push_count(&self) -> usize {
        self.payloads.read().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LogSink for InMemoryLogSink {
    async fn push(&self, payload: &Payload) -> Result<(), SinkError> {
        let mut payloads = self.payloads.write().map_err(|_| SinkError::LockError)?;
        payloads.push(payload.clone());
        Ok(())
    }
}
