//! Diagnostic payload dump.

use async_trait::async_trait;
use shared::models::Payload;
use shared::sinks::{LogSink, SinkError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Log sink decorator that writes each payload to a file before delegating.
///
/// The file is overwritten on every push, so it always holds the latest
/// payload. Failing to write it is logged and never fails the push.
pub struct DumpingLogSink {
    inner: Arc<dyn LogSink>,
    path: PathBuf,
}

impl DumpingLogSink {
    /// Wraps `inner`, dumping payloads to `path`.
    #[must_use]
    pub fn new(inner: Arc<dyn LogSink>, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    /// Returns the dump file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn dump(&self, payload: &Payload) {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize payload for dump");
                return;
            }
        };

        if let Err(e) = tokio::fs::write(&self.path, bytes).await {
            tracing::warn!(error = %e, path = %self.path.display(), "Failed to write payload dump");
        }
    }
}

#[async_trait]
impl LogSink for DumpingLogSink {
    async fn push(&self, payload: &Payload) -> Result<(), SinkError> {
        self.dump(payload).await;
        self.inner.push(payload).await
    }
}
