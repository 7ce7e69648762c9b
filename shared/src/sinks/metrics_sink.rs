//! Metrics sink trait and in-memory implementation.

use super::SinkError;
use crate::models::WriteRecord;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// A backend that ingests individual time-series points.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Writes one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write or cannot be
    /// reached.
    async fn write(&self, record: &WriteRecord) -> Result<(), SinkError>;
}

/// In-memory metrics sink.
///
/// Keeps every written record in write order. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricsSink {
    records: Arc<RwLock<Vec<WriteRecord>>>,
}

impl InMemoryMetricsSink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every record written so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<WriteRecord> {
        self.records
            .read()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of write calls received.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl MetricsSink for InMemoryMetricsSink {
    async fn write(&self, record: &WriteRecord) -> Result<(), SinkError> {
        let mut records = self.records.write().map_err(|_| SinkError::LockError)?;
        records.push(record.clone());
        Ok(())
    }
}
