//! Data models for the Pulsegate ingestion pipeline.
//!
//! This module contains the decoded export structures and the record shapes
//! handed to the log and metrics sinks.

pub mod export;
pub mod loki;
pub mod record;

pub use export::{Export, FieldKey, FieldValue, Fields, Metric, Point};
pub use loki::{Payload, Stream};
pub use record::WriteRecord;
