//! Pulsegate Shared Library
//!
//! This crate contains the health export data model and the transformation
//! pipeline that turns an export into log streams or time-series writes.
//!
//! # Modules
//!
//! - [`models`] - Export, point and sink record data models
//! - [`timestamp`] - Parsing of the fixed point timestamp layout
//! - [`ordering`] - Chronological ordering of a metric's points
//! - [`mapping`] - Mapping of points into sink records
//! - [`influx`] - InfluxDB line protocol encoding
//! - [`sinks`] - Sink traits and in-memory implementations
//! - [`processor`] - The decode / transform / forward pipeline
//!
//! # Example
//!
//! ```
//! use shared::processor::{build_log_payload, decode_export};
//!
//! let body = br#"{"data":{"metrics":[{"name":"HeartRate","units":"bpm",
//!     "data":[{"date":"2024-01-02 10:00:00 +0000","qty":72}]}]}}"#;
//!
//! let export = decode_export(body).unwrap();
//! let payload = build_log_payload(export).unwrap();
//!
//! assert_eq!(payload.streams.len(), 1);
//! assert_eq!(payload.streams[0].values[0][0], "1704189600000000000");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod influx;
pub mod mapping;
pub mod models;
pub mod ordering;
pub mod processor;
pub mod sinks;
pub mod timestamp;

/// Re-export common dependencies for convenience.
pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
