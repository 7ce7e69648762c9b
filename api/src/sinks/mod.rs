//! HTTP clients for the sink backends.
//!
//! Each client implements one of the sink traits from [`shared::sinks`], so
//! the pipeline never sees transport details.

mod dump;
mod influx;
mod loki;

pub use dump::DumpingLogSink;
pub use influx::InfluxClient;
pub use loki::LokiClient;
