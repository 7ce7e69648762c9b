//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::config::{Config, SinkKind, DEFAULT_BODY_LIMIT};
use crate::sinks::{DumpingLogSink, InfluxClient, LokiClient};
use anyhow::{Context, Result};
use shared::sinks::{InMemoryMetricsSink, LogSink, MetricsSink};
use std::sync::Arc;

/// Where ingested exports are forwarded.
#[derive(Clone)]
pub enum Destination {
    /// Grouped log streams, pushed once per request.
    Logs(Arc<dyn LogSink>),
    /// Individual time-series writes, one per non-empty point.
    Metrics(Arc<dyn MetricsSink>),
}

impl Destination {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Logs(_) => "logs",
            Self::Metrics(_) => "metrics",
        }
    }
}

/// Application state shared across all request handlers.
///
/// Holds the configured sink and the request body limit. The sinks are
/// shared by every in-flight request.
#[derive(Clone)]
pub struct AppState {
    /// The sink receiving ingested exports.
    destination: Destination,
    /// Maximum accepted request body size in bytes.
    body_limit: usize,
}

impl AppState {
    /// Creates a new application state forwarding to `destination`.
    #[must_use]
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Creates a state forwarding to a log sink.
    #[must_use]
    pub fn with_log_sink(sink: Arc<dyn LogSink>) -> Self {
        Self::new(Destination::Logs(sink))
    }

    /// Creates a state forwarding to a metrics sink.
    #[must_use]
    pub fn with_metrics_sink(sink: Arc<dyn MetricsSink>) -> Self {
        Self::new(Destination::Metrics(sink))
    }

    /// Creates a new application state with an in-memory metrics sink.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_sink() -> Self {
        Self::with_metrics_sink(Arc::new(InMemoryMetricsSink::new()))
    }

    /// Builds the state described by `config`, creating the HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.sink_timeout)
            .build()
            .context("Failed to build sink HTTP client")?;

        let destination = match config.sink {
            SinkKind::Loki => {
                let loki: Arc<dyn LogSink> = Arc::new(LokiClient::new(http, &config.loki_url));
                let sink: Arc<dyn LogSink> = match &config.dump_path {
                    Some(path) => {
                        tracing::info!(path = %path.display(), "Dumping Loki payloads to file");
                        Arc::new(DumpingLogSink::new(loki, path.clone()))
                    }
                    None => loki,
                };
                Destination::Logs(sink)
            }
            SinkKind::Influx => {
                Destination::Metrics(Arc::new(InfluxClient::new(http, &config.influx)))
            }
            SinkKind::Memory => Destination::Metrics(Arc::new(InMemoryMetricsSink::new())),
        };

        Ok(Self::new(destination).with_body_limit(config.body_limit))
    }

    /// Overrides the request body limit.
    #[must_use]
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Returns the configured destination.
    #[must_use]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Returns the request body limit in bytes.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_sink()
    }
}
