//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default maximum request body size (16 MiB). Health exports covering long
/// periods get large.
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// The sink name is not one of the supported backends.
    #[error("unknown sink {0:?}, expected one of: loki, influx, memory")]
    UnknownSink(String),

    /// Host and port do not form a socket address.
    #[error("invalid listen address {addr}")]
    InvalidAddress {
        /// The rejected `host:port` string.
        addr: String,
        /// Underlying parse failure.
        #[source]
        source: AddrParseError,
    },
}

/// Which backend the ingestion endpoint forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Grafana Loki push API.
    Loki,
    /// `InfluxDB` v2 write API.
    Influx,
    /// In-process memory, for development.
    Memory,
}

impl FromStr for SinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loki" => Ok(Self::Loki),
            "influx" | "influxdb" => Ok(Self::Influx),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownSink(s.to_string())),
        }
    }
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loki => write!(f, "loki"),
            Self::Influx => write!(f, "influx"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// `InfluxDB` connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxConfig {
    /// Base URL of the `InfluxDB` server.
    pub url: String,
    /// API token.
    pub token: String,
    /// Organisation owning the bucket.
    pub org: String,
    /// Bucket to write into.
    pub bucket: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            token: "secret".to_string(),
            org: "pulsegate".to_string(),
            bucket: "apple".to_string(),
        }
    }
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `PULSEGATE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `PULSEGATE_PORT`: The port to listen on (default: 8080)
/// - `PULSEGATE_SINK`: `loki`, `influx` or `memory` (default: "influx")
/// - `PULSEGATE_LOKI_URL`: Loki push endpoint
/// - `PULSEGATE_INFLUX_URL`, `PULSEGATE_INFLUX_TOKEN`, `PULSEGATE_INFLUX_ORG`,
///   `PULSEGATE_INFLUX_BUCKET`: `InfluxDB` connection settings
/// - `PULSEGATE_SINK_TIMEOUT_SECS`: Timeout for sink requests (default: 10)
/// - `PULSEGATE_BODY_LIMIT_BYTES`: Maximum request body size (default: 16 MiB)
/// - `PULSEGATE_DUMP_PATH`: If set, Loki payloads are also written to this file
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Backend receiving ingested exports.
    pub sink: SinkKind,
    /// Loki push endpoint.
    pub loki_url: String,
    /// `InfluxDB` connection settings.
    pub influx: InfluxConfig,
    /// Timeout applied to every sink request.
    pub sink_timeout: Duration,
    /// Maximum accepted request body size in bytes.
    pub body_limit: usize,
    /// Optional file receiving a copy of every Loki payload.
    pub dump_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        let port = parse_var(&lookup, "PULSEGATE_PORT")?.unwrap_or(defaults.port);
        let sink = parse_var(&lookup, "PULSEGATE_SINK")?.unwrap_or(defaults.sink);
        let sink_timeout = parse_var::<u64>(&lookup, "PULSEGATE_SINK_TIMEOUT_SECS")?
            .map_or(defaults.sink_timeout, Duration::from_secs);
        let body_limit =
            parse_var(&lookup, "PULSEGATE_BODY_LIMIT_BYTES")?.unwrap_or(defaults.body_limit);

        Ok(Self {
            host: string("PULSEGATE_HOST", defaults.host),
            port,
            sink,
            loki_url: string("PULSEGATE_LOKI_URL", defaults.loki_url),
            influx: InfluxConfig {
                url: string("PULSEGATE_INFLUX_URL", defaults.influx.url),
                token: string("PULSEGATE_INFLUX_TOKEN", defaults.influx.token),
                org: string("PULSEGATE_INFLUX_ORG", defaults.influx.org),
                bucket: string("PULSEGATE_INFLUX_BUCKET", defaults.influx.bucket),
            },
            sink_timeout,
            body_limit,
            dump_path: lookup("PULSEGATE_DUMP_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddress { addr, source })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            sink: SinkKind::Influx,
            loki_url: "http://localhost:3100/loki/api/v1/push".to_string(),
            influx: InfluxConfig::default(),
            sink_timeout: Duration::from_secs(10),
            body_limit: DEFAULT_BODY_LIMIT,
            dump_path: None,
        }
    }
}
