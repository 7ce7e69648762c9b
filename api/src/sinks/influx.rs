//! `InfluxDB` v2 write API client.

use crate::config::InfluxConfig;
use async_trait::async_trait;
use reqwest::{header, Client};
use shared::influx::to_line_protocol;
use shared::models::WriteRecord;
use shared::sinks::{MetricsSink, SinkError};

/// Writes records to `InfluxDB`, one line-protocol request per record.
#[derive(Debug, Clone)]
pub struct InfluxClient {
    client: Client,
    write_url: String,
    token: String,
    org: String,
    bucket: String,
}

impl InfluxClient {
    /// Creates a client for the configured server, organisation and bucket.
    #[must_use]
    pub fn new(client: Client, config: &InfluxConfig) -> Self {
        Self {
            client,
            write_url: format!("{}/api/v2/write", config.url.trim_end_matches('/')),
            token: config.token.clone(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
        }
    }

    /// Returns the write endpoint, without query parameters.
    #[must_use]
    pub fn write_url(&self) -> &str {
        &self.write_url
    }
}

#[async_trait]
impl MetricsSink for InfluxClient {
    async fn write(&self, record: &WriteRecord) -> Result<(), SinkError> {
        let line = to_line_protocol(record).map_err(|e| SinkError::Encoding(e.to_string()))?;

        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(header::AUTHORIZATION, format!("Token {}", self.token))
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await
            .map_err(|e| SinkError::Transport(format!("writing point to InfluxDB: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, measurement = %record.name, "InfluxDB rejected write");
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::trace!(measurement = %record.name, "Wrote point to InfluxDB");
        Ok(())
    }
}
