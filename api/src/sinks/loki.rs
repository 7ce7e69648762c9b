//! Loki push API client.

use async_trait::async_trait;
use reqwest::Client;
use shared::models::Payload;
use shared::sinks::{LogSink, SinkError};

/// Pushes log payloads to a Loki `/loki/api/v1/push` endpoint.
#[derive(Debug, Clone)]
pub struct LokiClient {
    client: Client,
    push_url: String,
}

impl LokiClient {
    /// Creates a client posting to `push_url`.
    #[must_use]
    pub fn new(client: Client, push_url: impl Into<String>) -> Self {
        Self {
            client,
            push_url: push_url.into(),
        }
    }

    /// Returns the push endpoint.
    #[must_use]
    pub fn push_url(&self) -> &str {
        &self.push_url
    }
}

#[async_trait]
impl LogSink for LokiClient {
    async fn push(&self, payload: &Payload) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.push_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SinkError::Transport(format!("pushing logs to Loki: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "Loki rejected push");
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            streams = payload.streams.len(),
            lines = payload.line_count(),
            status = status.as_u16(),
            "Pushed logs to Loki"
        );
        Ok(())
    }
}
