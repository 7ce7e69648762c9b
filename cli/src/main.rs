//! Pulsegate CLI
//!
//! Command-line interface for the Pulsegate health export forwarder.
//!
//! # Usage
//!
//! ```bash
//! pulsegate --help
//! pulsegate health
//! pulsegate push export.json
//! pulsegate convert export.json --format influx
//! ```

#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use shared::influx::to_line_protocol;
use shared::processor::{build_log_payload, build_write_records, decode_export};
use std::path::{Path, PathBuf};

/// Pulsegate CLI - health export forwarder command-line interface
#[derive(Debug, Parser)]
#[command(name = "pulsegate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "PULSEGATE_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check API server health
    Health,
    /// Send an export file to the API server
    Push {
        /// Path to the export JSON file
        file: PathBuf,
    },
    /// Print what an export file turns into, without sending anything
    Convert {
        /// Path to the export JSON file
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Influx)]
        format: Format,
    },
}

/// Sink encoding produced by `convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Loki push API JSON body
    Loki,
    /// `InfluxDB` line protocol, one line per record
    Influx,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    destination: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Some(Commands::Health) => {
            let health = health(&client, &cli.api_url).await?;
            println!(
                "{} {} v{} is {} (forwarding to {})",
                cli.api_url, health.service, health.version, health.status, health.destination
            );
        }
        Some(Commands::Push { file }) => {
            push(&client, &cli.api_url, &file).await?;
            println!("Pushed {}", file.display());
        }
        Some(Commands::Convert { file, format }) => {
            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", convert(&body, format)?);
        }
        None => {
            println!("Pulsegate CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

async fn health(client: &reqwest::Client, api_url: &str) -> Result<HealthResponse> {
    let url = format!("{}/health", api_url.trim_end_matches('/'));
    tracing::debug!(%url, "Checking health");

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;

    if !response.status().is_success() {
        bail!("Health check failed with status {}", response.status());
    }

    response
        .json()
        .await
        .context("Failed to decode health response")
}

async fn push(client: &reqwest::Client, api_url: &str, file: &Path) -> Result<()> {
    let body = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let url = format!("{}/apple", api_url.trim_end_matches('/'));
    tracing::debug!(%url, bytes = body.len(), "Pushing export");

    let response = client
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .with_context(|| format!("Failed to reach {url}"))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.message)
        .unwrap_or(text);
    bail!("Server rejected export with status {status}: {message}")
}

/// Converts an export into the body a sink would receive.
fn convert(body: &[u8], format: Format) -> Result<String> {
    let export = decode_export(body)?;

    match format {
        Format::Loki => {
            let payload = build_log_payload(export)?;
            serde_json::to_string_pretty(&payload).context("Failed to encode Loki payload")
        }
        Format::Influx => {
            let (records, skipped) = build_write_records(&export)?;
            tracing::debug!(records = records.len(), skipped, "Converted export");

            let lines = records
                .iter()
                .map(to_line_protocol)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        }
    }
}
