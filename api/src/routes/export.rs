//! Health export ingestion endpoint.
//!
//! `POST /apple` accepts an export in the shape produced by health export apps:
//!
//! ```json
//! {"data": {"metrics": [{"name": "heart_rate", "units": "count/min",
//!                        "data": [{"date": "2024-01-02 10:00:00 +0000", "avg": 64}]}]}}
//! ```
//!
//! The export is forwarded to the configured destination. Responses:
//! - `200` with an empty body on success
//! - `400` with `{"message": ...}` when the export is malformed
//! - `500` with a generic `{"message": ...}` when forwarding fails

use crate::state::{AppState, Destination};
use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use shared::processor::{decode_export, forward_logs, forward_metrics, ProcessError};

/// Message returned for server-side failures.
const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub message: String,
}

/// Creates the export ingestion routes.
pub fn export_routes(state: AppState) -> Router {
    Router::new()
        .route("/apple", post(ingest_export))
        .with_state(state)
}

/// Handler for export ingestion.
async fn ingest_export(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let export = decode_export(&body).map_err(reject)?;

    let metrics = export.metrics.len();
    let points = export.point_count();
    let destination = state.destination();

    let summary = match destination {
        Destination::Logs(sink) => forward_logs(export, sink.as_ref()).await,
        Destination::Metrics(sink) => forward_metrics(export, sink.as_ref()).await,
    }
    .map_err(reject)?;

    tracing::info!(
        destination = destination.name(),
        metrics,
        points,
        forwarded = summary.forwarded,
        skipped = summary.skipped,
        "Received health export"
    );

    Ok(StatusCode::OK)
}

/// Maps a pipeline error to a response.
///
/// Client faults echo the error message; server faults hide it.
fn reject(err: ProcessError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_client_fault() {
        tracing::warn!(error = %err, "Rejected health export");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: err.to_string(),
            }),
        )
    } else {
        tracing::error!(error = %err, "Failed to process health export");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                message: INTERNAL_ERROR_MESSAGE.to_string(),
            }),
        )
    }
}
