//! Integration tests for rejected exports.
//!
//! Tests cover:
//! - Malformed bodies
//! - Invalid timestamps, with nothing forwarded
//! - Sink failures
//! - Body size limit

use api::{create_router, AppState, ErrorResponse};
use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use shared::models::WriteRecord;
use shared::sinks::{InMemoryMetricsSink, MetricsSink, SinkError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::common::{log_app, metrics_app, post_export, post_json, HEART_RATE};

/// Accepts `limit` writes, then reports the backend as unreachable.
struct FlakyMetricsSink {
    inner: InMemoryMetricsSink,
    limit: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl MetricsSink for FlakyMetricsSink {
    async fn write(&self, record: &WriteRecord) -> Result<(), SinkError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.limit {
            return Err(SinkError::Transport("connection reset".to_string()));
        }
        self.inner.write(record).await
    }
}

#[tokio::test]
async fn test_invalid_json_is_400() {
    let (app, sink) = log_app();

    let (status, body) = post_export(app, "{ invalid json }").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(!error.message.is_empty());
    assert_eq!(sink.push_count(), 0);
}

#[tokio::test]
async fn test_metric_without_name_is_400() {
    let (app, sink) = metrics_app();

    let export = json!({"data": {"metrics": [{"units": "bpm", "data": []}]}});

    let (status, response) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().contains("name"));
    assert_eq!(sink.write_count(), 0);
}

#[tokio::test]
async fn test_unnamed_metric_is_400_on_metrics_path() {
    let (app, sink) = metrics_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "",
                "units": "bpm",
                "data": [{"date": "2024-01-02 10:00:00 +0000", "qty": 72}]
            }]
        }
    });

    let (status, response) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().contains("name must not be empty"));
    assert_eq!(sink.write_count(), 0);
}

#[tokio::test]
async fn test_bad_timestamp_forwards_nothing_to_logs() {
    let (app, sink) = log_app();

    let export = json!({
        "data": {
            "metrics": [
                {"name": "steps", "units": "count", "data": [
                    {"date": "2024-01-02 10:00:00 +0000", "qty": 10}
                ]},
                {"name": "HeartRate", "units": "bpm", "data": [
                    {"date": "2024-01-02T10:00:00Z", "qty": 72}
                ]}
            ]
        }
    });

    let (status, response) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let message = response["message"].as_str().unwrap();
    assert!(message.contains("HeartRate"));
    assert!(message.contains("2024-01-02T10:00:00Z"));
    assert_eq!(sink.push_count(), 0);
}

#[tokio::test]
async fn test_bad_timestamp_forwards_nothing_to_metrics() {
    let (app, sink) = metrics_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [
                    {"date": "2024-01-02 10:00:00 +0000", "qty": 72},
                    {"date": "2024-02-30 10:00:00 +0000", "qty": 75}
                ]
            }]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(sink.write_count(), 0);
}

#[tokio::test]
async fn test_second_sixty_is_400() {
    let (app, sink) = log_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [{"date": "2024-01-02 10:00:60 +0000", "qty": 72}]
            }]
        }
    });

    let (status, response) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].as_str().unwrap().contains("second out of range"));
    assert_eq!(sink.push_count(), 0);
}

#[tokio::test]
async fn test_sink_failure_is_500_and_keeps_earlier_writes() {
    let inner = InMemoryMetricsSink::new();
    let sink = FlakyMetricsSink {
        inner: inner.clone(),
        limit: 1,
        calls: AtomicUsize::new(0),
    };
    let app = create_router(AppState::with_metrics_sink(Arc::new(sink)));

    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [
                    {"date": "2024-01-02 10:00:00 +0000", "qty": 72},
                    {"date": "2024-01-02 11:00:00 +0000", "qty": 75},
                    {"date": "2024-01-02 12:00:00 +0000", "qty": 78}
                ]
            }]
        }
    });

    let (status, response) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["message"], "internal server error");
    assert_eq!(inner.write_count(), 1);
}

#[tokio::test]
async fn test_body_over_limit_is_413() {
    let sink = InMemoryMetricsSink::new();
    let state = AppState::with_metrics_sink(Arc::new(sink.clone())).with_body_limit(32);
    let app = create_router(state);

    let (status, _) = post_export(app, HEART_RATE).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(sink.write_count(), 0);
}
