//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup and HTTP request helpers.

use api::{create_router, AppState};
use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::sinks::{InMemoryLogSink, InMemoryMetricsSink};
use std::sync::Arc;

/// A single heart-rate reading, the smallest useful export.
pub const HEART_RATE: &str = r#"{"data":{"metrics":[{"name":"HeartRate","units":"bpm","data":[{"date":"2024-01-02 10:00:00 +0000","qty":72}]}]}}"#;

/// Creates a test router forwarding to a fresh in-memory log sink.
///
/// # Returns
///
/// A tuple containing the configured router and a handle on the sink.
pub fn log_app() -> (Router, InMemoryLogSink) {
    let sink = InMemoryLogSink::new();
    let state = AppState::with_log_sink(Arc::new(sink.clone()));
    (create_router(state), sink)
}

/// Creates a test router forwarding to a fresh in-memory metrics sink.
///
/// # Returns
///
/// A tuple containing the configured router and a handle on the sink.
pub fn metrics_app() -> (Router, InMemoryMetricsSink) {
    let sink = InMemoryMetricsSink::new();
    let state = AppState::with_metrics_sink(Arc::new(sink.clone()));
    (create_router(state), sink)
}

/// Helper to POST a raw body to `/apple`.
///
/// # Returns
///
/// A tuple containing the response status code and the raw response body.
pub async fn post_export(app: Router, body: &str) -> (StatusCode, Bytes) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("POST")
            .uri("/apple")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, body_bytes)
}

/// Helper to POST a JSON value to `/apple`.
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body,
/// or `Value::Null` when the body is empty.
pub async fn post_json(app: Router, body: &Value) -> (StatusCode, Value) {
    let (status, body_bytes) = post_export(app, &body.to_string()).await;
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request.
///
/// # Returns
///
/// A tuple containing the response status code and parsed JSON response body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}
