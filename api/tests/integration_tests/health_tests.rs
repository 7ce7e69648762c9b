//! Integration tests for health check and general API functionality.
//!
//! Tests cover:
//! - Health check endpoint
//! - Unknown routes

use axum::http::StatusCode;

use super::common::{get, log_app, metrics_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _sink) = metrics_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "pulsegate-api");
    assert_eq!(response["destination"], "metrics");
}

#[tokio::test]
async fn test_health_check_does_not_touch_sink() {
    let (app, sink) = log_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["destination"], "logs");
    assert_eq!(sink.push_count(), 0);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _sink) = metrics_app();

    let (status, _) = get(app, "/api/v1/logs").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
