//! Integration tests for forwarding exports to a log sink.
//!
//! Tests cover:
//! - One push per request with one stream per metric
//! - Chronological ordering inside a stream
//! - Sparse JSON lines
//! - Empty points and empty exports

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::common::{log_app, post_export, post_json, HEART_RATE};

#[tokio::test]
async fn test_single_point_becomes_one_stream() {
    let (app, sink) = log_app();

    let (status, body) = post_export(app, HEART_RATE).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let payloads = sink.payloads();
    assert_eq!(payloads.len(), 1);

    let streams = &payloads[0].streams;
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].labels["metric"], "HeartRate");
    assert_eq!(streams[0].labels["units"], "bpm");
    assert_eq!(streams[0].values.len(), 1);
    assert_eq!(streams[0].values[0][0], "1704189600000000000");

    let line: Value = serde_json::from_str(&streams[0].values[0][1]).unwrap();
    assert_eq!(line, json!({"name": "HeartRate", "units": "bpm", "qty": 72}));
}

#[tokio::test]
async fn test_points_are_sorted_per_metric() {
    let (app, sink) = log_app();

    let export = json!({
        "data": {
            "metrics": [
                {
                    "name": "step_count",
                    "units": "count",
                    "data": [
                        {"date": "2024-01-02 12:00:00 +0000", "qty": 300},
                        {"date": "2024-01-02 09:00:00 +0000", "qty": 100},
                        {"date": "2024-01-02 10:30:00 +0000", "qty": 200}
                    ]
                },
                {
                    "name": "heart_rate",
                    "units": "count/min",
                    "data": [
                        {"date": "2024-01-02 08:00:00 +0000", "min": 55, "avg": 61.5, "max": 70}
                    ]
                }
            ]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);

    let payloads = sink.payloads();
    assert_eq!(payloads.len(), 1, "a request is pushed in a single call");

    let streams = &payloads[0].streams;
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].labels["metric"], "step_count");
    assert_eq!(streams[1].labels["metric"], "heart_rate");

    let quantities: Vec<i64> = streams[0]
        .values
        .iter()
        .map(|[_, line]| {
            let line: Value = serde_json::from_str(line).unwrap();
            line["qty"].as_i64().unwrap()
        })
        .collect();
    assert_eq!(quantities, vec![100, 200, 300]);

    let line: Value = serde_json::from_str(&streams[1].values[0][1]).unwrap();
    assert_eq!(
        line,
        json!({"name": "heart_rate", "units": "count/min", "min": 55, "avg": 61.5, "max": 70})
    );
}

#[tokio::test]
async fn test_equal_instants_keep_submission_order() {
    let (app, sink) = log_app();

    // Same instant written with two different offsets.
    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [
                    {"date": "2024-01-02 12:00:00 +0200", "qty": 1},
                    {"date": "2024-01-02 10:00:00 +0000", "qty": 2}
                ]
            }]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);

    let payloads = sink.payloads();
    let values = &payloads[0].streams[0].values;
    assert_eq!(values[0][0], values[1][0]);
    assert!(values[0][1].contains(r#""qty":1"#));
    assert!(values[1][1].contains(r#""qty":2"#));
}

#[tokio::test]
async fn test_sleep_analysis_line_carries_text_fields() {
    let (app, sink) = log_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "sleep_analysis",
                "units": "hr",
                "data": [{
                    "date": "2024-01-02 07:00:00 +0000",
                    "source": "Watch",
                    "deep": 1.25,
                    "rem": 0,
                    "sleep_start": "2024-01-01 23:00:00 +0000",
                    "sleep_end": ""
                }]
            }]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);

    let payloads = sink.payloads();
    let line = &payloads[0].streams[0].values[0][1];
    let line: Value = serde_json::from_str(line).unwrap();
    assert_eq!(
        line,
        json!({
            "name": "sleep_analysis",
            "units": "hr",
            "deep": 1.25,
            "sleep_start": "2024-01-01 23:00:00 +0000"
        })
    );
}

#[tokio::test]
async fn test_empty_point_is_kept_as_label_only_line() {
    let (app, sink) = log_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [{"date": "2024-01-02 10:00:00 +0000", "qty": 0}]
            }]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);

    let payloads = sink.payloads();
    let line = &payloads[0].streams[0].values[0][1];
    assert_eq!(line, r#"{"name":"HeartRate","units":"bpm"}"#);
}

#[tokio::test]
async fn test_empty_export_pushes_empty_payload() {
    let (app, sink) = log_app();

    let (status, body) = post_export(app, r#"{"data":{"metrics":[]}}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let payloads = sink.payloads();
    assert_eq!(payloads.len(), 1);
    assert!(payloads[0].streams.is_empty());
}
