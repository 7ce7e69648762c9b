//! Integration tests for forwarding exports to a metrics sink.
//!
//! Tests cover:
//! - One write per non-empty point
//! - Submission order
//! - Empty point skipping
//! - Conversion of timestamps to UTC

use axum::http::StatusCode;
use serde_json::json;
use shared::influx::to_line_protocol;
use shared::models::{FieldKey, FieldValue};
use shared::timestamp::parse_timestamp;
use tokio_test::assert_ok;

use super::common::{metrics_app, post_export, post_json, HEART_RATE};

#[tokio::test]
async fn test_single_point_becomes_one_write() {
    let (app, sink) = metrics_app();

    let (status, body) = post_export(app, HEART_RATE).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let records = sink.records();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.name, "HeartRate");
    assert_eq!(record.unit, "bpm");
    assert_eq!(record.data.len(), 1);
    assert_eq!(
        record.data.get(FieldKey::Quantity),
        Some(&FieldValue::Number(72.0))
    );

    let expected = assert_ok!(parse_timestamp("2024-01-02 10:00:00 +0000"));
    assert_eq!(record.timestamp, expected.to_utc());

    let line = assert_ok!(to_line_protocol(record));
    assert_eq!(line, "HeartRate,unit=bpm qty=72 1704189600000000000");
}

#[tokio::test]
async fn test_writes_follow_submission_order() {
    let (app, sink) = metrics_app();

    let export = json!({
        "data": {
            "metrics": [
                {
                    "name": "step_count",
                    "units": "count",
                    "data": [
                        {"date": "2024-01-02 12:00:00 +0000", "qty": 300},
                        {"date": "2024-01-02 09:00:00 +0000", "qty": 100}
                    ]
                },
                {
                    "name": "heart_rate",
                    "units": "count/min",
                    "data": [
                        {"date": "2024-01-02 08:00:00 +0000", "avg": 61.5}
                    ]
                }
            ]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);

    let records = sink.records();
    let summary: Vec<(&str, Option<f64>)> = records
        .iter()
        .map(|r| {
            let value = r
                .data
                .get(FieldKey::Quantity)
                .or_else(|| r.data.get(FieldKey::Average))
                .and_then(FieldValue::as_f64);
            (r.name.as_str(), value)
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("step_count", Some(300.0)),
            ("step_count", Some(100.0)),
            ("heart_rate", Some(61.5)),
        ]
    );
}

#[tokio::test]
async fn test_empty_points_are_skipped() {
    let (app, sink) = metrics_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [
                    {"date": "2024-01-02 09:00:00 +0000", "qty": 0, "source": "Watch"},
                    {"date": "2024-01-02 10:00:00 +0000", "qty": 72},
                    {"date": "2024-01-02 11:00:00 +0000", "sleep_start": ""}
                ]
            }]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].data.get(FieldKey::Quantity),
        Some(&FieldValue::Number(72.0))
    );
}

#[tokio::test]
async fn test_empty_point_with_bad_date_is_skipped() {
    let (app, sink) = metrics_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [{"date": "yesterday"}]
            }]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sink.write_count(), 0);
}

#[tokio::test]
async fn test_offset_is_normalized_to_utc() {
    let (app, sink) = metrics_app();

    let export = json!({
        "data": {
            "metrics": [{
                "name": "HeartRate",
                "units": "bpm",
                "data": [{"date": "2024-01-02 12:00:00 +0200", "qty": 72}]
            }]
        }
    });

    let (status, _) = post_json(app, &export).await;
    assert_eq!(status, StatusCode::OK);

    let records = sink.records();
    assert_eq!(records[0].timestamp.to_rfc3339(), "2024-01-02T10:00:00+00:00");
}

#[tokio::test]
async fn test_empty_export_writes_nothing() {
    let (app, sink) = metrics_app();

    let (status, body) = post_export(app, "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(sink.write_count(), 0);
}
