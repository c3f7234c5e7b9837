//! Unit tests for SMAAWA response parsing.
//!
//! Run with: cargo test --test models_unit_test

use serde_json::json;

use smaawa_monitor::smaawa::models::{
    coerce_f64, parse_leading_f64, DevicesResponse, HistoryResponse, LatestResponse, RecordKind,
    SampleRecord,
};

#[test]
fn devices_accept_string_and_number_last_seen() {
    let response: DevicesResponse = serde_json::from_value(json!({
        "devices": [
            { "deviceID": "dev-1", "last_seen_seconds": 45, "status": "online" },
            { "deviceID": "dev-2", "last_seen_seconds": "3600" },
            { "deviceID": "dev-3", "last_seen_seconds": null },
            { "deviceID": "dev-4" }
        ]
    }))
    .unwrap();

    let seen: Vec<Option<f64>> = response
        .devices
        .iter()
        .map(|d| d.last_seen_seconds)
        .collect();
    assert_eq!(seen, vec![Some(45.0), Some(3600.0), None, None]);
    assert_eq!(response.devices[0].status.as_deref(), Some("online"));
}

#[test]
fn missing_device_list_is_empty() {
    let response: DevicesResponse = serde_json::from_value(json!({})).unwrap();
    assert!(response.devices.is_empty());
}

#[test]
fn latest_may_be_wrapped_or_bare() {
    let wrapped: LatestResponse = serde_json::from_value(json!({
        "data": { "receivedAt": 1_700_000_000, "distance": "42.5", "battery": 88 }
    }))
    .unwrap();
    let bare: LatestResponse = serde_json::from_value(json!({
        "receivedAt": 1_700_000_000, "distance": 42.5, "battery": "88"
    }))
    .unwrap();

    let wrapped = wrapped.into_record();
    let bare = bare.into_record();

    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.distance, Some(42.5));
    assert_eq!(wrapped.battery, Some(88.0));
}

#[test]
fn history_without_data_is_empty() {
    let response: HistoryResponse = serde_json::from_value(json!({ "error": "none" })).unwrap();
    assert!(response.into_records().is_empty());

    let response: HistoryResponse = serde_json::from_value(json!({ "data": null })).unwrap();
    assert!(response.into_records().is_empty());
}

#[test]
fn unparseable_numbers_become_none() {
    let record: SampleRecord = serde_json::from_value(json!({
        "receivedAt": "1700000000",
        "distance": "abc",
        "rate": true,
        "battery": "75%"
    }))
    .unwrap();

    assert_eq!(record.received_at, Some(1_700_000_000.0));
    assert_eq!(record.distance, None);
    assert_eq!(record.rate, None);
    assert_eq!(record.battery, Some(75.0));
}

#[test]
fn record_kind_and_level_field() {
    let raw: SampleRecord = serde_json::from_value(json!({
        "receivedAt": 100, "distance": 5, "avg_distance": 9
    }))
    .unwrap();
    assert_eq!(raw.kind(), RecordKind::Raw);
    assert_eq!(raw.level(), Some(5.0));

    let hourly: SampleRecord = serde_json::from_value(json!({
        "hour_timestamp_utc": "3600", "avg_distance": "9.25", "distance": 5
    }))
    .unwrap();
    assert_eq!(hourly.kind(), RecordKind::Hourly);
    assert_eq!(hourly.level(), Some(9.25));
    assert_eq!(hourly.time_key(), Some(3600.0));
}

#[test]
fn measured_at_falls_back_to_timestamp() {
    let record: SampleRecord = serde_json::from_value(json!({ "timestamp": 500 })).unwrap();
    assert_eq!(record.measured_at(), Some(500.0));
    assert_eq!(record.time_key(), None);
}

#[test]
fn leading_float_prefix() {
    assert_eq!(parse_leading_f64("12.5cm"), Some(12.5));
    assert_eq!(parse_leading_f64("  -3.5e2x"), Some(-350.0));
    assert_eq!(parse_leading_f64(".5"), Some(0.5));
    assert_eq!(parse_leading_f64("7."), Some(7.0));
    assert_eq!(parse_leading_f64("1e"), Some(1.0));
    assert_eq!(parse_leading_f64("."), None);
    assert_eq!(parse_leading_f64("-"), None);
    assert_eq!(parse_leading_f64("abc"), None);
    assert_eq!(parse_leading_f64(""), None);
}

#[test]
fn coerce_rejects_non_numeric_values() {
    assert_eq!(coerce_f64(&json!(3)), Some(3.0));
    assert_eq!(coerce_f64(&json!("4.5")), Some(4.5));
    assert_eq!(coerce_f64(&json!(null)), None);
    assert_eq!(coerce_f64(&json!([1])), None);
    assert_eq!(coerce_f64(&json!({ "v": 1 })), None);
}
