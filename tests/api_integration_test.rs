//! End-to-end tests against an in-process fake SMAAWA API.
//!
//! Run with: cargo test --test api_integration_test

use axum::{
    body::Body,
    extract::Query,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;

use smaawa_monitor::common::AppState;
use smaawa_monitor::config::Config;
use smaawa_monitor::error::AppError;
use smaawa_monitor::routes::build_router;
use smaawa_monitor::smaawa::SmaawaClient;
use smaawa_monitor::store::{LocationStore, MemoryStore};

const NOW: f64 = 1_700_000_000.0;

async fn fake_smaawa(Query(params): Query<HashMap<String, String>>) -> Response {
    let device = params.get("deviceID").cloned().unwrap_or_default();
    match params.get("action").map(String::as_str) {
        Some("devices") => Json(json!({
            "devices": [
                { "deviceID": "dev-1", "last_seen_seconds": 30, "status": "online" },
                { "deviceID": "dev-2", "last_seen_seconds": "7200", "status": "offline" }
            ]
        }))
        .into_response(),
        Some("latest") if device == "dev-1" => Json(json!({
            "data": {
                "receivedAt": NOW,
                "distance": "42",
                "rate": 10,
                "battery": 85,
                "last_seen_seconds": 30
            }
        }))
        .into_response(),
        // Some deployments return the latest record unwrapped
        Some("latest") if device == "dev-2" => Json(json!({
            "receivedAt": NOW - 7200.0,
            "distance": 12.5,
            "battery": "20",
            "last_seen_seconds": 7200
        }))
        .into_response(),
        Some("history") => {
            let (Some(hours), Some(limit)) = (params.get("hours"), params.get("limit")) else {
                return (StatusCode::BAD_REQUEST, "hours and limit required").into_response();
            };
            Json(json!({
                "hours": hours,
                "limit": limit,
                "data": [
                    { "receivedAt": NOW - 300.0, "distance": 12, "rate": 2.78 },
                    { "receivedAt": NOW - 600.0, "distance": 10, "rate": 0 }
                ]
            }))
            .into_response()
        }
        Some("hourly_history") => {
            let days: f64 = params
                .get("days")
                .and_then(|d| d.parse().ok())
                .unwrap_or(0.0);
            Json(json!({
                "data": [
                    { "hour_timestamp_utc": NOW - 86_400.0 * days, "avg_distance": 50 },
                    { "hour_timestamp_utc": NOW, "avg_distance": 60 }
                ]
            }))
            .into_response()
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "unknown action").into_response(),
    }
}

/// Start the fake API on an ephemeral port and return its base URL.
async fn spawn_fake_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/api.php", get(fake_smaawa));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api.php")
}

fn test_config(api_base_url: String) -> Config {
    Config {
        api_base_url,
        upstream_timeout_seconds: Some(5),
        disable_rate_limiting: true,
        ..Config::default()
    }
}

fn app_state(api_base_url: String) -> AppState {
    let config = test_config(api_base_url);
    let client = SmaawaClient::new(&config).unwrap();
    let locations = LocationStore::load(Box::new(MemoryStore::default()));
    AppState::new(config, client, locations)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn client_reads_devices_and_latest() {
    let client = SmaawaClient::new(&test_config(spawn_fake_api().await)).unwrap();

    let devices = assert_ok!(client.get_devices().await);
    assert_eq!(devices.devices.len(), 2);
    assert_eq!(devices.devices[1].last_seen_seconds, Some(7200.0));

    let wrapped = assert_ok!(client.get_latest("dev-1").await);
    assert_eq!(wrapped.distance, Some(42.0));

    let bare = assert_ok!(client.get_latest("dev-2").await);
    assert_eq!(bare.distance, Some(12.5));
    assert_eq!(bare.battery, Some(20.0));
}

#[tokio::test]
async fn client_sends_history_parameters() {
    let client = SmaawaClient::new(&test_config(spawn_fake_api().await)).unwrap();

    let raw = assert_ok!(client.get_history("dev-1", 3, 100).await);
    assert_eq!(raw.len(), 2);

    let hourly = assert_ok!(client.get_hourly_history("dev-1", 7).await);
    assert_eq!(hourly.len(), 2);
    assert_eq!(hourly[0].time_key(), Some(NOW - 86_400.0 * 7.0));
}

#[tokio::test]
async fn client_maps_failures_to_upstream_errors() {
    let base = spawn_fake_api().await;
    let client = SmaawaClient::new(&test_config(base)).unwrap();

    // Unknown device falls through to the 500 branch
    let err = assert_err!(client.get_latest("dev-404").await);
    assert!(matches!(err, AppError::UpstreamApi(ref msg) if msg.starts_with("HTTP 500")));

    let unreachable = SmaawaClient::new(&test_config("http://127.0.0.1:1/api.php".to_string()))
        .unwrap();
    let err = assert_err!(unreachable.get_devices().await);
    assert!(matches!(err, AppError::UpstreamApi(_)));
}

#[tokio::test]
async fn health_and_page_are_served() {
    let app = build_router(app_state("http://127.0.0.1:1/api.php".to_string()));

    let (status, _) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("SMAAWA Water Monitoring"));
}

#[tokio::test]
async fn initial_state_is_connecting() {
    let app = build_router(app_state("http://127.0.0.1:1/api.php".to_string()));

    let (status, body) = send(&app, "GET", "/api/state", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_status"]["status"], "offline");
    assert_eq!(body["api_status"]["text"], "Connecting...");
    assert_eq!(body["chart_range"]["mode"], "realtime");
    assert_eq!(body["refresh"]["auto_refresh"], true);
    assert_eq!(body["refresh"]["interval_seconds"], 10);
    assert_eq!(body["map"]["zoom"], 15);
    assert!(body.get("preferred_device").is_none());
}

#[tokio::test]
async fn refresh_loads_devices_reading_and_chart() {
    let app = build_router(app_state(spawn_fake_api().await));

    let (status, body) = send(&app, "POST", "/api/refresh", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_status"]["text"], "Connected");
    assert_eq!(body["current_device"], "dev-1");
    assert_eq!(body["fleet"]["online"], 1);
    assert_eq!(body["fleet"]["offline"], 1);
    assert_eq!(body["devices"][1]["label"], "dev-2 (2 hours ago)");
    assert_eq!(body["latest"]["rate_display"], "129.50");
    assert_eq!(body["latest"]["battery_band"], "good");
    assert_eq!(body["window"]["data_points"], 2);
    assert_eq!(body["window"]["min_level"], 10.0);
    assert_eq!(body["chart"]["kind"], "line");
    // Records arrive newest first and are reordered
    assert_eq!(body["chart"]["series"]["levels"], json!([10.0, 12.0]));
    assert_eq!(body["chart"]["series"]["rates"][0], 0.0);
}

#[tokio::test]
async fn selection_and_range_changes_reload_data() {
    let app = build_router(app_state(spawn_fake_api().await));
    send(&app, "POST", "/api/refresh", None).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/selection",
        Some(json!({ "device_id": "dev-2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_device"], "dev-2");
    assert_eq!(body["latest"]["water_level_display"], "12.5");
    assert_eq!(body["latest"]["battery_band"], "critical");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/chart/range",
        Some(json!({ "mode": "hourly", "hours": 168 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chart_range"]["hours"], 168);
    assert_eq!(body["chart"]["kind"], "bar");
    // 7 days apart: a boundary separates the two buckets
    assert_eq!(body["chart"]["series"]["levels"], json!([50.0, null, 60.0]));
    assert_eq!(body["chart"]["series"]["labels"][1], "OFFLINE (7.0 days)");
}

#[tokio::test]
async fn invalid_controls_are_rejected() {
    let app = build_router(app_state(spawn_fake_api().await));
    send(&app, "POST", "/api/refresh", None).await;

    let (status, body) = send(&app, "PUT", "/api/selection", Some(json!({ "device_id": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please select a device");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/selection",
        Some(json!({ "device_id": "dev-999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/chart/range",
        Some(json!({ "mode": "hourly", "hours": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let app = build_router(app_state(spawn_fake_api().await));

    let cases = [
        ("/api/chart/range", json!({ "mode": "weekly" })),
        ("/api/chart/range", json!({ "mode": "hourly" })),
        ("/api/selection", json!({ "device": "dev-1" })),
        ("/api/locations/dev-1", json!({ "name": 5 })),
    ];
    for (uri, body) in cases {
        let (status, body) = send(&app, "PUT", uri, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }
}

#[tokio::test]
async fn upstream_failure_is_reported_in_state() {
    let app = build_router(app_state("http://127.0.0.1:1/api.php".to_string()));

    let (status, body) = send(&app, "POST", "/api/refresh", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_status"]["status"], "error");
    assert_eq!(body["api_status"]["text"], "Connection Error");
    assert!(body["last_error"].as_str().unwrap().starts_with("SMAAWA API error"));
}

#[tokio::test]
async fn auto_refresh_toggles() {
    let app = build_router(app_state("http://127.0.0.1:1/api.php".to_string()));

    let (_, body) = send(&app, "POST", "/api/auto-refresh", None).await;
    assert_eq!(body["auto_refresh"], false);

    let (_, body) = send(&app, "POST", "/api/auto-refresh", None).await;
    assert_eq!(body["auto_refresh"], true);
}

#[tokio::test]
async fn locations_are_saved_and_mapped() {
    let app = build_router(app_state(spawn_fake_api().await));

    let (status, _) = send(&app, "GET", "/api/locations/dev-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/locations/dev-1",
        Some(json!({ "name": "", "lat": "19.4326", "lng": -99.1332 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lat"], 19.4326);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/locations/dev-2",
        Some(json!({ "name": "Canal", "lat": "north", "lng": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter valid latitude and longitude");

    let (_, body) = send(&app, "GET", "/api/locations", None).await;
    assert_eq!(body.as_object().map(serde_json::Map::len), Some(1));

    let (status, body) = send(&app, "GET", "/api/locations/dev-1/map", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Water Monitoring Station");
    assert_eq!(body["zoom"], 15);
    assert_eq!(body["reading"]["water_level_display"], "42.0");
}

#[tokio::test]
async fn map_without_upstream_still_shows_marker() {
    let app = build_router(app_state("http://127.0.0.1:1/api.php".to_string()));

    send(
        &app,
        "PUT",
        "/api/locations/dev-1",
        Some(json!({ "name": "Presa", "lat": 1, "lng": 2 })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/locations/dev-1/map", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Presa");
    assert!(body["reading"].is_null());
}
