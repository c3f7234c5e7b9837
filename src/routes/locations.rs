use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::BTreeMap;

use crate::common::AppState;
use crate::dashboard::MapView;
use crate::error::{AppError, AppResult};
use crate::refresh::worker;
use crate::store::{DeviceLocation, LocationInput};

use super::extract::AppJson;

/// List all saved device locations
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "Saved locations keyed by device ID", body = BTreeMap<String, DeviceLocation>),
    ),
    tag = "locations"
)]
pub async fn list_locations(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, DeviceLocation>> {
    Json(state.locations.lock().await.all().clone())
}

/// Get the saved location of a device
#[utoipa::path(
    get,
    path = "/api/locations/{device_id}",
    params(
        ("device_id" = String, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Saved location", body = DeviceLocation),
        (status = 404, description = "No location saved for this device"),
    ),
    tag = "locations"
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> AppResult<Json<DeviceLocation>> {
    state
        .locations
        .lock()
        .await
        .get(&device_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No location saved for '{device_id}'")))
}

/// Pin a device to a fixed map location
///
/// Coordinates may be numbers or numeric strings. The whole mapping is
/// persisted on every save.
#[utoipa::path(
    put,
    path = "/api/locations/{device_id}",
    params(
        ("device_id" = String, Path, description = "Device ID"),
    ),
    request_body = LocationInput,
    responses(
        (status = 200, description = "Location saved", body = DeviceLocation),
        (status = 400, description = "Missing device or invalid coordinates"),
    ),
    tag = "locations"
)]
pub async fn save_location(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    AppJson(input): AppJson<LocationInput>,
) -> AppResult<Json<DeviceLocation>> {
    let location = state.locations.lock().await.save(&device_id, input).await?;
    Ok(Json(location))
}

/// Map marker and popup for a pinned device
///
/// Fetches the latest reading for the popup. When that fetch fails the
/// marker is still returned, without readings.
#[utoipa::path(
    get,
    path = "/api/locations/{device_id}/map",
    params(
        ("device_id" = String, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Marker and popup content", body = MapView),
        (status = 404, description = "No location saved for this device"),
    ),
    tag = "locations"
)]
pub async fn get_map_view(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> AppResult<Json<MapView>> {
    worker::map_view(&state, &device_id).await.map(Json)
}
