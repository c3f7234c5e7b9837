use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::AppState;
use crate::dashboard::{ChartRange, DashboardState, Event, FetchKind, MapDefaults};
use crate::error::{AppError, AppResult};
use crate::refresh::{worker, SchedulerStatus};
use crate::series::{DeviceSummary, FleetSummary};

use super::extract::AppJson;

#[derive(Debug, Serialize, ToSchema)]
pub struct StateResponse {
    #[serde(flatten)]
    pub dashboard: DashboardState,
    pub refresh: SchedulerStatus,
    pub map: MapDefaults,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceSummary>,
    pub fleet: FleetSummary,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectDeviceRequest {
    pub device_id: String,
}

async fn state_response(state: &AppState) -> StateResponse {
    let refresh = state.scheduler.lock().await.status();
    StateResponse {
        dashboard: state.snapshot().await,
        refresh,
        map: MapDefaults::from_config(&state.config),
    }
}

/// Full dashboard view model
#[utoipa::path(
    get,
    path = "/api/state",
    responses(
        (status = 200, description = "Current dashboard state", body = StateResponse),
    ),
    tag = "dashboard"
)]
pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    Json(state_response(&state).await)
}

/// Known devices with liveness
#[utoipa::path(
    get,
    path = "/api/devices",
    responses(
        (status = 200, description = "Devices from the last successful refresh", body = DevicesResponse),
    ),
    tag = "dashboard"
)]
pub async fn list_devices(State(state): State<AppState>) -> Json<DevicesResponse> {
    let response = state
        .read(|d| DevicesResponse {
            devices: d.devices.clone(),
            fleet: d.fleet,
        })
        .await;
    Json(response)
}

/// Select the device shown on the dashboard
///
/// Loads the latest reading, window metrics and chart for the new device
/// before responding. Fetch failures show up in `api_status`.
#[utoipa::path(
    put,
    path = "/api/selection",
    request_body = SelectDeviceRequest,
    responses(
        (status = 200, description = "Device selected", body = StateResponse),
        (status = 400, description = "No device given"),
        (status = 404, description = "Device not in the device list"),
    ),
    tag = "dashboard"
)]
pub async fn select_device(
    State(state): State<AppState>,
    AppJson(request): AppJson<SelectDeviceRequest>,
) -> AppResult<Json<StateResponse>> {
    let device_id = request.device_id.trim().to_string();
    if device_id.is_empty() {
        return Err(AppError::BadRequest("Please select a device".to_string()));
    }

    let known = state
        .read(|d| d.devices.is_empty() || d.devices.iter().any(|s| s.device_id == device_id))
        .await;
    if !known {
        return Err(AppError::NotFound(format!("Device '{device_id}' not found")));
    }

    tracing::info!(device_id = %device_id, "Device selected");
    state.update(Event::DeviceSelected(device_id.clone())).await;

    worker::refresh_device_data(&state, &device_id).await;

    Ok(Json(state_response(&state).await))
}

/// Change the chart range and reload chart data
#[utoipa::path(
    put,
    path = "/api/chart/range",
    request_body = ChartRange,
    responses(
        (status = 200, description = "Range changed", body = StateResponse),
        (status = 400, description = "Hourly range without hours"),
    ),
    tag = "dashboard"
)]
pub async fn set_chart_range(
    State(state): State<AppState>,
    AppJson(range): AppJson<ChartRange>,
) -> AppResult<Json<StateResponse>> {
    if let ChartRange::Hourly { hours: 0 } = range {
        return Err(AppError::BadRequest(
            "hourly range needs at least one hour".to_string(),
        ));
    }

    tracing::info!(?range, "Chart range updated");
    state.update(Event::ChartRangeChanged(range)).await;

    if let Some(device_id) = state.read(|d| d.current_device.clone()).await
        && let Err(e) = worker::refresh_chart(&state, &device_id).await
    {
        worker::record_failure(&state, FetchKind::Chart, Some(&device_id), &e).await;
    }

    Ok(Json(state_response(&state).await))
}

/// Refresh everything now and restart the countdown
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Refresh completed", body = StateResponse),
    ),
    tag = "dashboard"
)]
pub async fn refresh_now(State(state): State<AppState>) -> Json<StateResponse> {
    worker::refresh_cycle(state.clone()).await;
    state.scheduler.lock().await.reset();
    Json(state_response(&state).await)
}

/// Pause or resume automatic refresh
#[utoipa::path(
    post,
    path = "/api/auto-refresh",
    responses(
        (status = 200, description = "New scheduler status", body = SchedulerStatus),
    ),
    tag = "dashboard"
)]
pub async fn toggle_auto_refresh(State(state): State<AppState>) -> Json<SchedulerStatus> {
    let mut scheduler = state.scheduler.lock().await;
    let running = scheduler.toggle();
    tracing::info!(auto_refresh = running, "Auto-refresh toggled");
    Json(scheduler.status())
}
