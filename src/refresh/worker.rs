use chrono::Utc;

use crate::common::AppState;
use crate::dashboard::{
    ChartRange, ChartView, CurrentReading, Event, FetchKind, HistorySource, MapView,
};
use crate::error::{AppError, AppResult};
use crate::series::WindowMetrics;
use crate::smaawa::models::SampleRecord;

/// Hours of raw history summarised next to the current reading.
const WINDOW_HOURS: u32 = 1;

/// Run one refresh cycle: device list, then latest reading, window metrics
/// and chart for the selected device.
///
/// Failures are recorded in the dashboard state and logged. They never
/// propagate: the next scheduled cycle is the retry.
pub async fn refresh_cycle(state: AppState) {
    if let Err(e) = refresh_devices(&state).await {
        record_failure(&state, FetchKind::Devices, None, &e).await;
    }

    let Some(device_id) = state.read(|d| d.current_device.clone()).await else {
        tracing::debug!("No device selected, skipping data refresh");
        return;
    };

    refresh_device_data(&state, &device_id).await;
}

/// Load latest reading, window metrics and chart for one device
/// concurrently. Each result is applied as soon as it arrives; failures are
/// recorded without affecting the other two.
pub async fn refresh_device_data(state: &AppState, device_id: &str) {
    let (latest, window, chart) = futures::join!(
        refresh_latest(state, device_id),
        refresh_window(state, device_id),
        refresh_chart(state, device_id)
    );

    for (kind, result) in [
        (FetchKind::Latest, latest),
        (FetchKind::Window, window),
        (FetchKind::Chart, chart),
    ] {
        if let Err(e) = result {
            record_failure(state, kind, Some(device_id), &e).await;
        }
    }
}

pub async fn record_failure(
    state: &AppState,
    kind: FetchKind,
    device_id: Option<&str>,
    error: &AppError,
) {
    tracing::warn!(?kind, device_id, error = %error, "Refresh fetch failed");
    state
        .update(Event::FetchFailed {
            kind,
            device_id: device_id.map(str::to_string),
            message: error.to_string(),
        })
        .await;
}

/// # Errors
///
/// Returns `AppError::UpstreamApi` if the device list cannot be fetched.
pub async fn refresh_devices(state: &AppState) -> AppResult<()> {
    let response = state.client.get_devices().await?;
    tracing::debug!(count = response.devices.len(), "Devices loaded");
    state.update(Event::DevicesLoaded(response.devices)).await;
    Ok(())
}

/// # Errors
///
/// Returns `AppError::UpstreamApi` if the latest reading cannot be fetched.
pub async fn refresh_latest(state: &AppState, device_id: &str) -> AppResult<()> {
    let record = state.client.get_latest(device_id).await?;
    let reading = CurrentReading::build(&state.view_context(), device_id, &record);
    state
        .update(Event::LatestLoaded {
            reading,
            now: Utc::now(),
        })
        .await;
    Ok(())
}

/// # Errors
///
/// Returns `AppError::UpstreamApi` if the one-hour history cannot be fetched.
pub async fn refresh_window(state: &AppState, device_id: &str) -> AppResult<()> {
    let records = state
        .client
        .get_history(device_id, WINDOW_HOURS, state.config.max_history_points)
        .await?;
    let metrics = WindowMetrics::from_records(&records);
    state
        .update(Event::WindowLoaded {
            device_id: device_id.to_string(),
            metrics,
        })
        .await;
    Ok(())
}

/// Fetch and normalize chart data for the currently selected range.
///
/// # Errors
///
/// Returns `AppError::UpstreamApi` if the history cannot be fetched.
pub async fn refresh_chart(state: &AppState, device_id: &str) -> AppResult<()> {
    let range = state.read(|d| d.chart_range).await;
    let records = fetch_chart_records(state, device_id, range).await?;
    tracing::debug!(device_id, ?range, points = records.len(), "Chart data received");

    let chart = ChartView::build(&state.view_context(), device_id, range, &records);
    state.update(Event::ChartLoaded(chart)).await;
    Ok(())
}

async fn fetch_chart_records(
    state: &AppState,
    device_id: &str,
    range: ChartRange,
) -> AppResult<Vec<SampleRecord>> {
    match range.source(state.config.max_history_points) {
        HistorySource::Raw { hours, limit } => {
            state.client.get_history(device_id, hours, limit).await
        }
        HistorySource::Hourly { days } => state.client.get_hourly_history(device_id, days).await,
    }
}

/// Build the map marker for a pinned device with a fresh latest reading.
/// A failed fetch yields a popup without readings.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the device has no saved location.
pub async fn map_view(state: &AppState, device_id: &str) -> AppResult<MapView> {
    let location = state
        .locations
        .lock()
        .await
        .get(device_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("No location saved for '{device_id}'")))?;

    let latest = match state.client.get_latest(device_id).await {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(device_id, error = %e, "Error fetching device data for map");
            None
        }
    };

    Ok(MapView::build(
        &state.view_context(),
        device_id,
        location,
        latest.as_ref(),
    ))
}
