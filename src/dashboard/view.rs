//! View models rendered by the dashboard page.
//!
//! These are built from upstream records outside the state lock and then
//! handed to [`DashboardState::apply`](super::DashboardState::apply) as
//! finished values.

use chrono::FixedOffset;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Config;
use crate::dashboard::range::{ChartKind, ChartRange};
use crate::series::liveness::time_ago;
use crate::series::metrics::{uptime_estimate, BatteryBand, LevelBand, Thresholds};
use crate::series::normalize::{format_epoch, NormalizedSeries, Normalizer};
use crate::series::rate::{self, RateTrend};
use crate::smaawa::models::SampleRecord;
use crate::store::DeviceLocation;

const MEASURED_AT_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";
const DEFAULT_STATION_NAME: &str = "Water Monitoring Station";

/// Presentation settings shared by every view builder.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext {
    pub offset: FixedOffset,
    pub thresholds: Thresholds,
    pub max_history_points: u32,
    pub map_zoom: u8,
}

impl ViewContext {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            offset: config.display_offset(),
            thresholds: Thresholds::from_config(config),
            max_history_points: config.max_history_points,
            map_zoom: config.map_default_zoom,
        }
    }
}

impl Default for ViewContext {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Online,
    #[default]
    Offline,
    Error,
}

/// Connection indicator in the page header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ApiStatus {
    pub status: StatusKind,
    pub text: String,
}

impl Default for ApiStatus {
    fn default() -> Self {
        Self {
            status: StatusKind::Offline,
            text: "Connecting...".to_string(),
        }
    }
}

impl ApiStatus {
    #[must_use]
    pub fn new(status: StatusKind, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }
}

/// Latest reading of the selected device, with device-reported rate
/// converted to cm/hr.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentReading {
    pub device_id: String,
    pub water_level_cm: f64,
    /// One decimal, e.g. `42.0`
    pub water_level_display: String,
    pub level_band: LevelBand,
    pub rate_per_hour: f64,
    /// Two decimals, e.g. `129.50`
    pub rate_display: String,
    pub rate_trend: RateTrend,
    pub battery_percent: i64,
    pub battery_band: BatteryBand,
    pub last_seen_seconds: Option<f64>,
    pub last_seen_text: String,
    pub uptime_percent: f64,
    /// Measurement time in the display offset, when the record carries one
    pub measured_at: Option<String>,
}

impl CurrentReading {
    /// Non-numeric fields fall back to zero, matching what the displays show
    /// for a device that has not reported yet.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(ctx: &ViewContext, device_id: &str, record: &SampleRecord) -> Self {
        let water_level = record.distance.unwrap_or(0.0);
        let rate_per_hour = rate::per_hour(record.rate.unwrap_or(0.0));
        let battery = record.battery.unwrap_or(0.0);
        let last_seen = record.last_seen_seconds.unwrap_or(0.0);

        Self {
            device_id: device_id.to_string(),
            water_level_cm: water_level,
            water_level_display: format!("{water_level:.1}"),
            level_band: ctx.thresholds.level_band(water_level),
            rate_per_hour,
            rate_display: rate::format_rate(rate_per_hour),
            rate_trend: RateTrend::from_rate(rate_per_hour),
            battery_percent: battery.round() as i64,
            battery_band: ctx.thresholds.battery_band(battery),
            last_seen_seconds: record.last_seen_seconds,
            last_seen_text: time_ago(last_seen),
            uptime_percent: uptime_estimate(last_seen),
            measured_at: record
                .measured_at()
                .map(|t| format_epoch(t, ctx.offset, MEASURED_AT_FORMAT)),
        }
    }
}

/// Level and rate chart data for one device and range.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartView {
    pub device_id: String,
    pub range: ChartRange,
    pub kind: ChartKind,
    pub series: NormalizedSeries,
}

impl ChartView {
    #[must_use]
    pub fn build(
        ctx: &ViewContext,
        device_id: &str,
        range: ChartRange,
        records: &[SampleRecord],
    ) -> Self {
        Self {
            device_id: device_id.to_string(),
            range,
            kind: range.chart_kind(),
            series: Normalizer::new(ctx.offset).normalize(records),
        }
    }
}

/// Where the map opens before any device is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct MapDefaults {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

impl MapDefaults {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            lat: config.map_default_lat,
            lng: config.map_default_lng,
            zoom: config.map_default_zoom,
        }
    }
}

/// Marker and popup for a pinned device.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MapView {
    pub device_id: String,
    pub name: String,
    pub location: DeviceLocation,
    pub zoom: u8,
    /// Absent when the latest reading could not be fetched
    pub reading: Option<CurrentReading>,
}

impl MapView {
    #[must_use]
    pub fn build(
        ctx: &ViewContext,
        device_id: &str,
        location: DeviceLocation,
        latest: Option<&SampleRecord>,
    ) -> Self {
        let name = if location.name.is_empty() {
            DEFAULT_STATION_NAME.to_string()
        } else {
            location.name.clone()
        };

        Self {
            device_id: device_id.to_string(),
            name,
            location,
            zoom: ctx.map_zoom,
            reading: latest.map(|record| CurrentReading::build(ctx, device_id, record)),
        }
    }
}
