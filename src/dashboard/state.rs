use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::dashboard::range::ChartRange;
use crate::dashboard::view::{ApiStatus, ChartView, CurrentReading, StatusKind};
use crate::series::liveness::{time_ago, DeviceSummary, FleetSummary};
use crate::series::metrics::WindowMetrics;
use crate::smaawa::models::Device;

/// What a failed fetch was trying to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Devices,
    Latest,
    Window,
    Chart,
}

/// Everything that can change the dashboard.
#[derive(Debug, Clone)]
pub enum Event {
    DevicesLoaded(Vec<Device>),
    DeviceSelected(String),
    ChartRangeChanged(ChartRange),
    LatestLoaded {
        reading: CurrentReading,
        now: DateTime<Utc>,
    },
    WindowLoaded {
        device_id: String,
        metrics: WindowMetrics,
    },
    ChartLoaded(ChartView),
    /// `device_id` is `None` for fleet-wide fetches such as the device list
    FetchFailed {
        kind: FetchKind,
        device_id: Option<String>,
        message: String,
    },
    /// Recompute relative-time text against `now`
    Ticked(DateTime<Utc>),
}

/// Complete dashboard view model.
///
/// Only [`DashboardState::apply`] produces new states; handlers and the
/// refresh loop never mutate fields directly.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardState {
    pub devices: Vec<DeviceSummary>,
    pub fleet: FleetSummary,
    pub current_device: Option<String>,
    /// Device picked on first load when present in the list
    #[serde(skip)]
    pub preferred_device: Option<String>,
    pub chart_range: ChartRange,
    pub api_status: ApiStatus,
    pub latest: Option<CurrentReading>,
    pub window: Option<WindowMetrics>,
    pub chart: Option<ChartView>,
    /// When the current device last reported, as seen by this process
    pub last_update_at: Option<DateTime<Utc>>,
    pub last_update_text: Option<String>,
    pub last_error: Option<String>,
}

impl DashboardState {
    #[must_use]
    pub fn new(chart_range: ChartRange, preferred_device: Option<String>) -> Self {
        Self {
            chart_range,
            preferred_device,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn apply(self, event: Event) -> Self {
        match event {
            Event::DevicesLoaded(devices) => self.with_devices(&devices),
            Event::DeviceSelected(device_id) => self.with_selection(device_id),
            Event::ChartRangeChanged(range) => Self {
                chart_range: range,
                ..self
            },
            Event::LatestLoaded { reading, now } => self.with_latest(reading, now),
            Event::WindowLoaded { device_id, metrics } => {
                if self.is_current(&device_id) {
                    Self {
                        window: Some(metrics),
                        ..self
                    }
                } else {
                    self
                }
            }
            Event::ChartLoaded(chart) => {
                if self.is_current(&chart.device_id) && chart.range == self.chart_range {
                    Self {
                        chart: Some(chart),
                        ..self
                    }
                } else {
                    self
                }
            }
            Event::FetchFailed {
                kind,
                device_id,
                message,
            } => {
                if device_id.as_deref().is_some_and(|id| !self.is_current(id)) {
                    return self;
                }
                let text = match kind {
                    FetchKind::Devices => "Connection Error",
                    FetchKind::Latest | FetchKind::Window | FetchKind::Chart => "Error",
                };
                Self {
                    api_status: ApiStatus::new(StatusKind::Error, text),
                    last_error: Some(message),
                    ..self
                }
            }
            Event::Ticked(now) => {
                let last_update_text = self.last_update_at.map(|at| elapsed_text(at, now));
                Self {
                    last_update_text,
                    ..self
                }
            }
        }
    }

    fn is_current(&self, device_id: &str) -> bool {
        self.current_device.as_deref() == Some(device_id)
    }

    fn with_devices(self, devices: &[Device]) -> Self {
        let summaries: Vec<DeviceSummary> = devices.iter().map(DeviceSummary::from).collect();
        let fleet = FleetSummary::from_devices(&summaries);

        // An empty list leaves the selector as it was
        if summaries.is_empty() {
            return self;
        }

        let current_device = self.current_device.clone().or_else(|| {
            self.preferred_device
                .as_ref()
                .filter(|preferred| summaries.iter().any(|d| &d.device_id == *preferred))
                .cloned()
                .or_else(|| summaries.first().map(|d| d.device_id.clone()))
        });

        Self {
            devices: summaries,
            fleet,
            current_device,
            ..self
        }
    }

    fn with_selection(self, device_id: String) -> Self {
        if self.is_current(&device_id) {
            return self;
        }
        Self {
            current_device: Some(device_id),
            latest: None,
            window: None,
            chart: None,
            last_update_at: None,
            last_update_text: None,
            ..self
        }
    }

    fn with_latest(self, reading: CurrentReading, now: DateTime<Utc>) -> Self {
        if !self.is_current(&reading.device_id) {
            return self;
        }

        // Out-of-range last-seen values fall back to `now`
        let last_update_at = reading
            .last_seen_seconds
            .and_then(seconds_delta)
            .and_then(|ago| now.checked_sub_signed(ago))
            .unwrap_or(now);

        Self {
            api_status: ApiStatus::new(StatusKind::Online, "Connected"),
            last_update_text: Some(elapsed_text(last_update_at, now)),
            last_update_at: Some(last_update_at),
            latest: Some(reading),
            last_error: None,
            ..self
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn seconds_delta(secs: f64) -> Option<TimeDelta> {
    if !secs.is_finite() {
        return None;
    }
    TimeDelta::try_milliseconds((secs * 1000.0) as i64)
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_text(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    time_ago((now - at).num_seconds() as f64)
}
