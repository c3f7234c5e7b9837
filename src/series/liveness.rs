//! Online/offline classification and relative-time text.
//!
//! Every place that renders elapsed time goes through [`time_ago`] so the
//! device list, the last-update display and the health card agree.

use serde::Serialize;
use utoipa::ToSchema;

use crate::smaawa::models::Device;

/// A device that reported within the last ten minutes is online.
pub const ONLINE_THRESHOLD_SECS: f64 = 600.0;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3600.0;
const DAY: f64 = 86_400.0;
const WEEK: f64 = 604_800.0;
const MONTH: f64 = 2_592_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Online,
    Offline,
}

#[must_use]
pub fn classify(elapsed_secs: f64) -> Liveness {
    if elapsed_secs < ONLINE_THRESHOLD_SECS {
        Liveness::Online
    } else {
        Liveness::Offline
    }
}

/// Devices that never reported a last-seen value are treated as online.
#[must_use]
pub fn classify_optional(elapsed_secs: Option<f64>) -> Liveness {
    elapsed_secs.map_or(Liveness::Online, classify)
}

#[must_use]
pub fn time_ago(elapsed_secs: f64) -> String {
    if !elapsed_secs.is_finite() || elapsed_secs < MINUTE {
        return "Just now".to_string();
    }

    let (count, unit) = if elapsed_secs < HOUR {
        (elapsed_secs / MINUTE, "min")
    } else if elapsed_secs < DAY {
        (elapsed_secs / HOUR, "hour")
    } else if elapsed_secs < WEEK {
        (elapsed_secs / DAY, "day")
    } else if elapsed_secs < MONTH {
        (elapsed_secs / WEEK, "week")
    } else {
        (elapsed_secs / MONTH, "month")
    };

    let count = count.floor();
    if (count - 1.0).abs() < f64::EPSILON {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// One row of the device selector.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeviceSummary {
    pub device_id: String,
    pub liveness: Liveness,
    pub last_seen_seconds: Option<f64>,
    /// Device ID, suffixed with the time since last report when offline
    pub label: String,
}

impl From<&Device> for DeviceSummary {
    fn from(device: &Device) -> Self {
        let liveness = classify_optional(device.last_seen_seconds);
        let label = match (liveness, device.last_seen_seconds) {
            (Liveness::Offline, Some(secs)) => {
                format!("{} ({})", device.device_id, time_ago(secs))
            }
            _ => device.device_id.clone(),
        };

        Self {
            device_id: device.device_id.clone(),
            liveness,
            last_seen_seconds: device.last_seen_seconds,
            label,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
}

impl FleetSummary {
    #[must_use]
    pub fn from_devices(devices: &[DeviceSummary]) -> Self {
        let online = devices
            .iter()
            .filter(|d| d.liveness == Liveness::Online)
            .count();
        Self {
            total: devices.len(),
            online,
            offline: devices.len() - online,
        }
    }
}
