//! Conversion of device-reported rates to cm per hour.
//!
//! Devices report the level change over one reporting cycle. The cycle is
//! not transmitted, so the empirical nominal interval is used. Charts do not
//! go through this path; they derive the rate from actual sample spacing.

use serde::Serialize;
use utoipa::ToSchema;

/// Nominal device reporting interval in seconds.
pub const CYCLE_SECONDS: f64 = 278.0;

#[must_use]
pub fn per_hour(cycle_delta: f64) -> f64 {
    cycle_delta / CYCLE_SECONDS * 3600.0
}

/// Two-decimal display form, e.g. `129.50`.
#[must_use]
pub fn format_rate(rate_per_hour: f64) -> String {
    format!("{rate_per_hour:.2}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum RateTrend {
    Charging,
    Discharging,
    Stable,
}

impl RateTrend {
    #[must_use]
    pub fn from_rate(rate_per_hour: f64) -> Self {
        if rate_per_hour > 0.0 {
            Self::Charging
        } else if rate_per_hour < 0.0 {
            Self::Discharging
        } else {
            Self::Stable
        }
    }
}

impl std::fmt::Display for RateTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Charging => write!(f, "Charging"),
            Self::Discharging => write!(f, "Discharging"),
            Self::Stable => write!(f, "Stable"),
        }
    }
}
