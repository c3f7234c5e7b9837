use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Config;
use crate::series::rate;
use crate::smaawa::models::SampleRecord;

/// Readings within this many seconds count as fully up.
const UPTIME_ONLINE_SECS: f64 = 300.0;

/// Summary of the one-hour raw window shown next to the current reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct WindowMetrics {
    /// Records received in the window
    pub data_points: usize,
    pub min_level: Option<f64>,
    pub max_level: Option<f64>,
    /// Mean device-reported rate in cm/hr over records with a numeric rate
    pub avg_rate_per_hour: Option<f64>,
}

impl WindowMetrics {
    /// Missing levels count as 0 cm, records without a rate are skipped for
    /// the average. An empty window has no extrema and no average.
    #[must_use]
    pub fn from_records(records: &[SampleRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let levels = records.iter().map(|r| r.distance.unwrap_or(0.0));
        let min_level = levels.clone().fold(f64::INFINITY, f64::min);
        let max_level = levels.fold(f64::NEG_INFINITY, f64::max);

        let rates: Vec<f64> = records
            .iter()
            .filter_map(|r| r.rate)
            .map(rate::per_hour)
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let avg_rate_per_hour = if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };

        Self {
            data_points: records.len(),
            min_level: Some(min_level),
            max_level: Some(max_level),
            avg_rate_per_hour: Some(avg_rate_per_hour),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BatteryBand {
    Good,
    Fair,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LevelBand {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub battery_high: f64,
    pub battery_low: f64,
    pub water_level_high: f64,
    pub water_level_low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Thresholds {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            battery_high: config.battery_high,
            battery_low: config.battery_low,
            water_level_high: config.water_level_high,
            water_level_low: config.water_level_low,
        }
    }

    #[must_use]
    pub fn battery_band(&self, battery_percent: f64) -> BatteryBand {
        if battery_percent >= self.battery_high {
            BatteryBand::Good
        } else if battery_percent >= self.battery_low {
            BatteryBand::Fair
        } else {
            BatteryBand::Critical
        }
    }

    #[must_use]
    pub fn level_band(&self, level_cm: f64) -> LevelBand {
        if level_cm > self.water_level_high {
            LevelBand::High
        } else if level_cm < self.water_level_low {
            LevelBand::Low
        } else {
            LevelBand::Normal
        }
    }
}

/// Rough availability estimate from time since the last report: 100 %
/// within five minutes, then losing 10 points per 864 s of silence.
#[must_use]
pub fn uptime_estimate(last_seen_secs: f64) -> f64 {
    if last_seen_secs < UPTIME_ONLINE_SECS {
        100.0
    } else {
        (100.0 - last_seen_secs / 864.0 * 10.0).max(0.0)
    }
}
