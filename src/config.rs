use std::env;
use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

use crate::dashboard::ChartRange;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // SMAAWA data API
    pub api_base_url: String,
    pub upstream_timeout_seconds: Option<u64>,

    // Dashboard settings
    pub refresh_interval_seconds: u32,
    pub auto_refresh_enabled: bool,
    pub default_device: Option<String>,
    pub max_history_points: u32,
    pub default_chart_range: ChartRange,
    pub display_utc_offset_minutes: i32,

    // Thresholds
    pub battery_high: f64,
    pub battery_low: f64,
    pub water_level_high: f64,
    pub water_level_low: f64,

    // Map settings
    pub map_default_zoom: u8,
    pub map_default_lat: f64,
    pub map_default_lng: f64,

    // Location persistence
    pub location_store_path: PathBuf,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,

    // Application metadata
    pub deployment: Deployment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            upstream_timeout_seconds: None,
            refresh_interval_seconds: 10,
            auto_refresh_enabled: true,
            default_device: None,
            max_history_points: 100,
            default_chart_range: ChartRange::Realtime,
            display_utc_offset_minutes: -360,
            battery_high: 70.0,
            battery_low: 30.0,
            water_level_high: 200.0,
            water_level_low: 20.0,
            map_default_zoom: 15,
            map_default_lat: 19.4326,
            map_default_lng: -99.1332,
            location_store_path: PathBuf::from("smaawa_locations.json"),
            api_host: "0.0.0.0".to_string(),
            api_port: 3000,
            disable_rate_limiting: false,
            rate_limit_per_second: 1,
            rate_limit_burst: 30,
            deployment: Deployment::Local,
        }
    }
}

/// Parse an optional environment variable, falling back to `default` when it
/// is unset or does not parse.
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `SMAAWA_API_BASE` is not set, and
    /// `ConfigError::Invalid` if the default chart range or display offset
    /// cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let chart_mode = env::var("DEFAULT_CHART_MODE").unwrap_or_else(|_| "realtime".to_string());
        let chart_hours: u32 = env_or("DEFAULT_CHART_HOURS", 3);
        let default_chart_range = ChartRange::from_parts(&chart_mode, chart_hours)
            .ok_or(ConfigError::Invalid("DEFAULT_CHART_MODE"))?;

        let display_utc_offset_minutes = env_or(
            "DISPLAY_UTC_OFFSET_MINUTES",
            defaults.display_utc_offset_minutes,
        );
        if offset_from_minutes(display_utc_offset_minutes).is_none() {
            return Err(ConfigError::Invalid("DISPLAY_UTC_OFFSET_MINUTES"));
        }

        Ok(Self {
            // SMAAWA data API
            api_base_url: env::var("SMAAWA_API_BASE")
                .map_err(|_| ConfigError::Missing("SMAAWA_API_BASE"))?,
            upstream_timeout_seconds: env::var("UPSTREAM_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok()),

            // Dashboard settings
            refresh_interval_seconds: env_or(
                "REFRESH_INTERVAL_SECONDS",
                defaults.refresh_interval_seconds,
            )
            .max(1),
            auto_refresh_enabled: env_or("AUTO_REFRESH_ENABLED", defaults.auto_refresh_enabled),
            default_device: env::var("DEFAULT_DEVICE").ok().filter(|d| !d.is_empty()),
            max_history_points: env_or("MAX_HISTORY_POINTS", defaults.max_history_points),
            default_chart_range,
            display_utc_offset_minutes,

            // Thresholds
            battery_high: env_or("BATTERY_HIGH", defaults.battery_high),
            battery_low: env_or("BATTERY_LOW", defaults.battery_low),
            water_level_high: env_or("WATER_LEVEL_HIGH", defaults.water_level_high),
            water_level_low: env_or("WATER_LEVEL_LOW", defaults.water_level_low),

            // Map settings
            map_default_zoom: env_or("MAP_DEFAULT_ZOOM", defaults.map_default_zoom),
            map_default_lat: env_or("MAP_DEFAULT_LAT", defaults.map_default_lat),
            map_default_lng: env_or("MAP_DEFAULT_LNG", defaults.map_default_lng),

            // Location persistence
            location_store_path: env::var("LOCATION_STORE_PATH")
                .map_or(defaults.location_store_path, PathBuf::from),

            // API settings
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env_or("API_PORT", defaults.api_port),

            // Rate limiting
            disable_rate_limiting: env_or("DISABLE_RATE_LIMITING", defaults.disable_rate_limiting),
            rate_limit_per_second: env_or("RATE_LIMIT_PER_SECOND", defaults.rate_limit_per_second),
            rate_limit_burst: env_or("RATE_LIMIT_BURST", defaults.rate_limit_burst),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Fixed offset used for every human-readable timestamp, independent of
    /// the host locale.
    #[must_use]
    pub fn display_offset(&self) -> FixedOffset {
        offset_from_minutes(self.display_utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
