use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Time range selected for the level and rate charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ChartRange {
    /// Last three hours of raw readings
    #[default]
    Realtime,
    /// Hourly view covering `hours`
    Hourly { hours: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Which upstream query feeds a chart range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    Raw { hours: u32, limit: u32 },
    Hourly { days: u32 },
}

const REALTIME_HOURS: u32 = 3;

impl ChartRange {
    /// Build a range from a mode name and hour count, as used in
    /// configuration. Unknown modes yield `None`.
    #[must_use]
    pub fn from_parts(mode: &str, hours: u32) -> Option<Self> {
        match mode.trim().to_lowercase().as_str() {
            "realtime" => Some(Self::Realtime),
            "hourly" if hours > 0 => Some(Self::Hourly { hours }),
            _ => None,
        }
    }

    /// Hourly ranges of at least one hour render as bars, everything else
    /// as a line.
    #[must_use]
    pub fn chart_kind(self) -> ChartKind {
        match self {
            Self::Hourly { hours } if hours >= 1 => ChartKind::Bar,
            _ => ChartKind::Line,
        }
    }

    /// A one-hour view is served from raw readings; aggregates would
    /// contain a single bucket.
    #[must_use]
    pub fn source(self, limit: u32) -> HistorySource {
        match self {
            Self::Realtime => HistorySource::Raw {
                hours: REALTIME_HOURS,
                limit,
            },
            Self::Hourly { hours: 1 } => HistorySource::Raw { hours: 1, limit },
            Self::Hourly { hours } => HistorySource::Hourly {
                days: hours.div_ceil(24).max(1),
            },
        }
    }
}
