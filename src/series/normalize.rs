//! Time-series normalization for chart rendering.
//!
//! Upstream history arrives in no particular order and may contain long
//! silences. [`Normalizer::normalize`] turns a batch of records into three
//! parallel sequences (labels, levels, rates) that a line or bar chart can
//! draw directly:
//!
//! - records are sorted by time key (stable, hourly timestamp first),
//! - the rate is the finite difference against the preceding record, in
//!   cm per hour,
//! - a boundary entry with missing values is inserted wherever the gap to
//!   the next record exceeds the cadence threshold, so the renderer breaks
//!   the line instead of interpolating across the outage.
//!
//! The boundary entry does not interrupt the finite-difference chain: the
//! record after a gap still gets its rate from the record before it.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use utoipa::ToSchema;

use crate::smaawa::models::{RecordKind, SampleRecord};

/// Raw devices report roughly every 278 s; 1.5x with margin.
pub const RAW_GAP_THRESHOLD_SECS: f64 = 900.0;

/// Hourly aggregates are 3600 s apart; 1.5x.
pub const HOURLY_GAP_THRESHOLD_SECS: f64 = 5400.0;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Plot-ready output of the normalizer. All three vectors have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct NormalizedSeries {
    /// Display label per entry; boundary entries read `OFFLINE (<duration>)`
    pub labels: Vec<String>,
    /// Level in cm, null for boundaries and unparseable values
    pub levels: Vec<Option<f64>>,
    /// Derived rate in cm/hr, null only for boundaries
    pub rates: Vec<Option<f64>>,
}

impl NormalizedSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, label: String, level: Option<f64>, rate: Option<f64>) {
        self.labels.push(label);
        self.levels.push(level);
        self.rates.push(rate);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    offset: FixedOffset,
}

impl Normalizer {
    /// Labels are rendered in `offset` regardless of the host locale.
    #[must_use]
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    #[must_use]
    pub fn normalize(&self, records: &[SampleRecord]) -> NormalizedSeries {
        let mut timed: Vec<(f64, &SampleRecord)> = Vec::with_capacity(records.len());
        for record in records {
            match record.time_key() {
                Some(time) => timed.push((time, record)),
                None => tracing::debug!(?record, "Dropping record without timestamp"),
            }
        }

        // sort_by is stable: equal timestamps keep upstream order
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut series = NormalizedSeries::default();
        let mut previous: Option<(f64, Option<f64>)> = None;

        for (i, &(time, record)) in timed.iter().enumerate() {
            let kind = record.kind();
            let level = record.level();

            let rate = match previous {
                Some((prev_time, prev_level)) => derived_rate(prev_time, prev_level, time, level),
                None => 0.0,
            };

            series.push(self.label(time, kind), level, Some(rate));
            previous = Some((time, level));

            if let Some(&(next_time, _)) = timed.get(i + 1) {
                let gap = next_time - time;
                if gap > gap_threshold(kind) {
                    series.push(format!("OFFLINE ({})", format_gap(gap)), None, None);
                }
            }
        }

        series
    }

    /// Hourly buckets show date and time, raw readings show time of day
    /// down to the second.
    #[must_use]
    pub fn label(&self, epoch_secs: f64, kind: RecordKind) -> String {
        let pattern = match kind {
            RecordKind::Hourly => "%m/%d, %I:%M %p",
            RecordKind::Raw => "%I:%M:%S %p",
        };
        format_epoch(epoch_secs, self.offset, pattern)
    }
}

/// Render fractional epoch seconds in `offset` using a `strftime` pattern.
#[must_use]
pub fn format_epoch(epoch_secs: f64, offset: FixedOffset, pattern: &str) -> String {
    to_datetime(epoch_secs).map_or_else(
        || "Invalid Date".to_string(),
        |dt| dt.with_timezone(&offset).format(pattern).to_string(),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_datetime(epoch_secs: f64) -> Option<DateTime<chrono::Utc>> {
    if !epoch_secs.is_finite() {
        return None;
    }
    let secs = epoch_secs.floor();
    let nanos = ((epoch_secs - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
}

#[must_use]
pub fn gap_threshold(kind: RecordKind) -> f64 {
    match kind {
        RecordKind::Raw => RAW_GAP_THRESHOLD_SECS,
        RecordKind::Hourly => HOURLY_GAP_THRESHOLD_SECS,
    }
}

/// Level change in cm/hr between two consecutive records. Zero when time
/// does not advance or either level is missing.
#[must_use]
pub fn derived_rate(prev_time: f64, prev_level: Option<f64>, time: f64, level: Option<f64>) -> f64 {
    let elapsed = time - prev_time;
    match (prev_level, level) {
        (Some(prev), Some(current)) if elapsed > 0.0 => {
            let rate = (current - prev) / elapsed * SECONDS_PER_HOUR;
            if rate.is_finite() { rate } else { 0.0 }
        }
        _ => 0.0,
    }
}

/// Minutes below an hour, hours below a day, days beyond.
#[must_use]
pub fn format_gap(gap_secs: f64) -> String {
    if gap_secs < SECONDS_PER_HOUR {
        format!("{}m", (gap_secs / 60.0).floor())
    } else if gap_secs < SECONDS_PER_DAY {
        format!("{:.1}h", gap_secs / SECONDS_PER_HOUR)
    } else {
        format!("{:.1} days", gap_secs / SECONDS_PER_DAY)
    }
}
