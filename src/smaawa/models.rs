use serde::{Deserialize, Deserializer, Serialize};

/// Response from `?action=devices`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    /// Seconds since the device last reported, computed upstream
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_seen_seconds: Option<f64>,
    /// Status as reported upstream. Not trusted for liveness.
    #[serde(default)]
    pub status: Option<String>,
}

/// Response from `?action=latest`.
///
/// The record is usually wrapped in `data`, but some deployments return it
/// bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LatestResponse {
    Wrapped { data: SampleRecord },
    Bare(SampleRecord),
}

impl LatestResponse {
    #[must_use]
    pub fn into_record(self) -> SampleRecord {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Response from `?action=history` and `?action=hourly_history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub data: Option<Vec<SampleRecord>>,
}

impl HistoryResponse {
    /// Records in upstream order. A missing `data` field is an empty window.
    #[must_use]
    pub fn into_records(self) -> Vec<SampleRecord> {
        self.data.unwrap_or_default()
    }
}

/// A single upstream record: either a raw reading (`receivedAt`, `distance`,
/// `rate`, `battery`) or an hourly aggregate (`hour_timestamp_utc`,
/// `avg_distance`).
///
/// Every numeric field accepts a JSON number or a numeric string. Anything
/// else deserializes to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(rename = "receivedAt", default, deserialize_with = "lenient_f64")]
    pub received_at: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hour_timestamp_utc: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub timestamp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_distance: Option<f64>,
    /// Device-reported level delta per reporting cycle
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub battery: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_seen_seconds: Option<f64>,
}

/// Cadence of the source that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Raw,
    Hourly,
}

impl SampleRecord {
    /// Hourly aggregates are recognized by their bucket timestamp.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        if self.hour_timestamp_utc.is_some() {
            RecordKind::Hourly
        } else {
            RecordKind::Raw
        }
    }

    /// Epoch seconds used for ordering. The hourly bucket timestamp takes
    /// precedence when both are present.
    #[must_use]
    pub fn time_key(&self) -> Option<f64> {
        self.hour_timestamp_utc.or(self.received_at)
    }

    /// Level in cm from the field matching the record kind.
    #[must_use]
    pub fn level(&self) -> Option<f64> {
        match self.kind() {
            RecordKind::Hourly => self.avg_distance,
            RecordKind::Raw => self.distance,
        }
    }

    /// Time of the measurement for display purposes.
    #[must_use]
    pub fn measured_at(&self) -> Option<f64> {
        self.received_at.or(self.timestamp)
    }
}

/// Deserialize a number that may be encoded as a JSON number or a string.
///
/// Strings are read like a leading-prefix float parse: `"12.5cm"` is `12.5`,
/// `"abc"` is `None`. Non-finite results are `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

/// Coerce a JSON value to a finite `f64`.
#[must_use]
pub fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_leading_f64(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse the longest numeric prefix of `s` after leading whitespace.
#[must_use]
pub fn parse_leading_f64(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
