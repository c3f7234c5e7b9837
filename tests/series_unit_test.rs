//! Unit tests for liveness, rate conversion and window metrics.
//!
//! Run with: cargo test --test series_unit_test

use smaawa_monitor::series::liveness::{classify, classify_optional, time_ago};
use smaawa_monitor::series::metrics::{uptime_estimate, BatteryBand, LevelBand};
use smaawa_monitor::series::rate::{format_rate, per_hour, RateTrend};
use smaawa_monitor::series::{DeviceSummary, FleetSummary, Liveness, Thresholds, WindowMetrics};
use smaawa_monitor::smaawa::models::{Device, SampleRecord};

fn device(id: &str, last_seen: Option<f64>) -> Device {
    Device {
        device_id: id.to_string(),
        last_seen_seconds: last_seen,
        status: None,
    }
}

#[test]
fn online_threshold_is_exclusive() {
    assert_eq!(classify(0.0), Liveness::Online);
    assert_eq!(classify(599.0), Liveness::Online);
    assert_eq!(classify(600.0), Liveness::Offline);
    assert_eq!(classify(86_400.0), Liveness::Offline);
}

#[test]
fn unknown_last_seen_counts_as_online() {
    assert_eq!(classify_optional(None), Liveness::Online);
    assert_eq!(classify_optional(Some(601.0)), Liveness::Offline);
}

#[test]
fn time_ago_table() {
    let cases = [
        (0.0, "Just now"),
        (59.0, "Just now"),
        (60.0, "1 min ago"),
        (150.0, "2 mins ago"),
        (3600.0, "1 hour ago"),
        (3.0 * 3600.0 + 59.0, "3 hours ago"),
        (86_400.0, "1 day ago"),
        (6.0 * 86_400.0, "6 days ago"),
        (604_800.0, "1 week ago"),
        (3.0 * 604_800.0, "3 weeks ago"),
        (2_592_000.0, "1 month ago"),
        (5.0 * 2_592_000.0, "5 months ago"),
    ];
    for (secs, expected) in cases {
        assert_eq!(time_ago(secs), expected, "for {secs} s");
    }
}

#[test]
fn offline_devices_get_time_suffix() {
    let online = DeviceSummary::from(&device("dev-1", Some(30.0)));
    assert_eq!(online.liveness, Liveness::Online);
    assert_eq!(online.label, "dev-1");

    let offline = DeviceSummary::from(&device("dev-2", Some(7200.0)));
    assert_eq!(offline.liveness, Liveness::Offline);
    assert_eq!(offline.label, "dev-2 (2 hours ago)");

    let unknown = DeviceSummary::from(&device("dev-3", None));
    assert_eq!(unknown.liveness, Liveness::Online);
    assert_eq!(unknown.label, "dev-3");
}

#[test]
fn fleet_counts_add_up() {
    let summaries: Vec<DeviceSummary> = [
        device("a", Some(10.0)),
        device("b", Some(900.0)),
        device("c", None),
        device("d", Some(100_000.0)),
    ]
    .iter()
    .map(DeviceSummary::from)
    .collect();

    let fleet = FleetSummary::from_devices(&summaries);

    assert_eq!(fleet.total, 4);
    assert_eq!(fleet.online, 2);
    assert_eq!(fleet.offline, 2);
}

#[test]
fn cycle_rate_converts_to_cm_per_hour() {
    assert_eq!(format_rate(per_hour(10.0)), "129.50");
    assert_eq!(format_rate(per_hour(0.0)), "0.00");
    assert_eq!(format_rate(per_hour(-2.78)), "-36.00");
}

#[test]
fn rate_trend_follows_sign() {
    assert_eq!(RateTrend::from_rate(0.5), RateTrend::Charging);
    assert_eq!(RateTrend::from_rate(-0.5), RateTrend::Discharging);
    assert_eq!(RateTrend::from_rate(0.0), RateTrend::Stable);
    assert_eq!(RateTrend::Charging.to_string(), "Charging");
}

#[test]
fn window_metrics_over_mixed_records() {
    let records = vec![
        SampleRecord {
            distance: Some(10.0),
            rate: Some(2.78),
            ..SampleRecord::default()
        },
        SampleRecord {
            distance: None,
            rate: None,
            ..SampleRecord::default()
        },
        SampleRecord {
            distance: Some(30.0),
            rate: Some(-2.78),
            ..SampleRecord::default()
        },
    ];

    let metrics = WindowMetrics::from_records(&records);

    assert_eq!(metrics.data_points, 3);
    // Missing level counts as zero
    assert_eq!(metrics.min_level, Some(0.0));
    assert_eq!(metrics.max_level, Some(30.0));
    assert_eq!(metrics.avg_rate_per_hour, Some(0.0));
}

#[test]
fn window_without_rates_averages_to_zero() {
    let records = vec![SampleRecord {
        distance: Some(12.0),
        ..SampleRecord::default()
    }];

    let metrics = WindowMetrics::from_records(&records);

    assert_eq!(metrics.data_points, 1);
    assert_eq!(metrics.min_level, Some(12.0));
    assert_eq!(metrics.avg_rate_per_hour, Some(0.0));
}

#[test]
fn empty_window_has_no_extrema() {
    let metrics = WindowMetrics::from_records(&[]);
    assert_eq!(metrics, WindowMetrics::default());
    assert_eq!(metrics.min_level, None);
}

#[test]
fn threshold_bands() {
    let t = Thresholds::default();

    assert_eq!(t.battery_band(85.0), BatteryBand::Good);
    assert_eq!(t.battery_band(70.0), BatteryBand::Good);
    assert_eq!(t.battery_band(50.0), BatteryBand::Fair);
    assert_eq!(t.battery_band(29.9), BatteryBand::Critical);

    assert_eq!(t.level_band(250.0), LevelBand::High);
    assert_eq!(t.level_band(100.0), LevelBand::Normal);
    assert_eq!(t.level_band(5.0), LevelBand::Low);
}

#[test]
fn uptime_decays_after_five_minutes() {
    assert_eq!(uptime_estimate(0.0), 100.0);
    assert_eq!(uptime_estimate(299.0), 100.0);
    assert!((uptime_estimate(864.0) - 90.0).abs() < 1e-9);
    assert_eq!(uptime_estimate(1_000_000.0), 0.0);
}
