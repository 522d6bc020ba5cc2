//! Pure forecast aggregation: turns the flat 3-hour sample sequence into the
//! hourly slice, the per-metric chart series, and the 7-day rollups.
//!
//! Deterministic given the input and an explicit viewer timezone; no I/O.
//! Empty input degrades to empty output, never an error.

pub mod models;

pub use models::{DailyRollup, SeriesPoint};

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use indexmap::IndexMap;

use crate::gateway::ForecastSample;

/// Number of samples shown in the hourly view.
pub const HOURLY_SLICE_LEN: usize = 8;

/// Maximum number of distinct days in the weekly rollup.
pub const DAILY_ROLLUP_CAP: usize = 7;

/// A day whose total rain exceeds this (strictly) raises a rain alert.
pub const RAIN_ALERT_THRESHOLD_MM: f64 = 1.0;

fn to_local(timestamp_utc: i64, tz: Tz) -> DateTime<Tz> {
    DateTime::from_timestamp(timestamp_utc, 0)
        .unwrap_or_default()
        .with_timezone(&tz)
}

/// First `HOURLY_SLICE_LEN` samples in source order. Short inputs are
/// returned as-is, never padded.
pub fn hourly_slice(samples: &[ForecastSample]) -> Vec<ForecastSample> {
    samples.iter().take(HOURLY_SLICE_LEN).cloned().collect()
}

/// Temperature and humidity series for the hourly slice, one point per
/// sample, in slice order.
pub fn metric_series(samples: &[ForecastSample], tz: Tz) -> (Vec<SeriesPoint>, Vec<SeriesPoint>) {
    let len = samples.len().min(HOURLY_SLICE_LEN);
    let mut temperature = Vec::with_capacity(len);
    let mut humidity = Vec::with_capacity(len);

    for sample in samples.iter().take(HOURLY_SLICE_LEN) {
        let display_time = to_local(sample.timestamp_utc, tz).format("%H:%M").to_string();
        temperature.push(SeriesPoint {
            display_time: display_time.clone(),
            value: sample.temperature_c,
        });
        humidity.push(SeriesPoint {
            display_time,
            value: f64::from(sample.humidity_pct),
        });
    }

    (temperature, humidity)
}

/// Per-day statistics over the whole sample sequence, partitioned by local
/// calendar day. Days keep the order in which they first appear in the input
/// and are capped at [`DAILY_ROLLUP_CAP`].
pub fn daily_rollups(samples: &[ForecastSample], tz: Tz) -> Vec<DailyRollup> {
    let mut days: IndexMap<NaiveDate, Vec<&ForecastSample>> = IndexMap::new();
    for sample in samples {
        let date = to_local(sample.timestamp_utc, tz).date_naive();
        days.entry(date).or_default().push(sample);
    }

    days.into_iter()
        .take(DAILY_ROLLUP_CAP)
        .map(|(date, entries)| rollup_day(date, &entries))
        .collect()
}

fn rollup_day(date: NaiveDate, entries: &[&ForecastSample]) -> DailyRollup {
    // Partitioning only emits days with at least one sample.
    let min_temperature_c = entries
        .iter()
        .map(|s| s.temperature_c)
        .fold(f64::INFINITY, f64::min);
    let max_temperature_c = entries
        .iter()
        .map(|s| s.temperature_c)
        .fold(f64::NEG_INFINITY, f64::max);

    let humidity_sum: u32 = entries.iter().map(|s| s.humidity_pct).sum();
    let avg_humidity_pct = (f64::from(humidity_sum) / entries.len() as f64).round() as u32;

    let total_rain_mm: f64 = entries.iter().map(|s| s.rain_volume_mm).sum();

    DailyRollup {
        day_label: date.format("%a").to_string(),
        min_temperature_c,
        max_temperature_c,
        avg_humidity_pct,
        total_rain_mm,
        rain_alert: total_rain_mm > RAIN_ALERT_THRESHOLD_MM,
    }
}
