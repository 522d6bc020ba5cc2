use serde::Serialize;

/// One point on a chart time series, keyed by its display time (`%H:%M` in
/// the viewer's timezone).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub display_time: String,
    pub value: f64,
}

/// Aggregated statistics for one local calendar day of forecast samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRollup {
    /// Short weekday name, e.g. "Mon".
    pub day_label: String,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    /// Mean humidity, rounded to the nearest integer.
    pub avg_humidity_pct: u32,
    /// Sum of rain volume over the day's samples.
    pub total_rain_mm: f64,
    /// True when the day's total rain exceeds the alert threshold.
    pub rain_alert: bool,
}
