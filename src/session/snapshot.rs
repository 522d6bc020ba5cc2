use serde::Serialize;

use crate::aggregate::{DailyRollup, SeriesPoint};
use crate::gateway::{CurrentConditions, ForecastSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// UV and air-quality readings, fetched once per cycle from the
/// current-conditions coordinates (never re-derived per sample).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentalIndices {
    pub uv_index: f64,
    /// Provider scale, 1-5.
    pub air_quality_index: u8,
}

/// The complete set of derived view data for one fetch cycle. Immutable once
/// published; a newer snapshot supersedes it wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// The requested city name, trimmed. Empty until the first request.
    pub city: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentConditions>,
    pub hourly: Vec<ForecastSample>,
    pub daily: Vec<DailyRollup>,
    pub temperature_series: Vec<SeriesPoint>,
    pub humidity_series: Vec<SeriesPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<EnvironmentalIndices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_meters: Option<u32>,
}

impl Snapshot {
    pub(crate) fn empty(city: &str, status: SessionStatus) -> Self {
        Self {
            city: city.to_string(),
            status,
            error_message: None,
            current: None,
            hourly: Vec::new(),
            daily: Vec::new(),
            temperature_series: Vec::new(),
            humidity_series: Vec::new(),
            indices: None,
            visibility_meters: None,
        }
    }

    pub(crate) fn idle() -> Self {
        Self::empty("", SessionStatus::Idle)
    }

    pub(crate) fn loading(city: &str) -> Self {
        Self::empty(city, SessionStatus::Loading)
    }

    /// Failed cycle: prior data is discarded, only the requested city and the
    /// failure message remain.
    pub(crate) fn error(city: &str, message: String) -> Self {
        let mut snapshot = Self::empty(city, SessionStatus::Error);
        snapshot.error_message = Some(message);
        snapshot
    }

    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }
}
