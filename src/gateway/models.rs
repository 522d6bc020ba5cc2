use serde::{Deserialize, Serialize};

// ============================================================================
// Raw OpenWeatherMap payloads (Internal)
// These structs deserialize the raw API responses; not all fields are used
// ============================================================================

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct CurrentWeatherPayload {
    pub coord: Coord,
    pub weather: Vec<ConditionInfo>,
    pub main: MainReadings,
    pub wind: WindInfo,
    pub visibility: Option<u32>,
    pub rain: Option<PrecipitationVolume>,
    pub dt: i64,
    pub sys: SysInfo,
    /// Shift from UTC in seconds for the location.
    pub timezone: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConditionInfo {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: u32,
    pub humidity: u32,
}

#[derive(Debug, Deserialize)]
pub struct WindInfo {
    pub speed: f64,
    pub deg: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SysInfo {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Rain volume block; the provider keys it by accumulation window.
#[derive(Debug, Deserialize)]
pub struct PrecipitationVolume {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

impl PrecipitationVolume {
    /// First present accumulation window, in millimeters.
    pub fn volume_mm(&self) -> Option<f64> {
        self.three_hours.or(self.one_hour)
    }
}

/// Response from the 5-day/3-hour forecast endpoint.
#[derive(Debug, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: ForecastMain,
    pub weather: Vec<ConditionInfo>,
    pub rain: Option<PrecipitationVolume>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub humidity: u32,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionPayload {
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    pub main: AqiReading,
}

#[derive(Debug, Deserialize)]
pub struct AqiReading {
    pub aqi: u8,
}

#[derive(Debug, Deserialize)]
pub struct UvIndexPayload {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    pub message: String,
}

// ============================================================================
// Domain models (what the rest of the crate consumes)
// ============================================================================

/// Current-weather snapshot for one location, normalized from the provider
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u32,
    pub pressure_hpa: u32,
    pub wind_speed: f64,
    pub wind_direction_deg: Option<u32>,
    pub visibility_meters: Option<u32>,
    pub sunrise_utc: i64,
    pub sunset_utc: i64,
    pub timezone_offset_secs: i32,
    pub condition: String,
    pub description: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_volume_mm: Option<f64>,
}

/// One 3-hour-resolution forecast observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSample {
    pub timestamp_utc: i64,
    pub temperature_c: f64,
    pub humidity_pct: u32,
    /// Rain accumulation over the 3-hour window; absent in the payload means 0.
    pub rain_volume_mm: f64,
    pub icon: String,
    pub condition: String,
}

impl From<ForecastEntry> for ForecastSample {
    fn from(entry: ForecastEntry) -> Self {
        let condition = entry.weather.first();
        ForecastSample {
            timestamp_utc: entry.dt,
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity,
            rain_volume_mm: entry
                .rain
                .as_ref()
                .and_then(PrecipitationVolume::volume_mm)
                .unwrap_or(0.0),
            icon: condition.map(|c| c.icon.clone()).unwrap_or_default(),
            condition: condition.map(|c| c.main.clone()).unwrap_or_default(),
        }
    }
}
