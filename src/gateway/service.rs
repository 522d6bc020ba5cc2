use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::models::*;

const OPENWEATHERMAP_API_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Failed to reach weather provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Weather provider error: {0}")]
    Provider(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Everything except an unresolvable city is transient; callers may
    /// re-issue the same request.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::CityNotFound(_))
    }
}

/// The four remote read operations the session depends on. Implemented by
/// [`OpenWeatherGateway`]; the seam exists so the session can be exercised
/// against a scripted provider.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_conditions(&self, city: &str) -> Result<CurrentConditions, GatewayError>;

    /// Forecast samples in provider order (chronological ascending).
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastSample>, GatewayError>;

    /// Air quality index (1-5) for the coordinates.
    async fn air_quality(&self, lat: f64, lon: f64) -> Result<u8, GatewayError>;

    async fn uv_index(&self, lat: f64, lon: f64) -> Result<f64, GatewayError>;
}

/// Thin wrapper over the OpenWeatherMap read endpoints. One round trip per
/// call, no retries, no caching.
pub struct OpenWeatherGateway {
    client: Client,
    api_key: String,
    base_url: String,
    units: String,
}

impl OpenWeatherGateway {
    pub fn new(client: Client, api_key: &str, units: &str) -> Self {
        Self::with_base_url(client, api_key, units, OPENWEATHERMAP_API_URL)
    }

    /// Construct against a custom base URL (used by tests to point at a mock
    /// server).
    pub fn with_base_url(client: Client, api_key: &str, units: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            units: units.to_string(),
        }
    }

    async fn provider_error(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let error: ProviderErrorBody = response.json().await.unwrap_or(ProviderErrorBody {
            message: format!("HTTP {}", status),
        });
        GatewayError::Provider(error.message)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherGateway {
    async fn current_conditions(&self, city: &str) -> Result<CurrentConditions, GatewayError> {
        tracing::debug!(city = %city, "Fetching current conditions");

        let response = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[("q", city), ("appid", &self.api_key), ("units", &self.units)])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "Received current-weather response");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::CityNotFound(city.to_string()));
        }
        if !status.is_success() {
            return Err(Self::provider_error(response).await);
        }

        let data: CurrentWeatherPayload = response.json().await?;

        let condition = data.weather.first().ok_or_else(|| {
            GatewayError::InvalidResponse("no weather condition in response".to_string())
        })?;

        let conditions = CurrentConditions {
            city: data.name,
            country: data.sys.country,
            lat: data.coord.lat,
            lon: data.coord.lon,
            temperature_c: data.main.temp,
            feels_like_c: data.main.feels_like,
            humidity_pct: data.main.humidity,
            pressure_hpa: data.main.pressure,
            wind_speed: data.wind.speed,
            wind_direction_deg: data.wind.deg,
            visibility_meters: data.visibility,
            sunrise_utc: data.sys.sunrise,
            sunset_utc: data.sys.sunset,
            timezone_offset_secs: data.timezone,
            condition: condition.main.clone(),
            description: condition.description.clone(),
            icon: condition.icon.clone(),
            rain_volume_mm: data.rain.as_ref().and_then(PrecipitationVolume::volume_mm),
        };

        tracing::info!(
            city = %conditions.city,
            temp = %conditions.temperature_c,
            "Current conditions fetched"
        );

        Ok(conditions)
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastSample>, GatewayError> {
        tracing::debug!(city = %city, "Fetching forecast");

        let response = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[("q", city), ("appid", &self.api_key), ("units", &self.units)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::CityNotFound(city.to_string()));
        }
        if !status.is_success() {
            return Err(Self::provider_error(response).await);
        }

        let data: ForecastPayload = response.json().await?;
        let samples: Vec<ForecastSample> =
            data.list.into_iter().map(ForecastSample::from).collect();

        tracing::info!(city = %city, samples = samples.len(), "Forecast fetched");

        Ok(samples)
    }

    async fn air_quality(&self, lat: f64, lon: f64) -> Result<u8, GatewayError> {
        tracing::debug!(lat = %lat, lon = %lon, "Fetching air quality");

        let response = self
            .client
            .get(format!("{}/air_pollution", self.base_url))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let data: AirPollutionPayload = response.json().await?;

        data.list
            .first()
            .map(|entry| entry.main.aqi)
            .ok_or_else(|| {
                GatewayError::InvalidResponse("air quality response contained no entries".to_string())
            })
    }

    async fn uv_index(&self, lat: f64, lon: f64) -> Result<f64, GatewayError> {
        tracing::debug!(lat = %lat, lon = %lon, "Fetching UV index");

        let response = self
            .client
            .get(format!("{}/uvi", self.base_url))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let data: UvIndexPayload = response.json().await?;
        Ok(data.value)
    }
}
