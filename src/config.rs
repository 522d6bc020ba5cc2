use chrono_tz::Tz;
use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// OpenWeatherMap API key
    pub openweathermap_api_key: String,

    /// Base URL for the provider API (overridable for testing/proxies)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// City loaded on startup
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Temperature units: metric, imperial, or standard
    #[serde(default = "default_units")]
    pub units: String,

    /// Viewer timezone for display times and day boundaries (IANA name)
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Per-call HTTP timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_city() -> String {
    "New York".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("api_base_url", default_api_base_url())?
            .set_default("default_city", default_city())?
            .set_default("units", default_units())?
            .set_default("timezone", default_timezone())?
            // Load from config file if present
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // Override with environment variables (prefixed with SKYCAST_)
            .add_source(
                Environment::with_prefix("SKYCAST")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse the configured viewer timezone.
    pub fn viewer_timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::Message(format!("unknown timezone: {}", self.timezone)))
    }
}
