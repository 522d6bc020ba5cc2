//! Skycast — weather dashboard core built on OpenWeatherMap.
//!
//! Three layers, leaf-first:
//! - [`gateway`] wraps the four provider read operations (current weather,
//!   forecast, air quality, UV index) behind a single error channel.
//! - [`aggregate`] is the pure pipeline that turns the 3-hour forecast feed
//!   into the hourly slice, the chart series, and the 7-day rollups.
//! - [`session`] orchestrates fetch cycles, owns the latest snapshot, and
//!   discards superseded results so the last *request* always wins.
//!
//! Presentation layers consume read-only [`session::Snapshot`] values and
//! drive refetches exclusively through [`session::WeatherSession::request_city`].

pub mod aggregate;
pub mod config;
pub mod gateway;
pub mod session;

pub use config::AppConfig;
pub use gateway::{CurrentConditions, ForecastSample, GatewayError, OpenWeatherGateway, WeatherProvider};
pub use session::{EnvironmentalIndices, SessionStatus, Snapshot, WeatherSession};
