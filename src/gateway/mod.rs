pub mod models;
mod service;

pub use models::{CurrentConditions, ForecastSample};
pub use service::{GatewayError, OpenWeatherGateway, WeatherProvider};
