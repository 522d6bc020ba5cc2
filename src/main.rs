use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skycast::{AppConfig, OpenWeatherGateway, SessionStatus, WeatherSession};

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Create shared HTTP client with connection pooling
fn create_http_client(timeout_secs: u64) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(10)
        .build()?;
    Ok(client)
}

/// Minimal presentation stand-in: fetch one city and print the snapshot.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded successfully");

    let http_client = create_http_client(config.http_timeout_secs)?;
    let gateway = OpenWeatherGateway::with_base_url(
        http_client,
        &config.openweathermap_api_key,
        &config.units,
        &config.api_base_url,
    );
    let session = WeatherSession::new(Arc::new(gateway), config.viewer_timezone()?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let json_output = args.iter().any(|a| a == "--json");
    let city = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| config.default_city.clone());
    session.request_city(&city).await;

    let snapshot = session.snapshot();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
        return Ok(());
    }
    match snapshot.status {
        SessionStatus::Ready => {
            if let Some(current) = &snapshot.current {
                println!(
                    "{}, {}: {:.1}°C (feels like {:.1}°C), {}",
                    current.city,
                    current.country,
                    current.temperature_c,
                    current.feels_like_c,
                    current.description
                );
                println!(
                    "humidity {}%  pressure {} hPa  wind {:.1} m/s  visibility {}",
                    current.humidity_pct,
                    current.pressure_hpa,
                    current.wind_speed,
                    snapshot
                        .visibility_meters
                        .map(|v| format!("{} m", v))
                        .unwrap_or_else(|| "n/a".to_string()),
                );
            }
            if let Some(indices) = snapshot.indices {
                println!(
                    "UV index {:.1}  air quality {}/5",
                    indices.uv_index, indices.air_quality_index
                );
            }

            println!("\nNext hours:");
            for (sample, point) in snapshot.hourly.iter().zip(&snapshot.temperature_series) {
                println!(
                    "  {}  {:>5.1}°C  {}",
                    point.display_time, sample.temperature_c, sample.condition
                );
            }

            println!("\nWeek:");
            for day in &snapshot.daily {
                println!(
                    "  {}  {:>5.1}°C to {:>5.1}°C  humidity {}%  rain {:.1} mm{}",
                    day.day_label,
                    day.min_temperature_c,
                    day.max_temperature_c,
                    day.avg_humidity_pct,
                    day.total_rain_mm,
                    if day.rain_alert { "  [rain alert]" } else { "" },
                );
            }
        }
        SessionStatus::Error => {
            anyhow::bail!(
                "weather lookup for {:?} failed: {}",
                snapshot.city,
                snapshot.error_message.as_deref().unwrap_or("unknown error")
            );
        }
        SessionStatus::Idle | SessionStatus::Loading => {
            anyhow::bail!("no fetch cycle completed for {:?}", city);
        }
    }

    Ok(())
}
