//! Session state machine: owns the latest [`Snapshot`], runs fetch cycles
//! through the gateway and the aggregator, and guarantees that only the most
//! recently requested city's outcome is ever published (last request wins).

mod snapshot;

pub use snapshot::{EnvironmentalIndices, SessionStatus, Snapshot};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono_tz::Tz;
use tokio::sync::watch;

use crate::aggregate;
use crate::gateway::{GatewayError, WeatherProvider};

pub struct WeatherSession {
    provider: Arc<dyn WeatherProvider>,
    /// Viewer timezone used for display times and day partitioning.
    timezone: Tz,
    /// Fetch-cycle generation counter; completions carrying a stale token are
    /// discarded.
    generation: AtomicU64,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
}

impl WeatherSession {
    pub fn new(provider: Arc<dyn WeatherProvider>, timezone: Tz) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Snapshot::idle()));
        Self {
            provider,
            timezone,
            generation: AtomicU64::new(0),
            snapshot_tx,
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot replacements. Each fetch cycle publishes a
    /// Loading snapshot followed by a Ready or Error one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Start a fetch cycle for `name`. Blank input, or a re-search of the city
    /// that is already loaded or loading (trimmed, case-insensitive), is
    /// silently ignored. A call that starts while an older cycle is in flight
    /// supersedes it.
    pub async fn request_city(&self, name: &str) {
        let city = name.trim();
        if city.is_empty() {
            return;
        }

        {
            let latest = self.snapshot_tx.borrow();
            let in_progress_or_loaded =
                matches!(latest.status, SessionStatus::Loading | SessionStatus::Ready);
            if in_progress_or_loaded && latest.city.to_lowercase() == city.to_lowercase() {
                tracing::debug!(city = %city, "City already requested, skipping fetch");
                return;
            }
        }

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(token, Snapshot::loading(city));
        tracing::info!(city = %city, "Weather fetch cycle started");

        match self.run_cycle(city).await {
            Ok(snapshot) => {
                if self.publish(token, snapshot) {
                    tracing::info!(city = %city, "Weather fetch cycle completed");
                }
            }
            Err(err) => {
                tracing::error!(city = %city, error = %err, "Weather fetch cycle failed");
                self.publish(token, Snapshot::error(city, err.to_string()));
            }
        }
    }

    /// One full fetch cycle: current conditions and forecast concurrently,
    /// then the coordinate-dependent indices, then aggregation.
    async fn run_cycle(&self, city: &str) -> Result<Snapshot, GatewayError> {
        let (current, samples) = tokio::try_join!(
            self.provider.current_conditions(city),
            self.provider.forecast(city),
        )?;

        let (air_quality_index, uv_index) = tokio::try_join!(
            self.provider.air_quality(current.lat, current.lon),
            self.provider.uv_index(current.lat, current.lon),
        )?;

        let hourly = aggregate::hourly_slice(&samples);
        let (temperature_series, humidity_series) = aggregate::metric_series(&samples, self.timezone);
        let daily = aggregate::daily_rollups(&samples, self.timezone);

        Ok(Snapshot {
            city: city.to_string(),
            status: SessionStatus::Ready,
            error_message: None,
            visibility_meters: current.visibility_meters,
            indices: Some(EnvironmentalIndices {
                uv_index,
                air_quality_index,
            }),
            current: Some(current),
            hourly,
            daily,
            temperature_series,
            humidity_series,
        })
    }

    /// Swap in `snapshot` unless a newer request has superseded `token`.
    /// The generation check runs inside the watch sender's modify closure, so
    /// a stale completion can never overwrite a newer snapshot.
    fn publish(&self, token: u64, snapshot: Snapshot) -> bool {
        let mut published = false;
        self.snapshot_tx.send_if_modified(|slot| {
            if self.generation.load(Ordering::SeqCst) == token {
                *slot = Arc::new(snapshot);
                published = true;
            } else {
                tracing::debug!(token, "Discarding superseded fetch result");
            }
            published
        });
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CurrentConditions, ForecastSample};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    const UTC: Tz = chrono_tz::UTC;

    /// Scripted stand-in for the gateway: fixed data per city, optional
    /// per-city latency, and a cycle counter.
    #[derive(Default)]
    struct ScriptedProvider {
        delays: HashMap<String, Duration>,
        failing: HashMap<String, &'static str>,
        sample_count: usize,
        cycles: AtomicUsize,
    }

    impl ScriptedProvider {
        fn with_samples(sample_count: usize) -> Self {
            Self {
                sample_count,
                ..Self::default()
            }
        }

        fn conditions(city: &str) -> CurrentConditions {
            CurrentConditions {
                city: city.to_string(),
                country: "XX".to_string(),
                lat: 10.0,
                lon: 20.0,
                temperature_c: city.len() as f64,
                feels_like_c: city.len() as f64,
                humidity_pct: 55,
                pressure_hpa: 1012,
                wind_speed: 3.1,
                wind_direction_deg: Some(90),
                visibility_meters: Some(9000),
                sunrise_utc: 1_700_000_000,
                sunset_utc: 1_700_040_000,
                timezone_offset_secs: 0,
                condition: "Clouds".to_string(),
                description: "scattered clouds".to_string(),
                icon: "03d".to_string(),
                rain_volume_mm: None,
            }
        }

        async fn stall(&self, city: &str) {
            if let Some(delay) = self.delays.get(city) {
                tokio::time::sleep(*delay).await;
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn current_conditions(&self, city: &str) -> Result<CurrentConditions, GatewayError> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            self.stall(city).await;
            if let Some(message) = self.failing.get(city) {
                return Err(GatewayError::Provider(message.to_string()));
            }
            Ok(Self::conditions(city))
        }

        async fn forecast(&self, city: &str) -> Result<Vec<ForecastSample>, GatewayError> {
            self.stall(city).await;
            Ok((0..self.sample_count)
                .map(|i| ForecastSample {
                    timestamp_utc: 1_700_006_400 + i as i64 * 10_800,
                    temperature_c: 15.0 + i as f64,
                    humidity_pct: 60,
                    rain_volume_mm: 0.2,
                    icon: "10d".to_string(),
                    condition: "Rain".to_string(),
                })
                .collect())
        }

        async fn air_quality(&self, _lat: f64, _lon: f64) -> Result<u8, GatewayError> {
            Ok(2)
        }

        async fn uv_index(&self, _lat: f64, _lon: f64) -> Result<f64, GatewayError> {
            Ok(4.5)
        }
    }

    fn session_with(provider: ScriptedProvider) -> WeatherSession {
        WeatherSession::new(Arc::new(provider), UTC)
    }

    #[tokio::test]
    async fn starts_idle_and_empty() {
        let session = session_with(ScriptedProvider::with_samples(0));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.city.is_empty());
        assert!(snapshot.current.is_none());
    }

    #[tokio::test]
    async fn successful_cycle_publishes_ready_snapshot() {
        let session = session_with(ScriptedProvider::with_samples(16));
        session.request_city("  London ").await;

        let snapshot = session.snapshot();
        assert!(snapshot.is_ready());
        assert_eq!(snapshot.city, "London");
        assert_eq!(snapshot.hourly.len(), 8);
        assert_eq!(snapshot.temperature_series.len(), 8);
        assert_eq!(snapshot.humidity_series.len(), 8);
        assert_eq!(snapshot.daily.len(), 3);
        assert_eq!(snapshot.visibility_meters, Some(9000));

        let indices = snapshot.indices.expect("indices populated when ready");
        assert_eq!(indices.air_quality_index, 2);
        assert_eq!(indices.uv_index, 4.5);

        let current = snapshot.current.as_ref().expect("current populated");
        assert_eq!(current.city, "London");
    }

    #[tokio::test]
    async fn empty_forecast_still_ready_with_empty_views() {
        let session = session_with(ScriptedProvider::with_samples(0));
        session.request_city("London").await;

        let snapshot = session.snapshot();
        assert!(snapshot.is_ready());
        assert!(snapshot.hourly.is_empty());
        assert!(snapshot.daily.is_empty());
        assert!(snapshot.temperature_series.is_empty());
    }

    #[tokio::test]
    async fn failure_discards_prior_data_and_keeps_city() {
        let mut provider = ScriptedProvider::with_samples(8);
        provider
            .failing
            .insert("Gotham".to_string(), "upstream unavailable");
        let session = session_with(provider);

        session.request_city("London").await;
        assert!(session.snapshot().is_ready());

        session.request_city("Gotham").await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(snapshot.city, "Gotham");
        assert_eq!(
            snapshot.error_message.as_deref(),
            Some("Weather provider error: upstream unavailable")
        );
        assert!(snapshot.current.is_none());
        assert!(snapshot.hourly.is_empty());
        assert!(snapshot.indices.is_none());
    }

    #[tokio::test]
    async fn repeated_request_for_loaded_city_runs_one_fetch_cycle() {
        let provider = Arc::new(ScriptedProvider::with_samples(8));
        let session = WeatherSession::new(provider.clone(), UTC);

        session.request_city("London").await;
        session.request_city("london").await;
        session.request_city("  London ").await;

        assert!(session.snapshot().is_ready());
        assert_eq!(provider.cycles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let provider = Arc::new(ScriptedProvider::with_samples(8));
        let session = WeatherSession::new(provider.clone(), UTC);

        session.request_city("   ").await;
        assert_eq!(session.snapshot().status, SessionStatus::Idle);
        assert_eq!(provider.cycles.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn error_then_same_city_retries() {
        let mut scripted = ScriptedProvider::with_samples(8);
        scripted.failing.insert("London".to_string(), "boom");
        let provider = Arc::new(scripted);
        let session = WeatherSession::new(provider.clone(), UTC);

        session.request_city("London").await;
        assert_eq!(session.snapshot().status, SessionStatus::Error);

        session.request_city("London").await;
        assert_eq!(provider.cycles.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn late_response_for_superseded_city_is_discarded() {
        let mut scripted = ScriptedProvider::with_samples(8);
        scripted
            .delays
            .insert("Paris".to_string(), Duration::from_millis(80));
        let session = Arc::new(WeatherSession::new(Arc::new(scripted), UTC));

        let slow = {
            let session = session.clone();
            tokio::spawn(async move { session.request_city("Paris").await })
        };
        // Let the Paris cycle start before superseding it.
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.request_city("Tokyo").await;

        let tokyo = session.snapshot();
        assert!(tokyo.is_ready());
        assert_eq!(tokyo.city, "Tokyo");

        // Paris resolves after Tokyo; its result must never surface.
        slow.await.expect("paris task");
        let final_snapshot = session.snapshot();
        assert_eq!(final_snapshot.city, "Tokyo");
        assert!(final_snapshot.is_ready());
        assert_eq!(
            final_snapshot.current.as_ref().map(|c| c.temperature_c),
            Some("Tokyo".len() as f64)
        );
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_ready() {
        let session = session_with(ScriptedProvider::with_samples(8));
        let mut rx = session.subscribe();

        session.request_city("London").await;

        // The receiver coalesces to the latest value; after the cycle it must
        // hold the Ready snapshot.
        rx.changed().await.expect("sender alive");
        let snapshot = rx.borrow().clone();
        assert!(snapshot.is_ready());
        assert_eq!(snapshot.city, "London");
    }
}
