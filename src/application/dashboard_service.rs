// Dashboard service - Session bootstrap and per-tick ingestion
use crate::application::history_loader;
use crate::application::platform_client::{
    KeyedSamples, PlatformClient, PlatformError, TELEMETRY_KEYS,
};
use crate::domain::alarm::AlarmWatcher;
use crate::domain::dashboard::{CurrentReadings, DashboardSnapshot};
use crate::domain::telemetry::{
    ChartPoint, MeasuredValues, PredictedValues, SeriesBuffer, TelemetrySample,
};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fixed poll cadence.
pub const POLL_PERIOD: std::time::Duration = std::time::Duration::from_millis(5000);

/// Consecutive fully-failed ticks before the snapshot reports stale data.
pub const STALE_AFTER_FAILURES: u32 = 3;

/// Bearer token for the life of the dashboard session. Populated once by
/// `bootstrap`; never refreshed.
#[derive(Debug, Default)]
struct Session {
    token: Option<String>,
}

#[derive(Default)]
struct DashboardState {
    session: Session,
    measured: SeriesBuffer,
    predicted: SeriesBuffer,
    readings: CurrentReadings,
    alarms: AlarmWatcher,
    last_poll: Option<DateTime<Local>>,
    failed_ticks: u32,
}

/// Owns all mutable dashboard state. Every mutation goes through
/// `bootstrap` or `poll_once`, and each tick applies its updates inside a
/// single lock hold so a renderer never observes a half-updated series.
pub struct DashboardService {
    client: Arc<dyn PlatformClient>,
    device_id: String,
    state: Mutex<DashboardState>,
}

impl DashboardService {
    pub fn new(client: Arc<dyn PlatformClient>, device_id: String) -> Self {
        Self {
            client,
            device_id,
            state: Mutex::new(DashboardState::default()),
        }
    }

    /// Log in and backfill both series from the look-back window. An auth
    /// failure here is fatal to the whole session; nothing retries it.
    pub async fn bootstrap(&self, username: &str, password: &str) -> Result<(), PlatformError> {
        let token = self.client.login(username, password).await?;
        let (measured, predicted) =
            history_loader::load_history(self.client.as_ref(), &token, &self.device_id).await?;

        let mut state = self.state.lock().await;
        if let Some(values) = measured.last().and_then(|p| p.measured.clone()) {
            state.readings = CurrentReadings {
                temperature: values.temperature,
                humidity: values.humidity,
                light: values.light,
            };
        }
        state.measured = measured;
        state.predicted = predicted;
        state.session.token = Some(token);
        state.last_poll = Some(Local::now());
        Ok(())
    }

    /// One poll tick: fetch the latest sample per key and the newest alarm,
    /// then apply whatever arrived. Individual fetch failures are logged and
    /// swallowed; the tick only counts as failed when nothing succeeded.
    /// Returns whether the tick contributed anything.
    pub async fn poll_once(&self) -> bool {
        let token = { self.state.lock().await.session.token.clone() };
        let Some(token) = token else {
            tracing::debug!("no session token, skipping poll tick");
            return false;
        };

        let latest = self
            .client
            .fetch_latest(&token, &self.device_id, &TELEMETRY_KEYS)
            .await;
        let alarms = self.client.fetch_alarms(&token, &self.device_id).await;

        let mut state = self.state.lock().await;
        let mut succeeded = false;

        match latest {
            Ok(series) => {
                succeeded = true;
                Self::apply_latest(&mut state, &series);
            }
            Err(e) => tracing::warn!("telemetry poll failed: {e}"),
        }

        match alarms {
            Ok(records) => {
                succeeded = true;
                let newest = records.into_iter().next();
                if state.alarms.observe(newest) {
                    if let Some(alarm) = state.alarms.current() {
                        tracing::info!(
                            id = %alarm.id,
                            status = %alarm.status,
                            severity = %alarm.severity,
                            "alarm state changed"
                        );
                    }
                }
            }
            Err(e) => tracing::warn!("alarm poll failed: {e}"),
        }

        if succeeded {
            state.last_poll = Some(Local::now());
            state.failed_ticks = 0;
        } else {
            state.failed_ticks += 1;
        }
        succeeded
    }

    /// Merge a `limit=1` response into the buffers. A point is built only
    /// when every member of its group is present; a partial group
    /// contributes nothing this tick.
    fn apply_latest(state: &mut DashboardState, series: &KeyedSamples) {
        let temp = newest(series, "temperature");
        let hum = newest(series, "humidity");
        let light = newest(series, "light");
        if let (Some(t), Some(h), Some(l)) = (temp, hum, light) {
            let values = MeasuredValues {
                temperature: t.value_f64(),
                humidity: h.value_f64(),
                light: l.value_f64(),
            };
            state.readings = CurrentReadings {
                temperature: values.temperature,
                humidity: values.humidity,
                light: values.light,
            };
            state.measured.append(ChartPoint::measured(t.ts, values));
        }

        let ptemp = newest(series, "predicted_temp");
        let phum = newest(series, "predicted_humid");
        if let (Some(t), Some(h)) = (ptemp, phum) {
            let values = PredictedValues {
                temperature: t.value_f64(),
                humidity: h.value_f64(),
            };
            state.predicted.append(ChartPoint::predicted(t.ts, values));
        }
    }

    /// Consistent view of the dashboard for the rendering layer.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.lock().await;
        DashboardSnapshot {
            measured: state.measured.points(),
            predicted: state.predicted.points(),
            readings: state.readings.clone(),
            alarm: state.alarms.current().cloned(),
            last_poll: state.last_poll.map(|t| t.format("%H:%M:%S").to_string()),
            stale: state.failed_ticks >= STALE_AFTER_FAILURES,
        }
    }
}

fn newest<'a>(series: &'a KeyedSamples, key: &str) -> Option<&'a TelemetrySample> {
    series.get(key).and_then(|samples| samples.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alarm::AlarmRecord;
    use crate::domain::telemetry::SERIES_CAPACITY;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Scripted platform: each poll pops the next canned response.
    #[derive(Default)]
    struct ScriptedClient {
        login_ok: bool,
        latest: StdMutex<VecDeque<Result<KeyedSamples, PlatformError>>>,
        alarms: StdMutex<VecDeque<Result<Vec<AlarmRecord>, PlatformError>>>,
    }

    impl ScriptedClient {
        fn push_latest(&self, response: Result<KeyedSamples, PlatformError>) {
            self.latest.lock().unwrap().push_back(response);
        }

        fn push_alarms(&self, response: Result<Vec<AlarmRecord>, PlatformError>) {
            self.alarms.lock().unwrap().push_back(response);
        }
    }

    fn fetch_err(endpoint: &'static str) -> PlatformError {
        PlatformError::Fetch {
            endpoint,
            reason: "connection reset".to_string(),
        }
    }

    #[async_trait]
    impl PlatformClient for ScriptedClient {
        async fn login(&self, _: &str, _: &str) -> Result<String, PlatformError> {
            if self.login_ok {
                Ok("token-1".to_string())
            } else {
                Err(PlatformError::Auth("status 401".to_string()))
            }
        }

        async fn fetch_timeseries_range(
            &self,
            _: &str,
            _: &str,
            _: &[&str],
            _: i64,
            _: i64,
        ) -> Result<KeyedSamples, PlatformError> {
            Ok(KeyedSamples::new())
        }

        async fn fetch_latest(
            &self,
            _: &str,
            _: &str,
            _: &[&str],
        ) -> Result<KeyedSamples, PlatformError> {
            self.latest
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(KeyedSamples::new()))
        }

        async fn fetch_alarms(&self, _: &str, _: &str) -> Result<Vec<AlarmRecord>, PlatformError> {
            self.alarms
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn latest_response(ts: i64, keys: &[&str]) -> KeyedSamples {
        keys.iter()
            .map(|k| (k.to_string(), vec![TelemetrySample::new(ts, "42")]))
            .collect()
    }

    fn alarm(id: &str, status: &str) -> AlarmRecord {
        AlarmRecord {
            id: id.to_string(),
            name: "High Temperature".to_string(),
            status: status.to_string(),
            severity: "CRITICAL".to_string(),
        }
    }

    async fn bootstrapped(client: Arc<ScriptedClient>) -> DashboardService {
        let service = DashboardService::new(client, "device-1".to_string());
        service.bootstrap("user", "pass").await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_bootstrap_auth_failure_is_fatal() {
        let client = Arc::new(ScriptedClient::default());
        let service = DashboardService::new(client, "device-1".to_string());

        let err = service.bootstrap("user", "bad-pass").await.unwrap_err();
        assert!(matches!(err, PlatformError::Auth(_)));
        assert!(!service.poll_once().await, "no token, tick must be skipped");
    }

    #[tokio::test]
    async fn test_poll_appends_full_groups() {
        let client = Arc::new(ScriptedClient {
            login_ok: true,
            ..Default::default()
        });
        client.push_latest(Ok(latest_response(1000, &TELEMETRY_KEYS)));
        let service = bootstrapped(client).await;

        assert!(service.poll_once().await);
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.measured.len(), 1);
        assert_eq!(snapshot.predicted.len(), 1);
        assert_eq!(snapshot.readings.temperature, 42.0);
        assert!(snapshot.last_poll.is_some());
    }

    #[tokio::test]
    async fn test_poll_skips_partial_measured_group() {
        let client = Arc::new(ScriptedClient {
            login_ok: true,
            ..Default::default()
        });
        // Light missing: no measured point. Predicted pair complete.
        client.push_latest(Ok(latest_response(
            1000,
            &["temperature", "humidity", "predicted_temp", "predicted_humid"],
        )));
        let service = bootstrapped(client).await;

        service.poll_once().await;
        let snapshot = service.snapshot().await;
        assert!(snapshot.measured.is_empty());
        assert_eq!(snapshot.predicted.len(), 1);
    }

    #[tokio::test]
    async fn test_poll_suppresses_repeated_timestamp() {
        let client = Arc::new(ScriptedClient {
            login_ok: true,
            ..Default::default()
        });
        client.push_latest(Ok(latest_response(1000, &TELEMETRY_KEYS)));
        client.push_latest(Ok(latest_response(1000, &TELEMETRY_KEYS)));
        client.push_latest(Ok(latest_response(2000, &TELEMETRY_KEYS)));
        let service = bootstrapped(client).await;

        service.poll_once().await;
        service.poll_once().await;
        assert_eq!(service.snapshot().await.measured.len(), 1);

        service.poll_once().await;
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.measured.len(), 2);
        assert_eq!(snapshot.measured.last().map(|p| p.ts), Some(2000));
    }

    #[tokio::test]
    async fn test_poll_window_never_exceeds_capacity() {
        let client = Arc::new(ScriptedClient {
            login_ok: true,
            ..Default::default()
        });
        for i in 0..40 {
            client.push_latest(Ok(latest_response(i * 1000, &TELEMETRY_KEYS)));
        }
        let service = bootstrapped(client).await;

        for _ in 0..40 {
            service.poll_once().await;
        }
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.measured.len(), SERIES_CAPACITY);
        assert_eq!(snapshot.measured.last().map(|p| p.ts), Some(39_000));
    }

    #[tokio::test]
    async fn test_alarm_surfaces_once_per_signature() {
        let client = Arc::new(ScriptedClient {
            login_ok: true,
            ..Default::default()
        });
        client.push_alarms(Ok(vec![alarm("a1", "ACTIVE")]));
        client.push_alarms(Ok(vec![alarm("a1", "ACTIVE")]));
        client.push_alarms(Ok(vec![alarm("a1", "CLEARED")]));
        let service = bootstrapped(client).await;

        service.poll_once().await;
        assert_eq!(
            service.snapshot().await.alarm.map(|a| a.status),
            Some("ACTIVE".to_string())
        );

        service.poll_once().await;
        service.poll_once().await;
        assert_eq!(
            service.snapshot().await.alarm.map(|a| a.status),
            Some("CLEARED".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_failures_are_swallowed_until_stale() {
        let client = Arc::new(ScriptedClient {
            login_ok: true,
            ..Default::default()
        });
        for _ in 0..STALE_AFTER_FAILURES {
            client.push_latest(Err(fetch_err("timeseries")));
            client.push_alarms(Err(fetch_err("alarms")));
        }
        let service = bootstrapped(client.clone()).await;

        for i in 0..STALE_AFTER_FAILURES {
            assert!(!service.poll_once().await);
            let snapshot = service.snapshot().await;
            assert_eq!(snapshot.stale, i + 1 >= STALE_AFTER_FAILURES);
        }

        // A recovered tick clears the indicator.
        client.push_latest(Ok(latest_response(1000, &TELEMETRY_KEYS)));
        assert!(service.poll_once().await);
        assert!(!service.snapshot().await.stale);
    }

    #[tokio::test]
    async fn test_partial_failure_still_counts_as_success() {
        let client = Arc::new(ScriptedClient {
            login_ok: true,
            ..Default::default()
        });
        client.push_latest(Err(fetch_err("timeseries")));
        client.push_alarms(Ok(vec![alarm("a1", "ACTIVE")]));
        let service = bootstrapped(client).await;

        assert!(service.poll_once().await);
        let snapshot = service.snapshot().await;
        assert!(snapshot.measured.is_empty());
        assert!(snapshot.alarm.is_some());
        assert!(!snapshot.stale);
    }
}
