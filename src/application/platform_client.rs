// Client trait for the remote telemetry platform
use crate::domain::alarm::AlarmRecord;
use crate::domain::telemetry::TelemetrySample;
use async_trait::async_trait;
use std::collections::HashMap;

/// The telemetry keys the dashboard tracks.
pub const TELEMETRY_KEYS: [&str; 5] = [
    "temperature",
    "humidity",
    "light",
    "predicted_temp",
    "predicted_humid",
];

/// Sample arrays keyed by telemetry key, as returned by the platform.
pub type KeyedSamples = HashMap<String, Vec<TelemetrySample>>;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Login rejected or unreachable. Fatal to session bootstrap; there is
    /// no retry or token refresh.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A telemetry or alarm request failed. Recovered by skipping that
    /// tick's contribution.
    #[error("request for {endpoint} failed: {reason}")]
    Fetch {
        endpoint: &'static str,
        reason: String,
    },

    /// The platform answered with an unexpected shape. Treated as absence
    /// of that data for the cycle.
    #[error("malformed platform response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Exchange a credential pair for a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<String, PlatformError>;

    /// Fetch all samples for the given keys over `[start_ts, end_ts]`
    /// (epoch millis). Keys without data are absent from the map.
    async fn fetch_timeseries_range(
        &self,
        token: &str,
        device_id: &str,
        keys: &[&str],
        start_ts: i64,
        end_ts: i64,
    ) -> Result<KeyedSamples, PlatformError>;

    /// Fetch the single most recent sample per key.
    async fn fetch_latest(
        &self,
        token: &str,
        device_id: &str,
        keys: &[&str],
    ) -> Result<KeyedSamples, PlatformError>;

    /// Fetch the most recent alarms for the device, newest first.
    async fn fetch_alarms(
        &self,
        token: &str,
        device_id: &str,
    ) -> Result<Vec<AlarmRecord>, PlatformError>;
}
