// CoreIoT platform client implementation
use crate::application::platform_client::{KeyedSamples, PlatformClient, PlatformError};
use crate::domain::alarm::AlarmRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct CoreIotClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct AlarmPage {
    #[serde(default)]
    data: Vec<RawAlarm>,
}

#[derive(Debug, Deserialize)]
struct RawAlarm {
    id: AlarmId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    severity: String,
}

#[derive(Debug, Deserialize)]
struct AlarmId {
    id: String,
}

impl CoreIotClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn timeseries_url(&self, device_id: &str, keys: &[&str], range: &str) -> String {
        format!(
            "{}/api/plugins/telemetry/DEVICE/{}/values/timeseries?keys={}&{}",
            self.base_url,
            urlencoding::encode(device_id),
            keys.join(","),
            range
        )
    }

    fn alarms_url(&self, device_id: &str) -> String {
        format!(
            "{}/api/alarms?originator={}&pageSize=10&page=0",
            self.base_url,
            urlencoding::encode(device_id)
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        endpoint: &'static str,
    ) -> Result<T, PlatformError> {
        tracing::debug!(endpoint, "fetching from platform");
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| PlatformError::Fetch {
                endpoint,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Fetch {
                endpoint,
                reason: format!("status {status}"),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::Malformed(format!("{endpoint}: {e}")))
    }
}

#[async_trait]
impl PlatformClient for CoreIotClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, PlatformError> {
        let url = format!("{}/api/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| PlatformError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Never echo credentials; the status is all the caller gets.
            return Err(PlatformError::Auth(format!("status {status}")));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Malformed(format!("login: {e}")))?;
        Ok(body.token)
    }

    async fn fetch_timeseries_range(
        &self,
        token: &str,
        device_id: &str,
        keys: &[&str],
        start_ts: i64,
        end_ts: i64,
    ) -> Result<KeyedSamples, PlatformError> {
        let url = self.timeseries_url(
            device_id,
            keys,
            &format!("startTs={start_ts}&endTs={end_ts}"),
        );
        self.get_json(&url, token, "timeseries range").await
    }

    async fn fetch_latest(
        &self,
        token: &str,
        device_id: &str,
        keys: &[&str],
    ) -> Result<KeyedSamples, PlatformError> {
        let url = self.timeseries_url(device_id, keys, "limit=1");
        self.get_json(&url, token, "latest values").await
    }

    async fn fetch_alarms(
        &self,
        token: &str,
        device_id: &str,
    ) -> Result<Vec<AlarmRecord>, PlatformError> {
        let url = self.alarms_url(device_id);
        let page: AlarmPage = self.get_json(&url, token, "alarms").await?;
        Ok(page
            .data
            .into_iter()
            .map(|raw| AlarmRecord {
                id: raw.id.id,
                name: raw.name,
                status: raw.status,
                severity: raw.severity,
            })
            .collect())
    }
}
