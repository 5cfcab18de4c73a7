use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformConfig {
    pub platform: PlatformSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub device_id: String,
}

fn default_base_url() -> String {
    "https://app.coreiot.io".to_string()
}

/// Load platform settings from `config/platform.*`, overridable through
/// `COREIOT_`-prefixed environment variables (for example
/// `COREIOT_PLATFORM__DEVICE_ID`). Missing credentials or device id fail
/// deserialization, which is fatal at startup.
pub fn load_platform_config() -> anyhow::Result<PlatformConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/platform").required(false))
        .add_source(config::Environment::with_prefix("COREIOT").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
