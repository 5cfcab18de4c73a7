// Main entry point - Wires the ingestion engine to the console view
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use crate::application::dashboard_service::{DashboardService, POLL_PERIOD};
use crate::application::poller;
use crate::infrastructure::config::load_platform_config;
use crate::infrastructure::coreiot_client::CoreIotClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = load_platform_config()?;

    let client = Arc::new(CoreIotClient::new(config.platform.base_url.clone()));
    let service = Arc::new(DashboardService::new(
        client,
        config.platform.device_id.clone(),
    ));

    tracing::info!(device_id = %config.platform.device_id, "starting dashboard session");
    service
        .bootstrap(&config.platform.username, &config.platform.password)
        .await?;

    let poller = poller::spawn(&service);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(POLL_PERIOD) => {
                let snapshot = service.snapshot().await;
                presentation::console::render(&snapshot);
            }
        }
    }

    tracing::info!("shutting down");
    drop(poller);
    Ok(())
}
