// Application layer - Ingestion use cases and the platform client seam
pub mod dashboard_service;
pub mod history_loader;
pub mod platform_client;
pub mod poller;
