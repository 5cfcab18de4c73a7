// Dashboard domain model
use super::alarm::AlarmRecord;
use super::telemetry::ChartPoint;

/// Latest measured values shown on the current-value cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentReadings {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
}

/// Immutable view of the dashboard state handed to the rendering layer.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub measured: Vec<ChartPoint>,
    pub predicted: Vec<ChartPoint>,
    pub readings: CurrentReadings,
    pub alarm: Option<AlarmRecord>,
    pub last_poll: Option<String>,
    pub stale: bool,
}
