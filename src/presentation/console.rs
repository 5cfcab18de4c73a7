// Console view - Renders dashboard snapshots as status lines
use crate::domain::dashboard::DashboardSnapshot;

/// Print one status block for the current snapshot. Presentation only;
/// everything shown comes out of the snapshot as-is.
pub fn render(snapshot: &DashboardSnapshot) {
    let last = snapshot.last_poll.as_deref().unwrap_or("never");
    let staleness = if snapshot.stale { " [STALE]" } else { "" };
    println!(
        "{:.1} °C | {:.1} % | {:.0} lx | measured {} pts, predicted {} pts | last update {}{}",
        snapshot.readings.temperature,
        snapshot.readings.humidity,
        snapshot.readings.light,
        snapshot.measured.len(),
        snapshot.predicted.len(),
        last,
        staleness,
    );

    if let Some(alarm) = &snapshot.alarm {
        println!(
            "ALARM {} | status {} | severity {}",
            alarm.name, alarm.status, alarm.severity
        );
    }
}
