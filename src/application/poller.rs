// Poll loop - Fixed-cadence scheduler for the dashboard session
use crate::application::dashboard_service::{DashboardService, POLL_PERIOD};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle for a running poll loop. Dropping it stops the loop, the same way
/// dismounting the dashboard view tears down its timer.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the poll loop for a dashboard session.
///
/// Ticks are single-flight: the loop awaits each tick to completion, and a
/// scheduled tick whose predecessor overran the period is skipped rather
/// than overlapped. The task holds only a weak reference to the service, so
/// once the dashboard is gone the next wakeup exits instead of mutating
/// torn-down state.
pub fn spawn(service: &Arc<DashboardService>) -> PollerHandle {
    let service: Weak<DashboardService> = Arc::downgrade(service);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(POLL_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick fires immediately; the backfill already
        // covers that instant.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(service) = service.upgrade() else {
                tracing::debug!("dashboard gone, stopping poll loop");
                break;
            };
            service.poll_once().await;
        }
    });
    PollerHandle { task }
}
