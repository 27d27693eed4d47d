//! Background sync on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::coordinator::SyncCoordinator;

/// Spawns a task that calls [`SyncCoordinator::sync`] every `period`,
/// starting immediately.
///
/// Failures are logged and retried on the next tick; there is no backoff.
/// The task exits when `shutdown` carries `true` or its sender is dropped.
/// Callers mutating the workspace in the meantime lock the same mutex, so
/// a sync never interleaves with a mutation.
pub fn spawn_periodic_sync(
    coordinator: Arc<Mutex<SyncCoordinator>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {},
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("periodic sync shutting down");
                        break;
                    }
                    continue;
                },
            }

            let result = coordinator.lock().await.sync().await;
            match result {
                Ok(summary) => {
                    consecutive_failures = 0;
                    debug!(
                        pushed = summary.pushed.is_some(),
                        activities = summary.pulled.activities,
                        "periodic sync complete"
                    );
                },
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    warn!(
                        error = %e,
                        consecutive_failures,
                        "periodic sync failed (will retry)"
                    );
                },
            }
        }
    })
}
