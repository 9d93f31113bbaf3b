//! Periodic snapshot refresh.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::folder::coordinator::SyncCoordinator;

/// Rebuilds the coordinator's snapshot on a fixed interval so changes made
/// by other sessions show up without a local mutation.
#[derive(Debug)]
pub struct SnapshotRefresher {
    /// Coordinator whose snapshot is refreshed.
    coordinator: SyncCoordinator,
    /// Time between refreshes.
    interval: Duration,
}

impl SnapshotRefresher {
    /// Create a refresher.
    pub fn new(coordinator: SyncCoordinator, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// Refresh until `cancel` turns `true` or its sender is dropped.
    ///
    /// The first refresh happens immediately.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Snapshot refresher started"
        );

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.coordinator.refresh().await {
                        tracing::warn!(error = %e, "Periodic snapshot refresh failed");
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Snapshot refresher stopped");
    }
}

/// Spawn a [`SnapshotRefresher`] on the current runtime.
///
/// Returns `None` when `interval` is zero, which disables periodic refresh.
pub fn spawn_refresher(
    coordinator: SyncCoordinator,
    interval: Duration,
    cancel: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        tracing::debug!("Periodic snapshot refresh disabled");
        return None;
    }

    let refresher = SnapshotRefresher::new(coordinator, interval);
    Some(tokio::spawn(async move { refresher.run(cancel).await }))
}
