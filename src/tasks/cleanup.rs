//! Expiry Sweep Task
//!
//! Background task that periodically asks every registered bin to drop its
//! expired entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::CacheRegistry;

/// Spawns a background task that periodically purges expired entries.
///
/// Bins created after the task starts are picked up on the next sweep.
/// The returned handle is aborted during graceful shutdown.
pub fn spawn_cleanup_task(
    registry: Arc<CacheRegistry>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    // A zero interval would spin
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let mut removed = 0;
            for bin in registry.bins().await {
                removed += bin.purge_expired().await;
            }

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
