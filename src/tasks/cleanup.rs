//! TTL Cleanup Task
//!
//! Expired memory-backend entries already read as absent; this task frees
//! the ones nobody asks for again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryBackend;

/// Spawns a task that sweeps `backend` every `interval_secs` seconds.
///
/// The returned handle is aborted on shutdown.
pub fn spawn_cleanup_task(backend: Arc<MemoryBackend>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = backend.cleanup_expired().await;
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
