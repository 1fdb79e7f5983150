//! Liveness sweeper
//!
//! The single background task allowed to delete peers: on a fixed
//! interval it evicts everyone whose last report exceeds the staleness
//! threshold, registry and ownership index in one transactional step.

use crate::state::TrackerState;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn the sweep loop; it runs for the life of the process
pub fn spawn(state: Arc<TrackerState>, interval: Duration, staleness: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a restart does not
        // sweep before anyone had a chance to report in.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = state.evict_stale(staleness).await;
            for &ip in &evicted {
                tracing::info!(ip, "Evicted inactive peer");
            }
            if !evicted.is_empty() {
                tracing::debug!(count = evicted.len(), "Sweep pass complete");
            }
        }
    })
}
