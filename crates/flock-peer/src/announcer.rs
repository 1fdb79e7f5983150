//! Tracker announcer
//!
//! Registers this peer at startup and re-announces its statistics and
//! shared files on a fixed interval. If the tracker answers 404 — we were
//! evicted while silent — the announcer falls back to re-registering.

use crate::stats::{StatsSnapshot, TransferStats};
use crate::tracker_api::TrackerClient;
use flock_core::{Error, PeerId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// File names currently available in the shared directory
pub fn shared_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    files.sort();
    files
}

/// Spawn the announce loop; it runs for the life of the process
pub fn spawn(
    client: TrackerClient,
    ip: PeerId,
    shared_dir: PathBuf,
    stats: Arc<TransferStats>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // Initial registration announces whatever we hold right now
        let snapshot = StatsSnapshot::take(&stats);
        let files = shared_files(&shared_dir);
        match client.register(snapshot.to_peer(ip, None), &files).await {
            Ok(status) => tracing::info!("Tracker: {status}"),
            Err(e) => tracing::warn!("Initial registration failed: {e}"),
        }
        let mut previous = Some(snapshot);

        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let snapshot = StatsSnapshot::take(&stats);
            let peer = snapshot.to_peer(ip, previous.as_ref());
            let files = shared_files(&shared_dir);

            match client.update_status(peer, &files).await {
                Ok(()) => tracing::debug!(ip, "Announced to tracker"),
                Err(Error::PeerNotRegistered(_)) => {
                    tracing::info!("Tracker dropped us; re-registering");
                    if let Err(e) = client.register(peer, &files).await {
                        tracing::warn!("Re-registration failed: {e}");
                    }
                }
                Err(e) => tracing::warn!("Announce failed: {e}"),
            }
            previous = Some(snapshot);
        }
    })
}
