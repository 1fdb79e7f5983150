//! Transfer statistics
//!
//! Cumulative byte counters shared between the transfer server's
//! connection tasks, the fetch client, and the announcer. Counters only
//! grow; rates are derived from the delta between announcer snapshots.

use flock_core::{Peer, PeerId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Default)]
pub struct TransferStats {
    downloaded_bytes: AtomicU64,
    uploaded_bytes: AtomicU64,
}

impl TransferStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_downloaded(&self, bytes: u64) {
        self.downloaded_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_uploaded(&self, bytes: u64) {
        self.uploaded_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded_bytes.load(Ordering::Relaxed)
    }

    pub fn uploaded(&self) -> u64 {
        self.uploaded_bytes.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of the counters, used to compute rates between
/// consecutive tracker announcements
#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub downloaded_bytes: u64,
    pub uploaded_bytes: u64,
    taken_at: Instant,
}

impl StatsSnapshot {
    pub fn take(stats: &TransferStats) -> Self {
        Self {
            downloaded_bytes: stats.downloaded(),
            uploaded_bytes: stats.uploaded(),
            taken_at: Instant::now(),
        }
    }

    /// Build the wire `Peer` for this snapshot, with rates averaged since
    /// the previous snapshot (zero on the first report)
    pub fn to_peer(&self, ip: PeerId, previous: Option<&StatsSnapshot>) -> Peer {
        let (downloading_rate, uploading_rate) = match previous {
            Some(prev) => {
                let elapsed = self.taken_at.duration_since(prev.taken_at).as_secs_f64();
                if elapsed > 0.0 {
                    (
                        (self.downloaded_bytes - prev.downloaded_bytes) as f64 / elapsed,
                        (self.uploaded_bytes - prev.uploaded_bytes) as f64 / elapsed,
                    )
                } else {
                    (0.0, 0.0)
                }
            }
            None => (0.0, 0.0),
        };

        Peer {
            ip,
            downloaded_bytes: self.downloaded_bytes,
            uploaded_bytes: self.uploaded_bytes,
            downloading_rate,
            uploading_rate,
        }
    }
}
