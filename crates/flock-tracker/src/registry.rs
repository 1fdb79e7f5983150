//! Peer registry
//!
//! The single source of truth for "is this peer known and alive". The
//! struct itself holds no lock; all access goes through
//! [`crate::state::TrackerState`], which owns the locking discipline.

use flock_core::{Error, Peer, PeerId, Result};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
// tokio's Instant so that tests driving tokio::time can observe staleness
use tokio::time::Instant;

/// A registered peer: its reported stats, the files it has announced,
/// and when it last reported in.
#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub peer: Peer,
    /// Accumulated by union across announcements, only cleared by eviction
    pub files: BTreeSet<String>,
    /// Read by the sweeper, never serialized
    pub last_seen: Instant,
}

/// The set of known peers and their reported statistics
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<PeerId, PeerRecord>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the peer if its identity is unknown. Returns `true` when the
    /// peer was newly inserted; a duplicate registration leaves the stored
    /// stats untouched. Either way the last-seen timestamp is refreshed.
    pub fn register(&mut self, peer: Peer) -> bool {
        match self.peers.get_mut(&peer.ip) {
            Some(record) => {
                record.last_seen = Instant::now();
                false
            }
            None => {
                self.peers.insert(
                    peer.ip,
                    PeerRecord {
                        peer,
                        files: BTreeSet::new(),
                        last_seen: Instant::now(),
                    },
                );
                true
            }
        }
    }

    /// Replace a registered peer's stats in place and refresh last-seen.
    /// Fails if the peer was never registered.
    pub fn update(&mut self, peer: Peer) -> Result<()> {
        let record = self
            .peers
            .get_mut(&peer.ip)
            .ok_or(Error::PeerNotRegistered(peer.ip))?;
        record.peer = peer;
        record.last_seen = Instant::now();
        Ok(())
    }

    /// Union announced files into the peer's file set
    pub fn add_files<I>(&mut self, id: PeerId, files: I)
    where
        I: IntoIterator<Item = String>,
    {
        if let Some(record) = self.peers.get_mut(&id) {
            record.files.extend(files);
        }
    }

    pub fn get(&self, id: PeerId) -> Option<&PeerRecord> {
        self.peers.get(&id)
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.peers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Peers whose last report is older than `threshold`
    pub fn stale_peers(&self, threshold: Duration) -> Vec<PeerId> {
        let now = Instant::now();
        self.peers
            .iter()
            .filter(|(_, record)| now.duration_since(record.last_seen) > threshold)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Remove a peer entirely, last-seen record included.
    ///
    /// Only the combined eviction path in `TrackerState` may call this;
    /// it is the step that must stay atomic with ownership-index cleanup.
    pub(crate) fn remove(&mut self, id: PeerId) -> Option<PeerRecord> {
        self.peers.remove(&id)
    }
}
