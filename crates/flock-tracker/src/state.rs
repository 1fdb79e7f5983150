//! Shared tracker state and its locking discipline
//!
//! `TrackerState` is the only way request handlers and the sweeper touch
//! the peer registry or the ownership index. Each structure sits behind
//! its own reader/writer lock; any operation that needs both acquires them
//! in one global order — registry first, then ownership index — so the
//! sweeper and concurrent handlers cannot deadlock, and cross-structure
//! steps (registration seeding ownership, eviction cleaning both) are
//! observed atomically.

use crate::ownership::FileOwnershipIndex;
use crate::registry::PeerRegistry;
use flock_core::{Error, Peer, PeerId, Result};
use std::time::Duration;
use tokio::sync::RwLock;

/// What a registration attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    AlreadyRegistered,
}

pub struct TrackerState {
    registry: RwLock<PeerRegistry>,
    owners: RwLock<FileOwnershipIndex>,
    /// Cap on peers returned by a discovery query
    peer_limit: usize,
}

impl TrackerState {
    pub fn new(peer_limit: usize) -> Self {
        Self {
            registry: RwLock::new(PeerRegistry::new()),
            owners: RwLock::new(FileOwnershipIndex::new()),
            peer_limit,
        }
    }

    /// Register a peer, seeding the ownership index with any files the
    /// registration announced. Duplicate registration leaves stats alone
    /// but still refreshes last-seen and still unions announced files.
    pub async fn register(&self, peer: Peer, files: &[String]) -> RegisterOutcome {
        let mut registry = self.registry.write().await;
        let mut owners = self.owners.write().await;

        let newly = registry.register(peer);
        registry.add_files(peer.ip, files.iter().cloned());
        for file in files {
            owners.add_owner(file, peer.ip);
        }

        if newly {
            RegisterOutcome::Registered
        } else {
            RegisterOutcome::AlreadyRegistered
        }
    }

    /// Replace a registered peer's stats and union its announced files
    /// into the ownership index. Files accumulate; a peer that stops
    /// listing a file keeps owning it until eviction.
    pub async fn update(&self, peer: Peer, files: &[String]) -> Result<()> {
        let mut registry = self.registry.write().await;
        let mut owners = self.owners.write().await;

        registry.update(peer)?;
        registry.add_files(peer.ip, files.iter().cloned());
        for file in files {
            owners.add_owner(file, peer.ip);
        }
        Ok(())
    }

    /// Ranked owners of a file: descending upload rate, ties broken by
    /// ascending identity, truncated to the configured limit.
    pub async fn peers_for(&self, file: &str) -> Result<Vec<Peer>> {
        let registry = self.registry.read().await;
        let owners = self.owners.read().await;

        let ids = owners
            .owners_of(file)
            .ok_or_else(|| Error::NoOwners(file.to_string()))?;

        let mut peers: Vec<Peer> = ids
            .iter()
            .filter_map(|id| registry.get(*id).map(|record| record.peer))
            .collect();

        peers.sort_by(|a, b| {
            b.uploading_rate
                .total_cmp(&a.uploading_rate)
                .then(a.ip.cmp(&b.ip))
        });
        peers.truncate(self.peer_limit);
        Ok(peers)
    }

    pub async fn peer(&self, id: PeerId) -> Option<Peer> {
        self.registry.read().await.get(id).map(|record| record.peer)
    }

    pub async fn peer_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Evict every peer whose last report is older than `threshold`, as
    /// one transactional step under both write locks: each stale peer is
    /// removed from every owner set and then from the registry, so no
    /// intermediate state is observable.
    pub async fn evict_stale(&self, threshold: Duration) -> Vec<PeerId> {
        let mut registry = self.registry.write().await;
        let mut owners = self.owners.write().await;

        let stale = registry.stale_peers(threshold);
        for id in &stale {
            owners.remove_peer(*id);
            registry.remove(*id);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer_with_rate(ip: PeerId, uploading_rate: f64) -> Peer {
        Peer {
            uploading_rate,
            ..Peer::new(ip)
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_stats() {
        let state = TrackerState::new(50);

        let mut first = Peer::new(1);
        first.uploaded_bytes = 500;
        assert_eq!(state.register(first, &[]).await, RegisterOutcome::Registered);

        let second = Peer::new(1);
        assert_eq!(
            state.register(second, &[]).await,
            RegisterOutcome::AlreadyRegistered
        );

        assert_eq!(state.peer_count().await, 1);
        assert_eq!(state.peer(1).await.unwrap().uploaded_bytes, 500);
    }

    #[tokio::test]
    async fn test_registration_seeds_ownership() {
        let state = TrackerState::new(50);
        state.register(Peer::new(1), &["a.txt".to_string()]).await;

        let peers = state.peers_for("a.txt").await.unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].ip, 1);
    }

    #[tokio::test]
    async fn test_ownership_is_monotonic_under_updates() {
        let state = TrackerState::new(50);
        state.register(Peer::new(1), &[]).await;

        state
            .update(Peer::new(1), &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        state.update(Peer::new(1), &["c".to_string()]).await.unwrap();

        // Files accumulate; the second update does not drop "a" or "b"
        for file in ["a", "b", "c"] {
            let peers = state.peers_for(file).await.unwrap();
            assert!(peers.iter().any(|p| p.ip == 1), "peer missing from '{file}'");
        }
    }

    #[tokio::test]
    async fn test_update_unregistered_peer_is_not_found() {
        let state = TrackerState::new(50);
        let err = state.update(Peer::new(7), &[]).await.unwrap_err();
        assert!(matches!(err, Error::PeerNotRegistered(7)));
    }

    #[tokio::test]
    async fn test_ranking_is_deterministic() {
        let state = TrackerState::new(50);
        state.register(peer_with_rate(3, 1.0), &["f".to_string()]).await;
        state.register(peer_with_rate(1, 9.0), &["f".to_string()]).await;
        state.register(peer_with_rate(2, 5.0), &["f".to_string()]).await;
        // Same rate as peer 2: the tie breaks on ascending identity
        state.register(peer_with_rate(5, 5.0), &["f".to_string()]).await;

        let peers = state.peers_for("f").await.unwrap();
        let ids: Vec<PeerId> = peers.iter().map(|p| p.ip).collect();
        assert_eq!(ids, vec![1, 2, 5, 3]);
    }

    #[tokio::test]
    async fn test_query_truncates_to_limit() {
        let state = TrackerState::new(50);
        for ip in 0..70u32 {
            state
                .register(peer_with_rate(ip, f64::from(ip)), &["big".to_string()])
                .await;
        }

        let peers = state.peers_for("big").await.unwrap();
        assert_eq!(peers.len(), 50);
        // The 50 highest upload rates survive: ips 69 down to 20
        assert_eq!(peers[0].ip, 69);
        assert_eq!(peers[49].ip, 20);
    }

    #[tokio::test]
    async fn test_unknown_file_is_not_found() {
        let state = TrackerState::new(50);
        assert!(matches!(
            state.peers_for("nope").await,
            Err(Error::NoOwners(_))
        ));
    }

    #[tokio::test]
    async fn test_eviction_is_atomic_across_structures() {
        let state = TrackerState::new(50);
        state
            .register(Peer::new(1), &["a".to_string(), "b".to_string()])
            .await;
        state.register(Peer::new(2), &["b".to_string()]).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        let evicted = state.evict_stale(Duration::ZERO).await;
        assert_eq!(evicted.len(), 2);

        // Registry and every owner set agree: nothing is left behind
        assert!(state.peer(1).await.is_none());
        assert!(state.peer(2).await.is_none());
        assert!(matches!(state.peers_for("a").await, Err(Error::NoOwners(_))));
        assert!(matches!(state.peers_for("b").await, Err(Error::NoOwners(_))));
    }

    #[tokio::test]
    async fn test_fresh_peers_survive_sweep() {
        let state = TrackerState::new(50);
        state.register(Peer::new(1), &["a".to_string()]).await;

        let evicted = state.evict_stale(Duration::from_secs(3600)).await;
        assert!(evicted.is_empty());
        assert!(state.peer(1).await.is_some());
        assert!(state.peers_for("a").await.is_ok());
    }
}
