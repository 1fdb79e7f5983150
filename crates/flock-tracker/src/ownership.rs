//! File ownership index
//!
//! Maps a file name to the set of peers currently claiming to serve it.
//! Derived entirely from registry announcements; like [`crate::registry`],
//! it holds no lock of its own and is only reachable through
//! [`crate::state::TrackerState`].

use flock_core::PeerId;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct FileOwnershipIndex {
    owners: HashMap<String, BTreeSet<PeerId>>,
}

impl FileOwnershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert; creates the owner set on the first announcement
    pub fn add_owner(&mut self, file: &str, id: PeerId) {
        self.owners.entry(file.to_string()).or_default().insert(id);
    }

    /// Idempotent removal; drops the file entry once its set is empty, so
    /// a fully evicted file resolves the same as a never-announced one
    pub fn remove_owner(&mut self, file: &str, id: PeerId) {
        if let Some(set) = self.owners.get_mut(file) {
            set.remove(&id);
            if set.is_empty() {
                self.owners.remove(file);
            }
        }
    }

    /// Owner set for a file; `None` when no entry exists at all
    pub fn owners_of(&self, file: &str) -> Option<&BTreeSet<PeerId>> {
        self.owners.get(file)
    }

    /// Remove a peer from every owner set it belongs to (eviction only)
    pub(crate) fn remove_peer(&mut self, id: PeerId) {
        self.owners.retain(|_, set| {
            set.remove(&id);
            !set.is_empty()
        });
    }

    pub fn file_count(&self) -> usize {
        self.owners.len()
    }
}
