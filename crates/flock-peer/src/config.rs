//! Peer configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Address the transfer server listens on
    pub listen_addr: String,

    /// Directory of files served to other peers
    pub shared_dir: PathBuf,

    /// Directory fetched files are written into
    pub download_dir: PathBuf,

    /// Tracker base URL; announcing is skipped when unset
    pub tracker_url: Option<String>,

    /// Seconds between tracker announcements
    pub announce_interval_secs: u64,

    /// Deadline for each read/write phase of a transfer, in seconds
    pub io_timeout_secs: u64,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9000".to_string(),
            shared_dir: PathBuf::from("shared"),
            download_dir: PathBuf::from("downloads"),
            tracker_url: None,
            announce_interval_secs: 300,
            io_timeout_secs: 30,
        }
    }
}

impl PeerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PeerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }

    pub fn announce_interval(&self) -> Duration {
        Duration::from_secs(self.announce_interval_secs)
    }
}
