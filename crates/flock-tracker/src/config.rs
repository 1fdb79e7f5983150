//! Tracker configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Address the HTTP server binds to
    pub listen_addr: String,

    /// Seconds between liveness sweeps
    pub sweep_interval_secs: u64,

    /// Seconds of silence after which a peer is evicted
    pub staleness_secs: u64,

    /// Cap on peers returned by a discovery query
    pub peer_limit: usize,

    /// Per-request handling deadline for the HTTP server, in seconds
    pub request_timeout_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            sweep_interval_secs: 600,
            staleness_secs: 1800,
            peer_limit: flock_core::DEFAULT_PEER_LIMIT,
            request_timeout_secs: 10,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TrackerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn staleness(&self) -> Duration {
        Duration::from_secs(self.staleness_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(600));
        assert_eq!(config.staleness(), Duration::from_secs(1800));
        assert_eq!(config.peer_limit, 50);
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
listen_addr = "127.0.0.1:9090"
sweep_interval_secs = 60
staleness_secs = 120
peer_limit = 10
request_timeout_secs = 5
"#
        )
        .unwrap();

        let config = TrackerConfig::load(file.path()).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9090");
        assert_eq!(config.peer_limit, 10);
        assert_eq!(config.staleness(), Duration::from_secs(120));
    }
}
