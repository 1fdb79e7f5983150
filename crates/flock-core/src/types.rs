//! Core data types for Flock

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Integer peer identity, derived from the peer's IPv4 address
pub type PeerId = u32;

/// A peer's identity plus its reported transfer statistics.
///
/// This is both the tracker's registry value and the JSON shape used on
/// the wire, so the serde field names are part of the HTTP contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    /// IP-derived integer identity
    pub ip: PeerId,
    /// Cumulative bytes downloaded
    pub downloaded_bytes: u64,
    /// Cumulative bytes uploaded
    pub uploaded_bytes: u64,
    /// Current download rate (bytes/sec)
    pub downloading_rate: f64,
    /// Current upload rate (bytes/sec)
    pub uploading_rate: f64,
}

impl Peer {
    /// Create a peer with zeroed statistics
    pub fn new(ip: PeerId) -> Self {
        Self {
            ip,
            downloaded_bytes: 0,
            uploaded_bytes: 0,
            downloading_rate: 0.0,
            uploading_rate: 0.0,
        }
    }
}

/// Body of `POST /register`.
///
/// Some peers announce their files at registration time rather than in a
/// later status update, so the file list is optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub peer: Peer,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Body of `POST /updateStatus`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub peer: Peer,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Acknowledgment body returned by the tracker's POST routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Derive the integer peer identity from an IPv4 address (big-endian octets)
pub fn peer_id_from_ip(ip: Ipv4Addr) -> PeerId {
    u32::from(ip)
}
