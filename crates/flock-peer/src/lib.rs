//! Flock Peer - serves and fetches whole files over TCP
//!
//! A peer runs the transfer server for the files it shares, fetches files
//! from other peers it learned about from the tracker, and (optionally)
//! announces itself to the tracker so others can find it.

pub mod announcer;
pub mod client;
pub mod config;
pub mod server;
pub mod stats;
pub mod tracker_api;

pub use config::PeerConfig;
pub use server::TransferServer;
pub use stats::TransferStats;
pub use tracker_api::TrackerClient;
