//! Flock Core - Shared types, wire protocol, and utilities
//!
//! This crate provides the building blocks shared by the Flock tracker
//! and peer: the peer/statistics types and their JSON shapes, the error
//! taxonomy, the peer-to-peer transfer framing, and the standalone
//! chunk/merge utility.

pub mod chunk;
pub mod error;
pub mod types;
pub mod wire;

pub use error::{Error, Result};
pub use types::*;

/// Default cap on peers returned by a discovery query
pub const DEFAULT_PEER_LIMIT: usize = 50;

/// Prefix applied to files written by the transfer client
pub const RECEIVED_PREFIX: &str = "received_";
