//! Error types for Flock

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Peer {0} not registered")]
    PeerNotRegistered(u32),

    #[error("No peers available for file '{0}'")]
    NoOwners(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Transfer refused by remote peer: {0}")]
    TransferRefused(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, Error>;
