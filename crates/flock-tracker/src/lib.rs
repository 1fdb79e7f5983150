//! Flock Tracker - peer registry and file ownership coordination
//!
//! The tracker keeps an in-memory registry of peers and an index of which
//! peer serves which file, evicts peers that stop reporting, and exposes
//! registration, status-update, and discovery over HTTP. State does not
//! survive a restart; peers re-register.

pub mod config;
pub mod ownership;
pub mod registry;
pub mod routes;
pub mod state;
pub mod sweeper;

pub use config::TrackerConfig;
pub use state::{RegisterOutcome, TrackerState};
