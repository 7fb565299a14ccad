//! Storage layer for Tideline
//!
//! This crate provides the persisted site configuration store that holds the
//! active palette id, and the local key-value store behind it and behind
//! per-device motion preferences.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config_store;
pub mod kv;
pub mod preferences;

pub use config_store::{
    ConfigStore, KvConfigStore, MemoryConfigStore, StoreError, ACTIVE_PALETTE_KEY,
};
pub use kv::{KvConfig, KvError, KvStore, Scope};
pub use preferences::{MotionOverrideStore, MotionPreferences};

#[cfg(any(test, feature = "mock"))]
pub use config_store::MockConfigStore;
