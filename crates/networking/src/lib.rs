//! Networking for Tideline
//!
//! This crate provides the remote implementation of the site configuration
//! store, with request timeouts and retry on transient failures.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod edge_config;

pub use edge_config::{EdgeConfigSettings, EdgeConfigStore, ItemOperation, ItemsPatch};
