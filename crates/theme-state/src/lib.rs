//! Theme state for Tideline
//!
//! This crate resolves the site-wide active palette from the persisted
//! config store, applies admin palette changes, and provides the resolved
//! theme context to page consumers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admin;
pub mod provider;
pub mod resolver;

pub use admin::{AdminIdentity, AppliedPalette, CallerIdentity, ThemeAdmin, ThemeAdminError};
pub use provider::ThemeProvider;
pub use resolver::{ActiveThemeResolver, ResolverConfig};
