//! Admin-only palette changes
//!
//! Changing the site palette is restricted to one configured admin identity.
//! Authorization is checked before validation, and validation before any
//! store write, so rejected requests never touch the store.

use palette::PaletteRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use storage::{ConfigStore, StoreError, ACTIVE_PALETTE_KEY};
use thiserror::Error;
use tracing::{info, warn};

use crate::resolver::ActiveThemeResolver;

/// Theme admin errors
#[derive(Debug, Error)]
pub enum ThemeAdminError {
    /// Caller is anonymous or not the admin
    #[error("Unauthorized")]
    Unauthorized,

    /// Candidate id is not a registered palette
    #[error("Invalid palette ID: {0}")]
    InvalidPalette(String),

    /// The store did not accept the write
    #[error("Failed to update palette: {0}")]
    UpstreamWriteFailure(#[source] StoreError),
}

/// Result type for admin operations
pub type Result<T> = std::result::Result<T, ThemeAdminError>;

/// Normalized email identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminIdentity(String);

impl AdminIdentity {
    /// Normalize an email: trimmed and lowercased; `None` when blank
    pub fn parse(email: &str) -> Option<Self> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Normalized email
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdminIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the caller as reported by the authentication layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    email: Option<AdminIdentity>,
}

impl CallerIdentity {
    /// Unauthenticated caller
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated caller with an email
    pub fn authenticated(email: &str) -> Self {
        Self {
            email: AdminIdentity::parse(email),
        }
    }

    /// Whether the caller is authenticated
    pub fn is_authenticated(&self) -> bool {
        self.email.is_some()
    }

    /// Normalized email, if authenticated
    pub fn email(&self) -> Option<&AdminIdentity> {
        self.email.as_ref()
    }
}

/// Result of a successful palette change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedPalette {
    /// The palette id now stored as active
    pub palette_id: String,
}

/// Applies palette changes on behalf of the admin
pub struct ThemeAdmin {
    store: Arc<dyn ConfigStore>,
    registry: Arc<PaletteRegistry>,
    admin: Option<AdminIdentity>,
    resolver: Option<Arc<ActiveThemeResolver>>,
}

impl ThemeAdmin {
    /// Create an admin mutator
    ///
    /// With no admin identity configured every caller is unauthorized.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        registry: Arc<PaletteRegistry>,
        admin: Option<AdminIdentity>,
    ) -> Self {
        if admin.is_none() {
            warn!("No admin identity configured, palette changes are disabled");
        }
        Self {
            store,
            registry,
            admin,
            resolver: None,
        }
    }

    /// Invalidate this resolver's cache after each successful change
    pub fn with_resolver(mut self, resolver: Arc<ActiveThemeResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Configured admin identity
    pub fn admin(&self) -> Option<&AdminIdentity> {
        self.admin.as_ref()
    }

    /// Whether `caller` is the admin
    pub fn is_admin(&self, caller: &CallerIdentity) -> bool {
        match (&self.admin, caller.email()) {
            (Some(admin), Some(email)) => admin == email,
            _ => false,
        }
    }

    /// Make `candidate_id` the active palette
    pub async fn apply_palette(
        &self,
        candidate_id: &str,
        caller: &CallerIdentity,
    ) -> Result<AppliedPalette> {
        if !self.is_admin(caller) {
            warn!(
                authenticated = caller.is_authenticated(),
                "Rejected palette change from non-admin caller"
            );
            return Err(ThemeAdminError::Unauthorized);
        }

        if !self.registry.contains(candidate_id) {
            return Err(ThemeAdminError::InvalidPalette(candidate_id.to_string()));
        }

        self.store
            .upsert(ACTIVE_PALETTE_KEY, candidate_id)
            .await
            .map_err(ThemeAdminError::UpstreamWriteFailure)?;

        if let Some(resolver) = &self.resolver {
            resolver.invalidate();
        }

        info!(
            palette_id = candidate_id,
            admin = %caller.email().map(AdminIdentity::as_str).unwrap_or_default(),
            "Active palette changed"
        );

        Ok(AppliedPalette {
            palette_id: candidate_id.to_string(),
        })
    }
}
