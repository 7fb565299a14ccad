//! Server configuration from the environment

use anyhow::{bail, Context};
use networking::{EdgeConfigSettings, EdgeConfigStore};
use std::sync::Arc;
use std::time::Duration;
use storage::{ConfigStore, KvConfig, KvConfigStore, KvStore, MemoryConfigStore};
use theme_state::{AdminIdentity, ResolverConfig};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default path of the local store
pub const DEFAULT_KV_PATH: &str = "tideline_kv.db";

/// Where the active palette id is persisted
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// Process memory; lost on restart
    Memory,
    /// Local sled database
    Local {
        /// Database path
        path: String,
    },
    /// Remote edge configuration service
    Edge(EdgeConfigSettings),
}

impl StoreBackend {
    /// Open the configured store
    pub fn open(&self) -> anyhow::Result<Arc<dyn ConfigStore>> {
        let store: Arc<dyn ConfigStore> = match self {
            StoreBackend::Memory => Arc::new(MemoryConfigStore::new()),
            StoreBackend::Local { path } => {
                let kv = KvStore::new(KvConfig::new(path.clone()))
                    .with_context(|| format!("Failed to open local store at {path}"))?;
                Arc::new(KvConfigStore::new(&kv)?)
            }
            StoreBackend::Edge(settings) => Arc::new(EdgeConfigStore::new(settings.clone())),
        };
        Ok(store)
    }

    fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Local { .. } => "local",
            StoreBackend::Edge(_) => "edge",
        }
    }
}

/// Configuration for starting the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Only identity allowed to change the palette
    pub admin: Option<AdminIdentity>,
    /// Active palette persistence
    pub store: StoreBackend,
    /// Active palette resolution
    pub resolver: ResolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            admin: None,
            store: StoreBackend::Memory,
            resolver: ResolverConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables
    ///
    /// - `TIDELINE_PORT`
    /// - `TIDELINE_ADMIN_EMAIL`
    /// - `TIDELINE_STORE`: `memory` (default), `local` or `edge`
    /// - `TIDELINE_KV_PATH`: database path for `local`
    /// - `EDGE_CONFIG_URL`, `EDGE_CONFIG_TOKEN`, `EDGE_CONFIG_WRITE_URL`,
    ///   `EDGE_CONFIG_WRITE_TOKEN`: credentials for `edge`
    /// - `TIDELINE_RESOLVER_CACHE_SECS`: `0` or unset disables caching
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(port) = var("TIDELINE_PORT") {
            config.port = port.parse().with_context(|| format!("Invalid TIDELINE_PORT: {port}"))?;
        }

        config.admin = var("TIDELINE_ADMIN_EMAIL").and_then(|email| AdminIdentity::parse(&email));

        config.store = match var("TIDELINE_STORE").map(|s| s.to_ascii_lowercase()).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("local") => StoreBackend::Local {
                path: var("TIDELINE_KV_PATH").unwrap_or_else(|| DEFAULT_KV_PATH.to_string()),
            },
            Some("edge") => StoreBackend::Edge(EdgeConfigSettings {
                read_url: var("EDGE_CONFIG_URL"),
                read_token: var("EDGE_CONFIG_TOKEN"),
                write_url: var("EDGE_CONFIG_WRITE_URL"),
                write_token: var("EDGE_CONFIG_WRITE_TOKEN"),
                ..Default::default()
            }),
            Some(other) => {
                bail!("Unknown TIDELINE_STORE: {other} (expected memory, local or edge)")
            }
        };

        if let Some(secs) = var("TIDELINE_RESOLVER_CACHE_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("Invalid TIDELINE_RESOLVER_CACHE_SECS: {secs}"))?;
            config.resolver = if secs == 0 {
                config.resolver.without_cache()
            } else {
                config.resolver.with_cache_ttl(Duration::from_secs(secs))
            };
        }

        tracing::debug!(
            port = config.port,
            store = config.store.name(),
            admin_configured = config.admin.is_some(),
            "Loaded server configuration"
        );
        Ok(config)
    }
}
