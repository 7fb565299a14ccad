//! Persisted site configuration store
//!
//! The active palette id lives in a small string key-value store shared by
//! every server instance. [`ConfigStore`] is the narrow interface the theme
//! layer depends on; this module provides an in-memory store and a local
//! sled-backed store, and the `networking` crate provides the remote one.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::kv::{KvError, KvStore, Scope};

/// Key under which the active palette id is stored
pub const ACTIVE_PALETTE_KEY: &str = "activePaletteId";

/// Config store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store has no endpoint or credentials configured
    #[error("Config store is not configured: {0}")]
    Unconfigured(String),

    /// The store could not be reached
    #[error("Config store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but refused the operation
    #[error("Config store rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status (or 0 for non-HTTP stores)
        status: u16,
        /// Message returned by the store
        message: String,
    },

    /// The stored value could not be decoded
    #[error("Malformed config value: {0}")]
    Malformed(String),

    /// Local key-value store failure
    #[error("Local store error: {0}")]
    Kv(#[from] KvError),
}

impl StoreError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::Rejected { status, .. } => matches!(status, 408 | 425 | 429 | 500..=599),
            _ => false,
        }
    }
}

/// Result type for config store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// String key-value store holding site configuration
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace a value; succeeds only once the store acknowledged the write
    async fn upsert(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store (development and tests)
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Config store persisted in the local sled database under the `site` scope
#[derive(Clone)]
pub struct KvConfigStore {
    scope: Scope,
}

impl KvConfigStore {
    /// Scope name used for site configuration keys
    pub const SCOPE: &'static str = "site";

    /// Open the site scope of a key-value store
    pub fn new(kv: &KvStore) -> Result<Self> {
        Ok(Self {
            scope: kv.scope(Self::SCOPE)?,
        })
    }
}

#[async_trait]
impl ConfigStore for KvConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.scope.get::<String>(key)?)
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<()> {
        let scope = self.scope.clone();
        let (key, value) = (key.to_string(), value.to_string());

        // The write is acknowledged only once it is durable; sled flushes block
        tokio::task::spawn_blocking(move || -> Result<()> {
            scope.set(&key, &value)?;
            scope.flush()?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("Local store write aborted: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KvConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.get(ACTIVE_PALETTE_KEY).await.unwrap(), None);

        store.upsert(ACTIVE_PALETTE_KEY, "terminal").await.unwrap();
        assert_eq!(store.get(ACTIVE_PALETTE_KEY).await.unwrap(), Some("terminal".to_string()));

        store.upsert(ACTIVE_PALETTE_KEY, "synthwave").await.unwrap();
        assert_eq!(store.get(ACTIVE_PALETTE_KEY).await.unwrap(), Some("synthwave".to_string()));
    }

    #[tokio::test]
    async fn test_memory_store_with_values() {
        let store = MemoryConfigStore::with_values([(ACTIVE_PALETTE_KEY, "desert-dusk")]);
        assert_eq!(store.get(ACTIVE_PALETTE_KEY).await.unwrap(), Some("desert-dusk".to_string()));
    }

    #[tokio::test]
    async fn test_kv_store_round_trip() {
        let kv = KvStore::in_memory().unwrap();
        let store = KvConfigStore::new(&kv).unwrap();

        assert_eq!(store.get(ACTIVE_PALETTE_KEY).await.unwrap(), None);
        store.upsert(ACTIVE_PALETTE_KEY, "kyoto-moss").await.unwrap();
        assert_eq!(store.get(ACTIVE_PALETTE_KEY).await.unwrap(), Some("kyoto-moss".to_string()));
        assert!(kv.scope(KvConfigStore::SCOPE).unwrap().contains(ACTIVE_PALETTE_KEY).unwrap());
    }

    #[tokio::test]
    async fn test_kv_store_upsert_is_durable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site.db").to_string_lossy().into_owned();

        {
            let kv = KvStore::new(KvConfig::new(&path).flush_every_ms(None)).unwrap();
            let store = KvConfigStore::new(&kv).unwrap();
            store.upsert(ACTIVE_PALETTE_KEY, "solarized-night").await.unwrap();
        }

        let kv = KvStore::new(KvConfig::new(&path).flush_every_ms(None)).unwrap();
        let store = KvConfigStore::new(&kv).unwrap();
        let stored = store.get(ACTIVE_PALETTE_KEY).await.unwrap();
        assert_eq!(stored.as_deref(), Some("solarized-night"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_kv_store_concurrent_upserts() {
        let kv = KvStore::in_memory().unwrap();
        let store = Arc::new(KvConfigStore::new(&kv).unwrap());

        let writes: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.upsert(&format!("key-{}", i), "value").await })
            })
            .collect();
        for write in writes {
            write.await.unwrap().unwrap();
        }

        assert_eq!(kv.scope(KvConfigStore::SCOPE).unwrap().keys().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_store_usable_as_trait_object() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryConfigStore::new());
        store.upsert("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Unavailable("timeout".into()).is_transient());
        let rejected = |status| StoreError::Rejected {
            status,
            message: String::new(),
        };
        assert!(rejected(503).is_transient());
        assert!(rejected(429).is_transient());
        assert!(!rejected(401).is_transient());
        assert!(!StoreError::Unconfigured("no url".into()).is_transient());
    }

    #[tokio::test]
    async fn test_mock_store_records_calls() {
        let mut mock = MockConfigStore::new();
        mock.expect_get()
            .withf(|key| key == ACTIVE_PALETTE_KEY)
            .times(1)
            .returning(|_| Ok(Some("terminal".to_string())));
        mock.expect_upsert().never();

        assert_eq!(mock.get(ACTIVE_PALETTE_KEY).await.unwrap().as_deref(), Some("terminal"));
    }
}
