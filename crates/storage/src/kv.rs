//! Local key-value store
//!
//! A small sled-backed store for values that live on the serving machine or
//! device: the locally persisted active palette when no remote store is
//! configured, and the manual reduced-motion override.
//!
//! Values are JSON-encoded. Each consumer works inside its own [`Scope`], a
//! separate sled tree, so site configuration and device preferences never
//! share a key space.

use serde::{de::DeserializeOwned, Serialize};
use sled::{Db, Tree};
use thiserror::Error;

/// Key-value store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Keys must be non-empty
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database directory
    pub path: String,
    /// Page cache size in bytes
    pub cache_capacity: u64,
    /// Compress stored pages
    pub use_compression: bool,
    /// Background flush interval in milliseconds (None disables the flusher)
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "tideline_kv.db".to_string(),
            cache_capacity: 4 * 1024 * 1024,
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Configuration for a database at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the page cache size
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set or disable the background flush interval
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Handle to an open sled database; clones share it
#[derive(Clone)]
pub struct KvStore {
    db: Db,
}

impl KvStore {
    /// Open (or create) the database described by `config`
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .open()?;
        tracing::debug!(path = %config.path, "Opened local key-value store");

        Ok(Self { db })
    }

    /// Temporary database removed on drop
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Open the named scope, creating it on first use
    pub fn scope(&self, name: &'static str) -> Result<Scope> {
        let tree = self.db.open_tree(name)?;
        Ok(Scope { name, tree })
    }

    /// Names of scopes that hold at least one value
    pub fn scope_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for name in self.db.tree_names() {
            let tree = self.db.open_tree(&name)?;
            if &name[..] != b"__sled__default" && !tree.is_empty() {
                names.push(String::from_utf8_lossy(&name).into_owned());
            }
        }
        Ok(names)
    }

    /// Flush every scope to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// One isolated key space inside a [`KvStore`]
#[derive(Clone)]
pub struct Scope {
    name: &'static str,
    tree: Tree,
}

impl Scope {
    /// Scope name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Decode the value at `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.tree
            .get(key)?
            .map(|raw| serde_json::from_slice(&raw))
            .transpose()
            .map_err(KvError::from)
    }

    /// Encode and store `value` at `key`
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::InvalidKey(key.to_string()));
        }
        self.tree.insert(key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// Delete `key`; returns whether a value was present
    pub fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.tree.remove(key)?.is_some())
    }

    /// Whether `key` holds a value
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.tree.contains_key(key)?)
    }

    /// Keys in this scope, in byte order
    pub fn keys(&self) -> Result<Vec<String>> {
        self.tree
            .iter()
            .keys()
            .map(|key| -> Result<String> { Ok(String::from_utf8_lossy(&key?).into_owned()) })
            .collect()
    }

    /// Flush this scope to disk
    pub fn flush(&self) -> Result<()> {
        self.tree.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_value_is_none() {
        let kv = KvStore::in_memory().unwrap();
        let site = kv.scope("site").unwrap();
        assert_eq!(site.get::<String>("activePaletteId").unwrap(), None);
        assert!(!site.contains("activePaletteId").unwrap());
    }

    #[test]
    fn test_empty_key_rejected() {
        let kv = KvStore::in_memory().unwrap();
        let site = kv.scope("site").unwrap();
        assert!(matches!(site.set("", "terminal"), Err(KvError::InvalidKey(_))));
    }

    #[test]
    fn test_overwrite_and_remove() {
        let kv = KvStore::in_memory().unwrap();
        let site = kv.scope("site").unwrap();

        site.set("activePaletteId", "terminal").unwrap();
        site.set("activePaletteId", "synthwave").unwrap();
        assert_eq!(site.get::<String>("activePaletteId").unwrap().as_deref(), Some("synthwave"));

        assert!(site.remove("activePaletteId").unwrap());
        assert!(!site.remove("activePaletteId").unwrap());
    }

    #[test]
    fn test_wrong_type_is_serialization_error() {
        let kv = KvStore::in_memory().unwrap();
        let device = kv.scope("device").unwrap();
        device.set("motion", "fast").unwrap();
        assert!(matches!(device.get::<bool>("motion"), Err(KvError::Serialization(_))));
    }

    #[test]
    fn test_scopes_are_isolated() {
        let kv = KvStore::in_memory().unwrap();
        let device = kv.scope("device").unwrap();
        let site = kv.scope("site").unwrap();

        device.set("reducedMotion", &true).unwrap();
        site.set("activePaletteId", "terminal").unwrap();

        assert_eq!(device.get::<bool>("reducedMotion").unwrap(), Some(true));
        assert_eq!(site.get::<bool>("reducedMotion").unwrap(), None);
        assert_eq!(site.keys().unwrap(), vec!["activePaletteId".to_string()]);

        let mut names = kv.scope_names().unwrap();
        names.sort();
        assert_eq!(names, vec!["device".to_string(), "site".to_string()]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kv.db").to_string_lossy().into_owned();

        {
            let kv = KvStore::new(KvConfig::new(&path).flush_every_ms(None)).unwrap();
            kv.scope("site").unwrap().set("activePaletteId", "synthwave").unwrap();
            kv.flush().unwrap();
        }

        let kv = KvStore::new(KvConfig::new(&path).flush_every_ms(None)).unwrap();
        let value: Option<String> = kv.scope("site").unwrap().get("activePaletteId").unwrap();
        assert_eq!(value.as_deref(), Some("synthwave"));
    }
}
