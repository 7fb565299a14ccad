//! Active theme resolution
//!
//! Reads the active palette id from the persisted config store. Resolution
//! never fails: any store error, timeout, missing value or unknown id falls
//! back to the registry's default palette.

use palette::{Palette, PaletteRegistry, ThemeContext};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use storage::{ConfigStore, ACTIVE_PALETTE_KEY};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How long a successful read is reused (None disables caching)
    pub cache_ttl: Option<Duration>,
    /// Upper bound on a single store read
    pub read_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl: None,
            read_timeout: Duration::from_secs(3),
        }
    }
}

impl ResolverConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache successful reads for `ttl`
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Disable caching
    pub fn without_cache(mut self) -> Self {
        self.cache_ttl = None;
        self
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
struct CachedId {
    palette_id: String,
    fetched_at: Instant,
}

/// Cached value plus a generation bumped by every invalidation
///
/// A read only populates the cache if no invalidation happened while it was
/// in flight.
#[derive(Debug, Default)]
struct CacheSlot {
    entry: Option<CachedId>,
    generation: u64,
}

/// Resolves the site-wide active palette
pub struct ActiveThemeResolver {
    store: Arc<dyn ConfigStore>,
    registry: Arc<PaletteRegistry>,
    config: ResolverConfig,
    cache: Mutex<CacheSlot>,
}

impl ActiveThemeResolver {
    /// Create a resolver with default configuration
    pub fn new(store: Arc<dyn ConfigStore>, registry: Arc<PaletteRegistry>) -> Self {
        Self::with_config(store, registry, ResolverConfig::default())
    }

    /// Create a resolver with custom configuration
    pub fn with_config(
        store: Arc<dyn ConfigStore>,
        registry: Arc<PaletteRegistry>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config,
            cache: Mutex::new(CacheSlot::default()),
        }
    }

    /// Palette registry used for validation and fallback
    pub fn registry(&self) -> &Arc<PaletteRegistry> {
        &self.registry
    }

    /// Resolver configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Id of the active palette
    ///
    /// Always a member of the registry.
    pub async fn resolve_active_palette_id(&self) -> String {
        let (cached, generation) = self.cached();
        if let Some(id) = cached {
            return id;
        }

        let read =
            tokio::time::timeout(self.config.read_timeout, self.store.get(ACTIVE_PALETTE_KEY))
                .await;
        let default_id = self.registry.default_palette().id.clone();

        let resolved = match read {
            Ok(Ok(Some(id))) if self.registry.contains(&id) => id,
            Ok(Ok(Some(id))) => {
                warn!(palette_id = %id, "Stored palette id is not registered, using default");
                default_id
            }
            Ok(Ok(None)) => {
                debug!("No active palette stored, using default");
                default_id
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Failed to read active palette, using default");
                return default_id;
            }
            Err(_) => {
                warn!(
                    timeout = ?self.config.read_timeout,
                    "Active palette read timed out, using default"
                );
                return default_id;
            }
        };

        self.store_cache(&resolved, generation);
        resolved
    }

    /// The active palette record
    pub async fn resolve_active_palette(&self) -> &Palette {
        let id = self.resolve_active_palette_id().await;
        self.registry.get_palette(&id)
    }

    /// Theme context for the active palette
    pub async fn resolve_active_context(&self) -> Arc<ThemeContext> {
        let id = self.resolve_active_palette_id().await;
        self.registry.context_for(&id)
    }

    /// Drop any cached value so the next resolution reads the store
    ///
    /// Reads already in flight will not repopulate the cache.
    pub fn invalidate(&self) {
        let mut cache = self.cache.lock();
        cache.generation += 1;
        if cache.entry.take().is_some() {
            debug!("Active palette cache invalidated");
        }
    }

    /// Fresh cached id, and the generation a new read would start from
    fn cached(&self) -> (Option<String>, u64) {
        let cache = self.cache.lock();
        let fresh = self.config.cache_ttl.and_then(|ttl| {
            cache
                .entry
                .as_ref()
                .filter(|c| c.fetched_at.elapsed() < ttl)
                .map(|c| c.palette_id.clone())
        });
        (fresh, cache.generation)
    }

    fn store_cache(&self, palette_id: &str, generation: u64) {
        if self.config.cache_ttl.is_none() {
            return;
        }
        let mut cache = self.cache.lock();
        if cache.generation != generation {
            debug!(palette_id, "Discarding read that raced an invalidation");
            return;
        }
        cache.entry = Some(CachedId {
            palette_id: palette_id.to_string(),
            fetched_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::{builtin_registry, DEFAULT_PALETTE_ID};
    use storage::{MemoryConfigStore, MockConfigStore, StoreError};

    fn registry() -> Arc<PaletteRegistry> {
        Arc::new(builtin_registry())
    }

    #[tokio::test]
    async fn test_resolves_stored_id() {
        let store = Arc::new(MemoryConfigStore::with_values([(ACTIVE_PALETTE_KEY, "terminal")]));
        let resolver = ActiveThemeResolver::new(store, registry());
        assert_eq!(resolver.resolve_active_palette_id().await, "terminal");
        assert_eq!(resolver.resolve_active_palette().await.name, "Terminal");
    }

    #[tokio::test]
    async fn test_absent_value_falls_back() {
        let resolver = ActiveThemeResolver::new(Arc::new(MemoryConfigStore::new()), registry());
        assert_eq!(resolver.resolve_active_palette_id().await, DEFAULT_PALETTE_ID);
    }

    #[tokio::test]
    async fn test_unknown_value_falls_back() {
        let store =
            Arc::new(MemoryConfigStore::with_values([(ACTIVE_PALETTE_KEY, "not-a-palette")]));
        let resolver = ActiveThemeResolver::new(store, registry());
        assert_eq!(resolver.resolve_active_palette_id().await, DEFAULT_PALETTE_ID);
    }

    #[tokio::test]
    async fn test_store_error_falls_back() {
        let mut store = MockConfigStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Unavailable("connection refused".into())));
        store.expect_upsert().never();

        let resolver = ActiveThemeResolver::new(Arc::new(store), registry());
        assert_eq!(resolver.resolve_active_palette_id().await, DEFAULT_PALETTE_ID);
    }

    #[tokio::test]
    async fn test_unconfigured_store_falls_back() {
        let mut store = MockConfigStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Unconfigured("missing token".into())));

        let resolver = ActiveThemeResolver::new(Arc::new(store), registry());
        let context = resolver.resolve_active_context().await;
        assert_eq!(context.palette_id(), DEFAULT_PALETTE_ID);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout_falls_back() {
        struct HangingStore;

        #[async_trait::async_trait]
        impl ConfigStore for HangingStore {
            async fn get(&self, _key: &str) -> storage::config_store::Result<Option<String>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Some("terminal".to_string()))
            }

            async fn upsert(&self, _key: &str, _value: &str) -> storage::config_store::Result<()> {
                Ok(())
            }
        }

        let config = ResolverConfig::new().with_read_timeout(Duration::from_millis(50));
        let resolver = ActiveThemeResolver::with_config(Arc::new(HangingStore), registry(), config);
        assert_eq!(resolver.resolve_active_palette_id().await, DEFAULT_PALETTE_ID);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_reuses_value_until_ttl() {
        let mut store = MockConfigStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some("synthwave".to_string())));
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some("paper-ink".to_string())));

        let config = ResolverConfig::new().with_cache_ttl(Duration::from_secs(30));
        let resolver = ActiveThemeResolver::with_config(Arc::new(store), registry(), config);

        assert_eq!(resolver.resolve_active_palette_id().await, "synthwave");
        assert_eq!(resolver.resolve_active_palette_id().await, "synthwave");

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(resolver.resolve_active_palette_id().await, "paper-ink");
    }

    #[tokio::test]
    async fn test_invalidate_forces_reread() {
        let store = Arc::new(MemoryConfigStore::with_values([(ACTIVE_PALETTE_KEY, "terminal")]));
        let config = ResolverConfig::new().with_cache_ttl(Duration::from_secs(300));
        let resolver = ActiveThemeResolver::with_config(store.clone(), registry(), config);

        assert_eq!(resolver.resolve_active_palette_id().await, "terminal");
        store.upsert(ACTIVE_PALETTE_KEY, "desert-dusk").await.unwrap();
        assert_eq!(resolver.resolve_active_palette_id().await, "terminal");

        resolver.invalidate();
        assert_eq!(resolver.resolve_active_palette_id().await, "desert-dusk");
    }

    #[derive(Default)]
    struct GatedStore {
        started: tokio::sync::Notify,
        release: tokio::sync::Notify,
        reads: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ConfigStore for GatedStore {
        async fn get(&self, _key: &str) -> storage::config_store::Result<Option<String>> {
            let read = self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if read == 0 {
                self.started.notify_one();
                self.release.notified().await;
                return Ok(Some("synthwave".to_string()));
            }
            Ok(Some("paper-ink".to_string()))
        }

        async fn upsert(&self, _key: &str, _value: &str) -> storage::config_store::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_read_racing_invalidate_is_not_cached() {
        let store = Arc::new(GatedStore::default());
        let config = ResolverConfig::new().with_cache_ttl(Duration::from_secs(300));
        let resolver =
            Arc::new(ActiveThemeResolver::with_config(store.clone(), registry(), config));

        let in_flight = tokio::spawn({
            let resolver = resolver.clone();
            async move { resolver.resolve_active_palette_id().await }
        });

        // The palette changes while the first read is still pending
        store.started.notified().await;
        resolver.invalidate();
        store.release.notify_one();

        assert_eq!(in_flight.await.unwrap(), "synthwave");
        assert_eq!(resolver.resolve_active_palette_id().await, "paper-ink");
        assert_eq!(resolver.resolve_active_palette_id().await, "paper-ink");
        assert_eq!(store.reads.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mut store = MockConfigStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(StoreError::Unavailable("down".into())));
        store
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some("nordic-aurora".to_string())));

        let config = ResolverConfig::new().with_cache_ttl(Duration::from_secs(300));
        let resolver = ActiveThemeResolver::with_config(Arc::new(store), registry(), config);

        assert_eq!(resolver.resolve_active_palette_id().await, DEFAULT_PALETTE_ID);
        assert_eq!(resolver.resolve_active_palette_id().await, "nordic-aurora");
    }
}
