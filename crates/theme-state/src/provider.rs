//! Theme provider
//!
//! Holds the resolved theme context for a page and hands out scopes to its
//! consumers. The context is replaced wholesale, so subscribers always see
//! the string and numeric maps of the same palette.

use palette::{apply_css_variables, PaletteRegistry, StyleSink, ThemeContext, ThemeScope};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::resolver::ActiveThemeResolver;

/// Source of the current theme context
///
/// # Example
///
/// ```
/// use palette::{builtin_registry, ColorSlot};
/// use std::sync::Arc;
/// use theme_state::ThemeProvider;
///
/// let provider = ThemeProvider::new(Arc::new(builtin_registry()), "terminal");
/// let scope = provider.scope();
/// let theme = scope.use_palette().unwrap();
/// assert_eq!(theme.color(ColorSlot::Accent), "#33FF66");
/// ```
pub struct ThemeProvider {
    registry: Arc<PaletteRegistry>,
    context_tx: watch::Sender<Arc<ThemeContext>>,
}

impl ThemeProvider {
    /// Create a provider for `palette_id` (unknown ids use the default palette)
    pub fn new(registry: Arc<PaletteRegistry>, palette_id: &str) -> Self {
        let (context_tx, _) = watch::channel(registry.context_for(palette_id));
        Self {
            registry,
            context_tx,
        }
    }

    /// Create a provider for the currently active palette
    pub async fn from_resolver(resolver: &ActiveThemeResolver) -> Self {
        let id = resolver.resolve_active_palette_id().await;
        Self::new(resolver.registry().clone(), &id)
    }

    /// Current context
    pub fn current(&self) -> Arc<ThemeContext> {
        self.context_tx.borrow().clone()
    }

    /// Scope for consumers rendered inside this provider
    pub fn scope(&self) -> ThemeScope {
        ThemeScope::root(self.current())
    }

    /// Switch to another palette; returns the new context
    ///
    /// Subscribers are only notified when the palette actually changes.
    pub fn replace(&self, palette_id: &str) -> Arc<ThemeContext> {
        let next = self.registry.context_for(palette_id);
        let changed = self.context_tx.send_if_modified(|current| {
            if current.palette_id() == next.palette_id() {
                false
            } else {
                *current = next.clone();
                true
            }
        });
        if changed {
            debug!(palette_id = next.palette_id(), "Theme context replaced");
        }
        next
    }

    /// Re-resolve the active palette and switch to it
    pub async fn refresh(&self, resolver: &ActiveThemeResolver) -> Arc<ThemeContext> {
        let id = resolver.resolve_active_palette_id().await;
        self.replace(&id)
    }

    /// Receive every future context
    pub fn subscribe(&self) -> watch::Receiver<Arc<ThemeContext>> {
        self.context_tx.subscribe()
    }

    /// Write the current colors as CSS custom properties
    pub fn mirror_css(&self, sink: &mut dyn StyleSink) {
        apply_css_variables(&self.current(), sink);
    }
}
