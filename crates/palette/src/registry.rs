//! Palette registry
//!
//! An immutable catalog of palettes. Construction validates the catalog once;
//! lookups never fail afterwards.

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::color::ColorError;
use crate::context::ThemeContext;
use crate::palette::{ColorSlot, Palette, PaletteCategory};

/// Registry validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry has no palettes
    #[error("Palette registry must contain at least one palette")]
    Empty,

    /// Two palettes share an id
    #[error("Duplicate palette id: {0}")]
    DuplicateId(String),

    /// A palette slot is not a `#RRGGBB` color
    #[error("Palette {palette} has invalid {slot} color: {source}")]
    InvalidColor {
        /// Palette id
        palette: String,
        /// Offending slot
        slot: ColorSlot,
        /// Underlying parse error
        source: ColorError,
    },
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Ordered, validated catalog of palettes
#[derive(Debug, Clone)]
pub struct PaletteRegistry {
    palettes: Vec<Palette>,
    contexts: Vec<Arc<ThemeContext>>,
}

impl PaletteRegistry {
    /// Build a registry, checking that it is non-empty, ids are unique and every
    /// slot is a valid hex color
    pub fn new(palettes: Vec<Palette>) -> Result<Self> {
        if palettes.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::with_capacity(palettes.len());
        let mut contexts = Vec::with_capacity(palettes.len());
        for palette in &palettes {
            if !seen.insert(palette.id.as_str()) {
                return Err(RegistryError::DuplicateId(palette.id.clone()));
            }
            let context =
                ThemeContext::from_palette(palette).map_err(|e| RegistryError::InvalidColor {
                    palette: palette.id.clone(),
                    slot: e.slot,
                    source: e.source,
                })?;
            contexts.push(Arc::new(context));
        }

        Ok(Self { palettes, contexts })
    }

    /// All palettes in registry order
    pub fn list_palettes(&self) -> &[Palette] {
        &self.palettes
    }

    /// Look up a palette, falling back to the first entry for unknown ids
    pub fn get_palette(&self, id: &str) -> &Palette {
        &self.palettes[self.position(id).unwrap_or(0)]
    }

    /// Look up a palette without falling back
    pub fn find(&self, id: &str) -> Option<&Palette> {
        self.position(id).map(|i| &self.palettes[i])
    }

    /// Check whether an id names a registered palette
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// The palette used when nothing else is selected
    pub fn default_palette(&self) -> &Palette {
        &self.palettes[0]
    }

    /// Resolved theme context for a palette id, with the same fallback as
    /// [`PaletteRegistry::get_palette`]
    ///
    /// Contexts are derived once at construction, so repeated lookups for the
    /// same palette share one allocation.
    pub fn context_for(&self, id: &str) -> Arc<ThemeContext> {
        Arc::clone(&self.contexts[self.position(id).unwrap_or(0)])
    }

    /// Palettes in a category, in registry order
    pub fn by_category(&self, category: PaletteCategory) -> impl Iterator<Item = &Palette> {
        self.palettes.iter().filter(move |p| p.category == category)
    }

    /// Number of palettes
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    /// Always false; a registry cannot be empty
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.palettes.iter().position(|p| p.id == id)
    }
}
