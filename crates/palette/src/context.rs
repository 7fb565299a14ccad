//! Resolved theme context and the scope that hands it to consumers
//!
//! A [`ThemeContext`] carries the string colors used for styling and the
//! parallel integer colors used by the renderer. Both maps are derived from one
//! palette in one step and are never edited afterwards; a palette change
//! produces a new context.
//!
//! Consumers receive the context through an explicit [`ThemeScope`] instead of
//! ambient lookup. Asking a detached scope for the palette is a wiring bug and
//! reports [`MissingThemeProviderError`].

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::color::{hex_to_int, Color, ColorError};
use crate::palette::{ColorSlot, Palette, SlotMap};

/// String colors keyed by slot
pub type ColorMap = SlotMap<Color>;

/// 24-bit integer colors keyed by slot
pub type NumericColorMap = SlotMap<u32>;

/// A palette slot failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {slot} color: {source}")]
pub struct SlotColorError {
    /// Offending slot
    pub slot: ColorSlot,
    /// Underlying parse error
    pub source: ColorError,
}

/// Colors of the active palette in both string and numeric form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeContext {
    palette_id: String,
    colors: ColorMap,
    numeric: NumericColorMap,
}

impl ThemeContext {
    /// Derive both color maps from a palette
    pub fn from_palette(palette: &Palette) -> Result<Self, SlotColorError> {
        let colors = palette.colors.to_slot_map();
        let numeric = colors.try_map(|slot, hex| {
            hex_to_int(hex).map_err(|source| SlotColorError { slot, source })
        })?;

        Ok(Self {
            palette_id: palette.id.clone(),
            colors,
            numeric,
        })
    }

    /// Id of the palette this context was derived from
    pub fn palette_id(&self) -> &str {
        &self.palette_id
    }

    /// String colors for styling
    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    /// Integer colors for rendering
    pub fn numeric(&self) -> &NumericColorMap {
        &self.numeric
    }

    /// String color for one slot
    pub fn color(&self, slot: ColorSlot) -> &str {
        self.colors.get(slot)
    }

    /// Integer color for one slot
    pub fn numeric_color(&self, slot: ColorSlot) -> u32 {
        *self.numeric.get(slot)
    }
}

/// A palette consumer ran outside of any provider scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("usePalette must be used within a ThemeProvider scope")]
pub struct MissingThemeProviderError;

/// Handle through which descendants read the active theme
///
/// Cloning a scope is cheap and every clone observes the same context.
#[derive(Debug, Clone, Default)]
pub struct ThemeScope {
    context: Option<Arc<ThemeContext>>,
}

impl ThemeScope {
    /// A scope opened by a provider
    pub fn root(context: Arc<ThemeContext>) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// A scope with no provider above it
    pub fn detached() -> Self {
        Self { context: None }
    }

    /// Whether a provider supplied this scope
    pub fn is_provided(&self) -> bool {
        self.context.is_some()
    }

    /// Read the active theme
    pub fn use_palette(&self) -> Result<&ThemeContext, MissingThemeProviderError> {
        self.context.as_deref().ok_or(MissingThemeProviderError)
    }

    /// Shared handle to the active theme
    pub fn context(&self) -> Result<Arc<ThemeContext>, MissingThemeProviderError> {
        self.context.clone().ok_or(MissingThemeProviderError)
    }

    /// Read the active theme, panicking when no provider is present
    ///
    /// # Panics
    /// Panics with [`MissingThemeProviderError`] on a detached scope.
    pub fn expect_palette(&self) -> &ThemeContext {
        match self.use_palette() {
            Ok(context) => context,
            Err(err) => panic!("{}", err),
        }
    }
}
