//! Palette theming for Tideline
//!
//! This crate is the single source of truth for the site's colors: a registry
//! of named eight-color palettes, the resolved theme context derived from the
//! active palette, and the mirrors that carry it to styling and rendering.
//!
//! # Modules
//!
//! - [`color`] - Hex parsing and integer conversion
//! - [`palette`] - Palette records, color slots and slot maps
//! - [`registry`] - Validated palette catalog with fallback lookup
//! - [`builtin`] - Palettes shipped with the site
//! - [`context`] - Resolved theme context and consumer scope
//! - [`css`] - CSS custom property mirror
//! - [`gradient`] - Static fallback gradient
//!
//! # Example
//!
//! ```rust
//! use palette::{builtin_registry, ColorSlot, ThemeScope};
//!
//! let registry = builtin_registry();
//! let scope = ThemeScope::root(registry.context_for("synthwave"));
//!
//! let theme = scope.use_palette().unwrap();
//! assert_eq!(theme.color(ColorSlot::Accent), "#FF3CAC");
//! assert_eq!(theme.numeric_color(ColorSlot::Accent), 0xFF3CAC);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builtin;
pub mod color;
pub mod context;
pub mod css;
pub mod gradient;
pub mod palette;
pub mod registry;

pub use builtin::{builtin_palettes, builtin_registry, DEFAULT_PALETTE_ID};
pub use color::{hex_to_int, int_to_hex, ColorError};
pub use context::{ColorMap, MissingThemeProviderError, NumericColorMap, ThemeContext, ThemeScope};
pub use css::{
    apply_css_variables, css_root_block, theme_stylesheet, StyleSink, FALLBACK_GRADIENT_VARIABLE,
};
pub use gradient::{fallback_gradient, Gradient, GradientStop};
pub use palette::{ColorSlot, Palette, PaletteCategory, PaletteColors, SlotMap};
pub use registry::{PaletteRegistry, RegistryError};
