//! CSS custom property mirror
//!
//! The active palette is written to the document root as eight `--*` variables
//! so plain style sheets stay in sync without reading the context. The served
//! stylesheet also carries `--fallback-gradient`, the static background pages
//! show when the animated scene is gated off.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::context::ThemeContext;
use crate::gradient::fallback_gradient;
use crate::palette::ColorSlot;

/// Custom property holding the static fallback gradient
pub const FALLBACK_GRADIENT_VARIABLE: &str = "--fallback-gradient";

/// Destination for style properties (a document root, a buffer, ...)
pub trait StyleSink {
    /// Set one custom property
    fn set_property(&mut self, name: &str, value: &str);
}

impl StyleSink for BTreeMap<String, String> {
    fn set_property(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

/// Names of the mirrored variables in slot order
pub fn css_variable_names() -> [&'static str; ColorSlot::COUNT] {
    ColorSlot::ALL.map(ColorSlot::css_variable)
}

/// Write every slot of the context to the sink
pub fn apply_css_variables(context: &ThemeContext, sink: &mut dyn StyleSink) {
    for (slot, value) in context.colors().iter() {
        sink.set_property(slot.css_variable(), value);
    }
}

/// Render the context as a `:root { ... }` block
pub fn css_root_block(context: &ThemeContext) -> String {
    render_root(context, None)
}

/// Render the site stylesheet: the eight color variables plus
/// [`FALLBACK_GRADIENT_VARIABLE`] derived from the same palette
pub fn theme_stylesheet(context: &ThemeContext) -> String {
    let gradient = fallback_gradient(context).to_css();
    render_root(context, Some(&gradient))
}

fn render_root(context: &ThemeContext, gradient: Option<&str>) -> String {
    let mut css = String::from(":root {\n");
    // Writing to a String cannot fail
    for (slot, value) in context.colors().iter() {
        let _ = writeln!(css, "  {}: {};", slot.css_variable(), value);
    }
    if let Some(gradient) = gradient {
        let _ = writeln!(css, "  {}: {};", FALLBACK_GRADIENT_VARIABLE, gradient);
    }
    css.push_str("}\n");
    css
}
