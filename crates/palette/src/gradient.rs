//! Static gradient shown in place of the animated scene

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::context::ThemeContext;
use crate::palette::ColorSlot;

/// A gradient stop with position and color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position from 0.0 to 1.0
    pub position: f32,
    /// Color at this position
    pub color: Color,
}

/// A linear gradient definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Direction in degrees (CSS convention, 180 = top to bottom)
    pub angle_deg: f32,
    /// Gradient stops
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Create a new gradient with stops
    pub fn new(angle_deg: f32, stops: Vec<(f32, &str)>) -> Self {
        Self {
            angle_deg,
            stops: stops
                .into_iter()
                .map(|(pos, color)| GradientStop {
                    position: pos.clamp(0.0, 1.0),
                    color: color.to_string(),
                })
                .collect(),
        }
    }

    /// Render as a CSS `linear-gradient(...)` value
    pub fn to_css(&self) -> String {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|s| format!("{} {}%", s.color, (s.position * 100.0).round()))
            .collect();
        format!("linear-gradient({}deg, {})", self.angle_deg, stops.join(", "))
    }
}

/// Gradient used when motion is disabled or the scene cannot run
///
/// Fades from the page background through the raised surface color into the
/// first stream color, echoing the river at rest.
pub fn fallback_gradient(context: &ThemeContext) -> Gradient {
    Gradient::new(
        180.0,
        vec![
            (0.0, context.color(ColorSlot::Background)),
            (0.55, context.color(ColorSlot::BackgroundLight)),
            (1.0, context.color(ColorSlot::Stream1)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Palette, PaletteCategory, PaletteColors};

    #[test]
    fn test_fallback_gradient_uses_palette() {
        let palette = Palette::new(
            "g",
            "G",
            PaletteCategory::Tech,
            PaletteColors::from_slots([
                "#111111", "#222222", "#333333", "#444444", "#555555", "#666666", "#777777",
                "#888888",
            ]),
        );
        let ctx = ThemeContext::from_palette(&palette).unwrap();
        let gradient = fallback_gradient(&ctx);

        assert_eq!(gradient.stops.len(), 3);
        assert_eq!(gradient.stops[0].color, "#111111");
        assert_eq!(gradient.stops[2].color, "#666666");
        assert_eq!(
            gradient.to_css(),
            "linear-gradient(180deg, #111111 0%, #222222 55%, #666666 100%)"
        );
    }

    #[test]
    fn test_gradient_stop_positions_clamped() {
        let gradient = Gradient::new(90.0, vec![(-0.5, "#000000"), (1.5, "#FFFFFF")]);
        assert_eq!(gradient.stops[0].position, 0.0);
        assert_eq!(gradient.stops[1].position, 1.0);
    }

    #[test]
    fn test_gradient_serialization() {
        let gradient = Gradient::new(45.0, vec![(0.0, "#000000"), (1.0, "#FFFFFF")]);
        let json = serde_json::to_string(&gradient).unwrap();
        let parsed: Gradient = serde_json::from_str(&json).unwrap();
        assert_eq!(gradient, parsed);
    }
}
