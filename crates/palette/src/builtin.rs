//! Palettes shipped with the site
//!
//! Order matters: the first palette is the default and the fallback for
//! unknown ids.

use crate::palette::{Palette, PaletteCategory, PaletteColors};
use crate::registry::PaletteRegistry;

/// Id of the palette used when no active theme is stored
pub const DEFAULT_PALETTE_ID: &str = "midnight-river";

// Slot order: background, backgroundLight, accent, cta, foreground, stream1, stream2, stream3

fn palette(id: &str, name: &str, category: PaletteCategory, colors: [&str; 8]) -> Palette {
    Palette::new(id, name, category, PaletteColors::from_slots(colors))
}

/// Deep navy night with cool blue streams (default)
pub fn midnight_river() -> Palette {
    palette(
        DEFAULT_PALETTE_ID,
        "Midnight River",
        PaletteCategory::Regional,
        ["#0B1320", "#16223A", "#1E90FF", "#FF7A59", "#E6EEF8", "#1E90FF", "#38BDF8", "#A5B4FC"],
    )
}

/// Wet evergreen and slate
pub fn pacific_northwest() -> Palette {
    palette(
        "pacific-northwest",
        "Pacific Northwest",
        PaletteCategory::Regional,
        ["#0B1D26", "#14303D", "#4FB3BF", "#F2A65A", "#E8F1F2", "#2E86AB", "#5FBFAE", "#A3D9C9"],
    )
}

/// Warm sand and terracotta after sunset
pub fn desert_dusk() -> Palette {
    palette(
        "desert-dusk",
        "Desert Dusk",
        PaletteCategory::Regional,
        ["#1F1410", "#2E1F18", "#E07A5F", "#F2CC8F", "#F4EDE4", "#C1666B", "#E9A178", "#F6D8AE"],
    )
}

/// Polar night with aurora streams
pub fn nordic_aurora() -> Palette {
    palette(
        "nordic-aurora",
        "Nordic Aurora",
        PaletteCategory::Regional,
        ["#0A0F1A", "#131B2B", "#06FFA5", "#9D4EDD", "#EDF2FB", "#3A86FF", "#06D6A0", "#9D4EDD"],
    )
}

/// Temple garden moss with a lacquer red call to action
pub fn kyoto_moss() -> Palette {
    palette(
        "kyoto-moss",
        "Kyoto Moss",
        PaletteCategory::Regional,
        ["#121A14", "#1C2A20", "#8DB580", "#D9534F", "#EEF2E6", "#4F7942", "#7FA37A", "#C9D9A8"],
    )
}

/// Phosphor green on black
pub fn terminal() -> Palette {
    palette(
        "terminal",
        "Terminal",
        PaletteCategory::Tech,
        ["#0C0C0C", "#161616", "#33FF66", "#FFB000", "#D8FFD8", "#1A9E45", "#33FF66", "#9DFFB0"],
    )
}

/// Neon magenta and cyan
pub fn synthwave() -> Palette {
    palette(
        "synthwave",
        "Synthwave",
        PaletteCategory::Tech,
        ["#1A1033", "#2A1B4D", "#FF3CAC", "#FFD319", "#F9F4FF", "#784BA0", "#2B86C5", "#FF3CAC"],
    )
}

/// Solarized dark base tones
pub fn solarized_night() -> Palette {
    palette(
        "solarized-night",
        "Solarized Night",
        PaletteCategory::Tech,
        ["#002B36", "#073642", "#2AA198", "#CB4B16", "#FDF6E3", "#268BD2", "#2AA198", "#859900"],
    )
}

/// Light paper with ink-blue streams
pub fn paper_ink() -> Palette {
    palette(
        "paper-ink",
        "Paper & Ink",
        PaletteCategory::Tech,
        ["#F7F5F0", "#FFFFFF", "#1E90FF", "#E4572E", "#1B1B1B", "#1E90FF", "#5DA9E9", "#A8D0F0"],
    )
}

/// All built-in palettes in registry order
pub fn builtin_palettes() -> Vec<Palette> {
    vec![
        midnight_river(),
        pacific_northwest(),
        desert_dusk(),
        nordic_aurora(),
        kyoto_moss(),
        terminal(),
        synthwave(),
        solarized_night(),
        paper_ink(),
    ]
}

/// Registry of the built-in palettes
pub fn builtin_registry() -> PaletteRegistry {
    PaletteRegistry::new(builtin_palettes()).expect("built-in palettes are valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{ColorSlot, PaletteCategory};
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_registry_builds() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), builtin_palettes().len());
    }

    #[test]
    fn test_default_palette_is_first() {
        let registry = builtin_registry();
        assert_eq!(registry.default_palette().id, DEFAULT_PALETTE_ID);
        assert_eq!(registry.list_palettes()[0].id, DEFAULT_PALETTE_ID);
    }

    #[test]
    fn test_every_slot_is_six_digit_hex() {
        let hex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
        for palette in builtin_palettes() {
            for slot in ColorSlot::ALL {
                let value = palette.colors.get(slot);
                assert!(hex.is_match(value), "{} {} = {}", palette.id, slot, value);
            }
        }
    }

    #[test]
    fn test_ids_unique() {
        let palettes = builtin_palettes();
        let ids: HashSet<_> = palettes.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), palettes.len());
    }

    #[test]
    fn test_both_categories_present() {
        let registry = builtin_registry();
        assert!(registry.by_category(PaletteCategory::Regional).count() > 0);
        assert!(registry.by_category(PaletteCategory::Tech).count() > 0);
    }

    #[test]
    fn test_lookup_properties_over_builtins() {
        let registry = builtin_registry();
        for palette in registry.list_palettes() {
            assert_eq!(registry.get_palette(&palette.id).id, palette.id);
        }
        for id in ["", "midnight", "Terminal", "paper_ink", "🌊"] {
            assert_eq!(registry.get_palette(id).id, registry.list_palettes()[0].id);
        }
    }
}
