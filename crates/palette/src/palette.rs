//! Palette records and the eight named color slots

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::color::Color;

// =============================================================================
// Color Slots
// =============================================================================

/// The fixed set of named colors every palette defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorSlot {
    /// Page background
    Background,
    /// Raised surfaces (cards, panels)
    BackgroundLight,
    /// Highlight color for links and emphasis
    Accent,
    /// Call-to-action buttons
    Cta,
    /// Body text
    Foreground,
    /// First particle stream / river base
    Stream1,
    /// Second particle stream
    Stream2,
    /// Third particle stream
    Stream3,
}

impl ColorSlot {
    /// Number of slots in a palette
    pub const COUNT: usize = 8;

    /// All slots in their canonical order
    pub const ALL: [ColorSlot; Self::COUNT] = [
        ColorSlot::Background,
        ColorSlot::BackgroundLight,
        ColorSlot::Accent,
        ColorSlot::Cta,
        ColorSlot::Foreground,
        ColorSlot::Stream1,
        ColorSlot::Stream2,
        ColorSlot::Stream3,
    ];

    /// Position of this slot in [`ColorSlot::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Key used in serialized color maps (e.g., "backgroundLight")
    pub const fn key(self) -> &'static str {
        match self {
            ColorSlot::Background => "background",
            ColorSlot::BackgroundLight => "backgroundLight",
            ColorSlot::Accent => "accent",
            ColorSlot::Cta => "cta",
            ColorSlot::Foreground => "foreground",
            ColorSlot::Stream1 => "stream1",
            ColorSlot::Stream2 => "stream2",
            ColorSlot::Stream3 => "stream3",
        }
    }

    /// CSS custom property mirrored on the document root (e.g., "--background-light")
    pub const fn css_variable(self) -> &'static str {
        match self {
            ColorSlot::Background => "--background",
            ColorSlot::BackgroundLight => "--background-light",
            ColorSlot::Accent => "--accent",
            ColorSlot::Cta => "--cta",
            ColorSlot::Foreground => "--foreground",
            ColorSlot::Stream1 => "--stream1",
            ColorSlot::Stream2 => "--stream2",
            ColorSlot::Stream3 => "--stream3",
        }
    }
}

impl fmt::Display for ColorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ColorSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorSlot::ALL
            .into_iter()
            .find(|slot| slot.key() == s || slot.css_variable().trim_start_matches("--") == s)
            .ok_or_else(|| format!("Unknown color slot: {}", s))
    }
}

// =============================================================================
// Slot Map
// =============================================================================

/// A value for every [`ColorSlot`]
///
/// Backed by a fixed array, so two slot maps always expose the same key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMap<T> {
    values: [T; ColorSlot::COUNT],
}

impl<T> SlotMap<T> {
    /// Build a map by computing a value for each slot
    pub fn from_fn(mut f: impl FnMut(ColorSlot) -> T) -> Self {
        Self {
            values: std::array::from_fn(|i| f(ColorSlot::ALL[i])),
        }
    }

    /// Get the value for a slot
    pub fn get(&self, slot: ColorSlot) -> &T {
        &self.values[slot.index()]
    }

    /// Iterate over `(slot, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (ColorSlot, &T)> {
        ColorSlot::ALL.into_iter().zip(self.values.iter())
    }

    /// Iterate over the slots of this map
    pub fn keys(&self) -> impl Iterator<Item = ColorSlot> {
        ColorSlot::ALL.into_iter()
    }

    /// Derive a new map with the same keys
    pub fn map<U>(&self, mut f: impl FnMut(ColorSlot, &T) -> U) -> SlotMap<U> {
        SlotMap::from_fn(|slot| f(slot, self.get(slot)))
    }

    /// Fallible variant of [`SlotMap::map`]
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(ColorSlot, &T) -> Result<U, E>,
    ) -> Result<SlotMap<U>, E> {
        let mut out = Vec::with_capacity(ColorSlot::COUNT);
        for (slot, value) in self.iter() {
            out.push(f(slot, value)?);
        }
        let mut out = out.into_iter();
        Ok(SlotMap::from_fn(|_| out.next().expect("one value per slot")))
    }
}

impl<T> Index<ColorSlot> for SlotMap<T> {
    type Output = T;

    fn index(&self, slot: ColorSlot) -> &T {
        self.get(slot)
    }
}

impl<T: Serialize> Serialize for SlotMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ColorSlot::COUNT))?;
        for (slot, value) in self.iter() {
            map.serialize_entry(slot.key(), value)?;
        }
        map.end()
    }
}

// =============================================================================
// Palette
// =============================================================================

/// Admin grouping for palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteCategory {
    /// Inspired by a place
    Regional,
    /// Inspired by tools and terminals
    Tech,
}

impl PaletteCategory {
    /// Human-readable label for the admin picker
    pub fn label(&self) -> &'static str {
        match self {
            PaletteCategory::Regional => "Regional",
            PaletteCategory::Tech => "Tech",
        }
    }
}

/// The eight colors of a palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteColors {
    /// Page background
    pub background: Color,
    /// Raised surfaces
    pub background_light: Color,
    /// Highlight color
    pub accent: Color,
    /// Call-to-action color
    pub cta: Color,
    /// Body text
    pub foreground: Color,
    /// First stream color
    pub stream1: Color,
    /// Second stream color
    pub stream2: Color,
    /// Third stream color
    pub stream3: Color,
}

impl PaletteColors {
    /// Create palette colors from slot-ordered values
    pub fn from_slots(values: [&str; ColorSlot::COUNT]) -> Self {
        let [background, background_light, accent, cta, foreground, stream1, stream2, stream3] =
            values.map(str::to_string);
        Self {
            background,
            background_light,
            accent,
            cta,
            foreground,
            stream1,
            stream2,
            stream3,
        }
    }

    /// Get the color assigned to a slot
    pub fn get(&self, slot: ColorSlot) -> &Color {
        match slot {
            ColorSlot::Background => &self.background,
            ColorSlot::BackgroundLight => &self.background_light,
            ColorSlot::Accent => &self.accent,
            ColorSlot::Cta => &self.cta,
            ColorSlot::Foreground => &self.foreground,
            ColorSlot::Stream1 => &self.stream1,
            ColorSlot::Stream2 => &self.stream2,
            ColorSlot::Stream3 => &self.stream3,
        }
    }

    /// Copy the colors into a slot map
    pub fn to_slot_map(&self) -> SlotMap<Color> {
        SlotMap::from_fn(|slot| self.get(slot).clone())
    }
}

/// A named, immutable set of theme colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Unique slug (e.g., "midnight-river")
    pub id: String,
    /// Display name
    pub name: String,
    /// Admin grouping
    pub category: PaletteCategory,
    /// Slot colors
    pub colors: PaletteColors,
}

impl Palette {
    /// Create a new palette
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: PaletteCategory,
        colors: PaletteColors,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            colors,
        }
    }
}
