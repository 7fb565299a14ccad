//! Hex color parsing and conversion
//!
//! Palette colors are stored as `#RRGGBB` strings for styling and converted to
//! 24-bit integers for the rendering pipeline.

use thiserror::Error;

/// A color represented as an RGB hex string (e.g., "#1E90FF")
pub type Color = String;

/// Largest value a 24-bit RGB color can take
pub const MAX_COLOR: u32 = 0xFF_FFFF;

/// Color conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The string is not a 6-digit hex color
    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),
}

/// Result type for color operations
pub type Result<T> = std::result::Result<T, ColorError>;

/// Check that a string is exactly `#` followed by six hex digits
pub fn is_valid_hex(hex: &str) -> bool {
    match hex.strip_prefix('#') {
        Some(digits) => digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parse a `#RRGGBB` string into a 24-bit integer
///
/// # Examples
/// ```
/// use palette::color::hex_to_int;
///
/// assert_eq!(hex_to_int("#1E90FF").unwrap(), 0x1E90FF);
/// assert_eq!(hex_to_int("#000000").unwrap(), 0);
/// ```
pub fn hex_to_int(hex: &str) -> Result<u32> {
    if !is_valid_hex(hex) {
        return Err(ColorError::InvalidHex(hex.to_string()));
    }
    u32::from_str_radix(&hex[1..], 16).map_err(|_| ColorError::InvalidHex(hex.to_string()))
}

/// Format a 24-bit integer as an uppercase `#RRGGBB` string
pub fn int_to_hex(value: u32) -> String {
    format!("#{:06X}", value & MAX_COLOR)
}

/// Split a 24-bit integer into its RGB bytes
pub fn int_to_rgb(value: u32) -> (u8, u8, u8) {
    (
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    )
}

/// Convert a 24-bit integer into normalized `[r, g, b]` channels in `0.0..=1.0`
pub fn int_to_unit_rgb(value: u32) -> [f32; 3] {
    let (r, g, b) = int_to_rgb(value);
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_int_examples() {
        assert_eq!(hex_to_int("#1E90FF").unwrap(), 0x1E90FF);
        assert_eq!(hex_to_int("#ffffff").unwrap(), 0xFFFFFF);
        assert_eq!(hex_to_int("#000000").unwrap(), 0);
    }

    #[test]
    fn test_hex_to_int_rejects_malformed() {
        assert!(hex_to_int("1E90FF").is_err());
        assert!(hex_to_int("#1E90F").is_err());
        assert!(hex_to_int("#1E90FFAA").is_err());
        assert!(hex_to_int("#GG0000").is_err());
        assert!(hex_to_int("").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        for hex in ["#1E90FF", "#ffffff", "#000000", "#0a0F1a", "#9D4EDD", "#06FFA5"] {
            let value = hex_to_int(hex).unwrap();
            assert!(value <= MAX_COLOR);
            assert_eq!(int_to_hex(value), hex.to_ascii_uppercase());
        }
    }

    #[test]
    fn test_int_to_hex_masks_overflow() {
        assert_eq!(int_to_hex(0x01_1E90FF), "#1E90FF");
    }

    #[test]
    fn test_non_ascii_input_rejected() {
        assert!(!is_valid_hex("#a\u{e9}1234"));
        assert!(hex_to_int("#a\u{e9}1234").is_err());
        assert!(hex_to_int("#\u{e9}\u{e9}\u{e9}").is_err());
    }

    #[test]
    fn test_int_to_rgb_splits_channels() {
        assert_eq!(int_to_rgb(hex_to_int("#9D4EDD").unwrap()), (157, 78, 221));
        assert_eq!(int_to_rgb(0x01_000000), (0, 0, 0));
    }

    #[test]
    fn test_int_to_unit_rgb() {
        assert_eq!(int_to_unit_rgb(0xFFFFFF), [1.0, 1.0, 1.0]);
        assert_eq!(int_to_unit_rgb(0x000000), [0.0, 0.0, 0.0]);
        let [r, g, b] = int_to_unit_rgb(0xFF0080);
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 128.0 / 255.0).abs() < f32::EPSILON);
    }
}
