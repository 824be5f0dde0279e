//! RGBA colors

use std::str::FromStr;

use crate::{CoreError, Result};

/// RGBA color with components in `0.0..=1.0`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a packed `0xRRGGBB` value
    pub fn from_u32(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim_start_matches('#');
        let invalid = || CoreError::InvalidHexColor(hex.to_string());

        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| -> Result<f32> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| invalid())
        };

        let a = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Components converted to 8-bit channels
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rgb() {
        let c = Color::from_hex("#FF00AA").unwrap();
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 170.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_from_hex_rgba_without_hash() {
        let c = Color::from_hex("00ff0080").unwrap();
        assert_eq!(c.g, 1.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Color::from_hex("#FFF").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn test_from_u32_matches_hex() {
        assert_eq!(Color::from_u32(0x121212), Color::from_hex("#121212").unwrap());
    }

    #[test]
    fn test_to_rgba8_clamps() {
        assert_eq!(Color::rgba(2.0, -1.0, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
    }
}
