use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Luma at or above this value gets black overlay text, below it white.
pub const CONTRAST_THRESHOLD: u32 = 128;

/// An opaque 8-bit sRGB color.
///
/// Serialized as a `#rrggbb` string so palette and pattern files stay
/// readable and match the hex notation bead vendors publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB` (case-insensitive).
    pub fn from_hex(hex: &str) -> crate::Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || CoreError::InvalidColor(hex.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
                Ok(Self::new(
                    channel(0).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                    channel(4).map_err(|_| invalid())?,
                ))
            }
            3 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
                Ok(Self::new(
                    channel(0).map_err(|_| invalid())?,
                    channel(1).map_err(|_| invalid())?,
                    channel(2).map_err(|_| invalid())?,
                ))
            }
            _ => Err(invalid()),
        }
    }

    /// Lower-case `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived brightness using the YIQ weighting, in `0..=255`.
    #[inline]
    pub fn luma(self) -> u32 {
        (self.r as u32 * 299 + self.g as u32 * 587 + self.b as u32 * 114) / 1000
    }

    /// Black or white, whichever stays legible on top of this color.
    #[inline]
    pub fn contrast_text(self) -> Self {
        if self.luma() >= CONTRAST_THRESHOLD {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }

    /// RGBA bytes with the given alpha.
    #[inline]
    pub fn with_alpha(self, a: u8) -> [u8; 4] {
        [self.r, self.g, self.b, a]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// One bead color of a palette. Cells of a pattern hold these by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeadColor {
    /// Vendor code, unique within its palette (e.g. `"H01"`).
    pub id: String,
    pub name: String,
    #[serde(alias = "hex")]
    pub color: Rgb,
}

impl BeadColor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: Rgb) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb::from_hex("#FF8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::from_hex("ff8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!(Rgb::from_hex("#f80").unwrap(), Rgb::new(255, 136, 0));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GGGGGG").is_err());
        assert!(Rgb::from_hex("").is_err());
        assert!(Rgb::from_hex("#+1+2+3").is_err());
    }

    #[test]
    fn hex_display_is_lowercase() {
        assert_eq!(Rgb::new(0xAB, 0x01, 0xFF).to_string(), "#ab01ff");
    }

    #[test]
    fn luma_matches_yiq_weights() {
        assert_eq!(Rgb::WHITE.luma(), 255);
        assert_eq!(Rgb::BLACK.luma(), 0);
        // 255 * 587 / 1000 = 149
        assert_eq!(Rgb::new(0, 255, 0).luma(), 149);
        // 255 * 114 / 1000 = 29
        assert_eq!(Rgb::new(0, 0, 255).luma(), 29);
    }

    #[test]
    fn contrast_text_switches_at_threshold() {
        assert_eq!(Rgb::new(255, 255, 0).contrast_text(), Rgb::BLACK);
        assert_eq!(Rgb::new(0, 0, 128).contrast_text(), Rgb::WHITE);
        assert_eq!(Rgb::new(128, 128, 128).contrast_text(), Rgb::BLACK);
        assert_eq!(Rgb::new(127, 127, 127).contrast_text(), Rgb::WHITE);
    }

    #[test]
    fn bead_color_accepts_hex_alias() {
        let json = r##"{"id":"H01","name":"White","hex":"#FFFFFF"}"##;
        let bead: BeadColor = serde_json::from_str(json).unwrap();
        assert_eq!(bead.color, Rgb::WHITE);
        let out = serde_json::to_string(&bead).unwrap();
        assert!(out.contains(r##""color":"#ffffff""##));
    }
}
