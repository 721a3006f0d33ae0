//! RGB colors and the tool palette

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AtelierError;

/// Opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(s: &str) -> Result<Self, AtelierError> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AtelierError::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| AtelierError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = AtelierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Swatches offered by the color picker
pub const PALETTE: [Rgb; 30] = [
    Rgb::new(0x00, 0x00, 0x00), Rgb::new(0xFF, 0xFF, 0xFF), Rgb::new(0xFF, 0x00, 0x00),
    Rgb::new(0x00, 0xFF, 0x00), Rgb::new(0x00, 0x00, 0xFF), Rgb::new(0xFF, 0xFF, 0x00),
    Rgb::new(0xFF, 0x00, 0xFF), Rgb::new(0x00, 0xFF, 0xFF), Rgb::new(0xFF, 0x80, 0x00),
    Rgb::new(0x80, 0x00, 0xFF), Rgb::new(0x00, 0x80, 0xFF), Rgb::new(0x80, 0xFF, 0x00),
    Rgb::new(0xFF, 0x00, 0x80), Rgb::new(0x80, 0x80, 0x80), Rgb::new(0xC0, 0xC0, 0xC0),
    Rgb::new(0x80, 0x00, 0x00), Rgb::new(0x00, 0x80, 0x00), Rgb::new(0x00, 0x00, 0x80),
    Rgb::new(0x80, 0x80, 0x00), Rgb::new(0x80, 0x00, 0x80), Rgb::new(0x00, 0x80, 0x80),
    Rgb::new(0xFF, 0x45, 0x00), Rgb::new(0x32, 0xCD, 0x32), Rgb::new(0x41, 0x69, 0xE1),
    Rgb::new(0xFF, 0xD7, 0x00), Rgb::new(0xFF, 0x69, 0xB4), Rgb::new(0x00, 0xCE, 0xD1),
    Rgb::new(0xFF, 0x63, 0x47), Rgb::new(0x93, 0x70, 0xDB), Rgb::new(0x20, 0xB2, 0xAA),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        assert_eq!(Rgb::from_hex("#FF8000").unwrap(), Rgb::new(255, 128, 0));
        assert_eq!("4169e1".parse::<Rgb>().unwrap(), Rgb::new(0x41, 0x69, 0xE1));
        assert_eq!(Rgb::new(50, 205, 50).to_hex(), "#32CD32");
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Rgb::from_hex("#FFF").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
        assert!(Rgb::from_hex("#ÿÿÿ").is_err());
    }

    #[test]
    fn test_hex_rejects_signs_and_repeated_hash() {
        assert!(Rgb::from_hex("#+1+2+3").is_err());
        assert!(Rgb::from_hex("-1-2-3").is_err());
        assert!(Rgb::from_hex("##123456").is_err());
        assert_eq!(Rgb::from_hex(" #123456 ").unwrap(), Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_palette_is_unique() {
        let mut seen = std::collections::HashSet::new();
        assert!(PALETTE.iter().all(|c| seen.insert(*c)));
        assert_eq!(PALETTE[0], Rgb::BLACK);
        assert_eq!(PALETTE[1], Rgb::WHITE);
    }
}
