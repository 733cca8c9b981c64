//! Colors and category spans
//!
//! This module provides the foundation for styled text rendering:
//! the RGB colors themes are built from and the category spans the
//! classification engine emits.

use std::fmt;
use std::str::FromStr;

use super::category::Category;
use crate::error::HighlightError;
use crate::text::TextRange;

/// An RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a 0xRRGGBB literal
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }
}

impl FromStr for Color {
    type Err = HighlightError;

    /// Parse `#rrggbb` or `#rgb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HighlightError::Theme(format!("invalid color '{s}'"));
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        match digits.len() {
            6 => u32::from_str_radix(digits, 16)
                .map(Color::hex)
                .map_err(|_| invalid()),
            3 => {
                let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&expanded, 16)
                    .map(Color::hex)
                    .map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A categorized range of buffer text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub range: TextRange,
    pub category: Category,
}

impl Span {
    pub fn new(range: TextRange, category: Category) -> Self {
        Self { range, category }
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_hex() {
        assert_eq!("#1e1e1e".parse::<Color>().ok(), Some(Color::rgb(0x1e, 0x1e, 0x1e)));
        assert_eq!("#FFF".parse::<Color>().ok(), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::hex(0x569cd6).to_string(), "#569cd6");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("1e1e1e".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("#+12345".parse::<Color>().is_err());
    }
}
