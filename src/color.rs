//! RGBA color values with `#RRGGBB` / `#RRGGBBAA` hex (de)serialization.
//!
//! The editor frontend speaks CSS-style hex strings, so colors serialize as
//! hex in every API schema and in the persisted template collection.

use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque-by-default RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a `#RRGGBB` or `#RRGGBBAA` hex string (leading `#` optional).
    pub fn parse(s: &str) -> Result<Self, String> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let byte = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| format!("invalid hex color '{}'", s))
        };
        match hex.len() {
            6 => Ok(Self {
                r: byte(0..2)?,
                g: byte(2..4)?,
                b: byte(4..6)?,
                a: 255,
            }),
            8 => Ok(Self {
                r: byte(0..2)?,
                g: byte(2..4)?,
                b: byte(4..6)?,
                a: byte(6..8)?,
            }),
            _ => Err(format!("invalid hex color '{}'", s)),
        }
    }

    /// Format as a hex string. Alpha is only emitted when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Alpha-composite `src` over `dst` in place.
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3] as u32;
    if sa == 255 {
        *dst = src;
        return;
    }
    if sa == 0 {
        return;
    }
    let inv = 255 - sa;
    for i in 0..3 {
        dst.0[i] = ((src.0[i] as u32 * sa + dst.0[i] as u32 * inv) / 255) as u8;
    }
    dst.0[3] = (sa + dst.0[3] as u32 * inv / 255).min(255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rgb() {
        assert_eq!(Color::parse("#FF0000").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::parse("00ff00").unwrap(), Color::rgb(0, 255, 0));
    }

    #[test]
    fn parse_rgba() {
        let c = Color::parse("#11223344").unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (0x11, 0x22, 0x33, 0x44));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Color::parse("#F00").is_err());
        assert!(Color::parse("#GGGGGG").is_err());
    }

    #[test]
    fn hex_round_trip() {
        let c = Color::rgb(18, 52, 86);
        assert_eq!(Color::parse(&c.to_hex()).unwrap(), c);
    }

    #[test]
    fn blend_opaque_replaces() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend_over(&mut dst, Rgba([10, 20, 30, 255]));
        assert_eq!(dst, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn blend_half_mixes() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend_over(&mut dst, Rgba([255, 255, 255, 128]));
        assert!(dst.0[0] > 120 && dst.0[0] < 135);
    }
}
