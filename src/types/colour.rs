//! Colour type, named palette and colour-space conversion.

use std::fmt;

use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

use crate::error::{DmxError, Result};

/// An RGB colour value, one byte per DMX channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// One entry of the named palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaletteEntry {
    /// Fully saturated hue in degrees, at half lightness.
    Hue(f32),
    /// Greyscale values that have no meaningful hue.
    Special(Colour),
}

/// Named palette usable as shorthand colour values and internal icons.
pub const PALETTE: &[(&str, PaletteEntry)] = &[
    ("red", PaletteEntry::Hue(0.0)),
    ("orange", PaletteEntry::Hue(30.0)),
    ("yellow", PaletteEntry::Hue(60.0)),
    ("lime", PaletteEntry::Hue(90.0)),
    ("green", PaletteEntry::Hue(120.0)),
    ("cyan", PaletteEntry::Hue(180.0)),
    ("azure", PaletteEntry::Hue(210.0)),
    ("blue", PaletteEntry::Hue(240.0)),
    ("violet", PaletteEntry::Hue(270.0)),
    ("magenta", PaletteEntry::Hue(300.0)),
    ("pink", PaletteEntry::Hue(330.0)),
    ("black", PaletteEntry::Special(Colour::BLACK)),
    ("gray", PaletteEntry::Special(Colour::GRAY)),
    ("white", PaletteEntry::Special(Colour::WHITE)),
];

impl Colour {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const GRAY: Self = Self::rgb(128, 128, 128);

    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Parse a hex colour string.
    ///
    /// Supports formats:
    /// - `#RGB` (each digit doubled, `#f80` is `#ff8800`)
    /// - `#RRGGBB`
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').ok_or_else(|| invalid_hex(s))?;
        if !hex.is_ascii() {
            return Err(invalid_hex(s));
        }

        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(parse_hex_digit);
                let mut next = || digits.next().unwrap_or_else(|| Err(invalid_hex(s)));
                let (r, g, b) = (next()?, next()?, next()?);
                Ok(Self::rgb(r << 4 | r, g << 4 | g, b << 4 | b))
            }
            6 => {
                let r = parse_hex_byte(&hex[0..2])?;
                let g = parse_hex_byte(&hex[2..4])?;
                let b = parse_hex_byte(&hex[4..6])?;
                Ok(Self::rgb(r, g, b))
            }
            _ => Err(invalid_hex(s)),
        }
    }

    /// Convert hue (degrees), lightness and saturation (both 0.0-1.0).
    pub fn from_hls(hue: f32, lightness: f32, saturation: f32) -> Self {
        let hsl: Hsl = Hsl::new(hue, saturation.clamp(0.0, 1.0), lightness.clamp(0.0, 1.0));
        let rgb: Srgb = hsl.into_color();

        Self::rgb(
            unit_to_byte(rgb.red),
            unit_to_byte(rgb.green),
            unit_to_byte(rgb.blue),
        )
    }

    /// Look up a palette colour by name (case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, entry)| entry.colour())
    }

    /// Scale every component by a 0-255 level, truncating.
    pub fn scaled(self, level: u8) -> Self {
        let scale = |c: u8| (c as u16 * level as u16 / 255) as u8;
        Self::rgb(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl PaletteEntry {
    pub fn colour(self) -> Colour {
        match self {
            PaletteEntry::Hue(hue) => Colour::from_hls(hue, 0.5, 1.0),
            PaletteEntry::Special(colour) => colour,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn invalid_hex(s: &str) -> DmxError {
    DmxError::value(format!("invalid hex colour \"{}\"", s)).with_help("Use #RGB or #RRGGBB format")
}

/// Parse a single hex digit.
fn parse_hex_digit(c: char) -> Result<u8> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| DmxError::value(format!("invalid hex digit '{}'", c)))
}

/// Parse a two-character hex byte.
fn parse_hex_byte(s: &str) -> Result<u8> {
    u8::from_str_radix(s, 16).map_err(|_| DmxError::value(format!("invalid hex byte \"{}\"", s)))
}
