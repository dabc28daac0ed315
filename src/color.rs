//! Color primitives: hex parsing, channel blending, and softening.

use std::fmt;
use std::str::FromStr;

use palette::{Mix, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

// ============================================================================
// RgbColor
// ============================================================================

/// An opaque 8-bit sRGB color.
///
/// Transparency is always resolved before a value of this type exists; see
/// [`blend_over_backdrop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the canonical `#rrggbb` form of this color.
    pub fn to_hex(self) -> HexColor {
        rgb_to_hex(self)
    }
}

impl From<RgbColor> for Srgb<u8> {
    fn from(color: RgbColor) -> Self {
        Srgb::new(color.r, color.g, color.b)
    }
}

impl From<Srgb<u8>> for RgbColor {
    fn from(color: Srgb<u8>) -> Self {
        Self::new(color.red, color.green, color.blue)
    }
}

// ============================================================================
// HexColor
// ============================================================================

/// A normalized hex color string: `#` followed by six lowercase hex digits.
///
/// The only way to build one is through [`normalize_hex`] (or the `FromStr`
/// and serde impls that call it), so every value upholds that form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct HexColor(String);

impl HexColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_rgb(&self) -> RgbColor {
        hex_to_rgb(self)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for HexColor {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_hex(s).ok_or_else(|| InputError::InvalidHex(s.to_string()))
    }
}

impl TryFrom<String> for HexColor {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl From<RgbColor> for HexColor {
    fn from(color: RgbColor) -> Self {
        rgb_to_hex(color)
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Normalizes a user-entered hex color.
///
/// Surrounding whitespace is ignored and a missing `#` is added. Three- and
/// six-digit forms are accepted in either case; shorthand is expanded so the
/// result is always `#rrggbb` in lowercase. Anything else yields `None`.
pub fn normalize_hex(input: &str) -> Option<HexColor> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };

    Some(HexColor(format!("#{}", expanded.to_ascii_lowercase())))
}

/// Parses a normalized hex color into its channels.
pub fn hex_to_rgb(hex: &HexColor) -> RgbColor {
    let digits = &hex.0[1..];
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    RgbColor::new(channel(0), channel(2), channel(4))
}

/// Formats a color as `#rrggbb`.
pub fn rgb_to_hex(color: RgbColor) -> HexColor {
    HexColor(format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b))
}

// ============================================================================
// Blending
// ============================================================================

/// Default strength used when softening a suggested background.
pub const DEFAULT_SOFTEN_AMOUNT: f64 = 0.15;

/// Moves each channel `amount` of the way toward white.
///
/// Keeps colors sampled from artwork pastel enough to sit behind it.
pub fn soften(color: RgbColor, amount: f64) -> RgbColor {
    let amount = clamp(amount, 0.0, 1.0);
    let base = Srgb::new(color.r as f64, color.g as f64, color.b as f64);
    let softened = base.mix(Srgb::new(255.0, 255.0, 255.0), amount);
    let channel = |value: f64| clamp(value.round(), 0.0, 255.0) as u8;
    RgbColor::new(
        channel(softened.red),
        channel(softened.green),
        channel(softened.blue),
    )
}

/// Composites a color with the given opacity over an opaque backdrop.
///
/// `alpha` is clamped to `[0, 1]`; zero returns the backdrop unchanged.
pub fn blend_over_backdrop(foreground: RgbColor, alpha: f64, backdrop: RgbColor) -> RgbColor {
    let alpha = clamp(alpha, 0.0, 1.0);
    let blend = |fg: u8, bg: u8| -> u8 {
        let value = fg as f64 * alpha + bg as f64 * (1.0 - alpha);
        clamp(value.round(), 0.0, 255.0) as u8
    };

    RgbColor::new(
        blend(foreground.r, backdrop.r),
        blend(foreground.g, backdrop.g),
        blend(foreground.b, backdrop.b),
    )
}

/// Saturating clamp that maps NaN to `lo`.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

// ============================================================================
// Tests
// ============================================================================
