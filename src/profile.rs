//! Serializable generation settings and per-flow geometry profiles.
//!
//! Settings are the user-tunable inputs of one compositing call. Profiles are
//! the fixed constants of a workflow (export sizes, banner tuning, fallback
//! colors); each flow owns its own profile so tuning one never changes another.
//!
//! # Example
//!
//! ```
//! use squircle_renderer::{FlowProfile, GenerationSettings};
//!
//! let settings = GenerationSettings::new("#2463e9", 40.0, 24.0);
//! let json = settings.to_json().unwrap();
//! let restored = GenerationSettings::from_json(&json).unwrap();
//! assert_eq!(restored, settings);
//!
//! let profile = FlowProfile::image_upload();
//! assert_eq!(profile.icon_size, 512);
//! ```

use serde::{Deserialize, Serialize};

use crate::color::{HexColor, RgbColor};

// ============================================================================
// Generation Settings
// ============================================================================

/// Raw settings for a raster generation call.
///
/// Values are kept exactly as the caller supplied them and re-validated on
/// every call; see [`RasterCompositor::resolve`](crate::RasterCompositor::resolve).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct GenerationSettings {
    /// Background color as typed by the user; may be malformed.
    pub background_hex: String,

    /// Corner radius as a percentage of the icon size (0-50).
    pub corner_radius_percent: f64,

    /// Inset of the artwork from each icon edge, in pixels.
    pub padding: f64,
}

impl GenerationSettings {
    pub fn new(background_hex: impl Into<String>, corner_radius_percent: f64, padding: f64) -> Self {
        Self {
            background_hex: background_hex.into(),
            corner_radius_percent,
            padding,
        }
    }

    /// Returns true if applying `other` instead would render differently.
    pub fn differs_from(&self, other: &Self) -> bool {
        self.background_hex.trim() != other.background_hex.trim()
            || (self.corner_radius_percent - other.corner_radius_percent).abs() > 0.0001
            || (self.padding - other.padding).abs() > 0.0001
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Settings for the vector markup flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct VectorSettings {
    /// Fill of the injected background shape.
    pub background: HexColor,

    /// Color inherited by `currentColor` content.
    pub foreground: HexColor,

    /// Corner radius in document units.
    pub corner_radius: f64,

    /// Padding added around the view box, in document units.
    pub padding: f64,
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            background: RgbColor::WHITE.to_hex(),
            foreground: RgbColor::BLACK.to_hex(),
            corner_radius: 12.0,
            padding: 4.0,
        }
    }
}

impl VectorSettings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Settings for a rounded divider line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct LineSettings {
    /// Length of the line in pixels. Non-positive values use the default.
    pub width: f64,

    /// Thickness of the line in pixels. Non-positive values use the default.
    pub height: f64,

    /// Corner radius, capped at half the thickness.
    pub radius: f64,

    pub color: HexColor,
}

impl LineSettings {
    pub const DEFAULT_WIDTH: f64 = 1600.0;
    pub const DEFAULT_HEIGHT: f64 = 4.0;
    pub const DEFAULT_RADIUS: f64 = 4.0;

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            radius: Self::DEFAULT_RADIUS,
            color: RgbColor::new(0x24, 0x63, 0xe9).to_hex(),
        }
    }
}

// ============================================================================
// Raster Flow Profile
// ============================================================================

/// Muted copy of the source drawn behind the banner icon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct BackdropSettings {
    /// Opacity of the cover-fitted source (0-1).
    pub opacity: f64,

    /// Opacity of the flat background color painted over it (0-1).
    pub tint: f64,

    /// Gaussian blur sigma applied to the source; `None` leaves it sharp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
}

/// Drop shadow cast by the banner icon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ShadowSettings {
    /// Opacity of the black shadow (0-1).
    pub opacity: f64,

    /// Blur radius in pixels; the gaussian sigma is half of this.
    pub blur: f64,

    /// Vertical offset in pixels.
    pub offset_y: f64,
}

/// Fixed geometry and tuning for one raster workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct FlowProfile {
    /// Edge length of the square icon.
    pub icon_size: u32,

    pub banner_width: u32,
    pub banner_height: u32,

    /// Edge length the icon is scaled to on the banner.
    pub banner_icon_size: u32,

    /// Vertical shift of the artwork inside the icon.
    #[serde(default)]
    pub icon_offset_y: f64,

    /// Vertical shift of the icon from the banner center.
    #[serde(default)]
    pub banner_icon_offset_y: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<BackdropSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowSettings>,

    /// Background used when the requested hex is malformed.
    pub default_background: HexColor,

    /// Corner radius a new session starts with.
    #[serde(default = "default_corner_radius_percent")]
    pub default_corner_radius_percent: f64,

    /// Padding a new session starts with.
    #[serde(default)]
    pub default_padding: f64,

    /// Color reported by the sampler for fully transparent sources.
    pub sample_fallback: RgbColor,
}

impl FlowProfile {
    /// Uploaded photos and artwork: a muted backdrop and a shadowed icon.
    pub fn image_upload() -> Self {
        Self {
            icon_size: 512,
            banner_width: 1500,
            banner_height: 600,
            banner_icon_size: 256,
            icon_offset_y: 0.0,
            banner_icon_offset_y: 0.0,
            backdrop: Some(BackdropSettings {
                opacity: 0.28,
                tint: 0.6,
                blur: None,
            }),
            shadow: Some(ShadowSettings {
                opacity: 0.18,
                blur: 24.0,
                offset_y: 12.0,
            }),
            default_background: RgbColor::new(240, 240, 240).to_hex(),
            default_corner_radius_percent: 40.0,
            default_padding: 24.0,
            sample_fallback: RgbColor::new(240, 240, 240),
        }
    }

    /// Glyphs picked from a fixed icon set: a flat, wide cover.
    pub fn icon_set() -> Self {
        Self {
            icon_size: 512,
            banner_width: 3000,
            banner_height: 1200,
            banner_icon_size: 300,
            icon_offset_y: -10.0,
            banner_icon_offset_y: -30.0,
            backdrop: None,
            shadow: None,
            default_background: RgbColor::WHITE.to_hex(),
            default_corner_radius_percent: 40.0,
            default_padding: 0.0,
            sample_fallback: RgbColor::WHITE,
        }
    }

    /// The settings a new session starts with.
    pub fn default_settings(&self) -> GenerationSettings {
        GenerationSettings::new(
            self.default_background.as_str(),
            self.default_corner_radius_percent,
            self.default_padding,
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn default_corner_radius_percent() -> f64 {
    40.0
}

impl Default for FlowProfile {
    fn default() -> Self {
        Self::image_upload()
    }
}

// ============================================================================
// Vector Flow Profile
// ============================================================================

/// Fixed geometry for the vector markup workflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct VectorProfile {
    pub banner_width: u32,
    pub banner_height: u32,

    /// Edge length of the icon embedded in the banner document.
    pub banner_icon_size: u32,

    /// Edge length of the PNG export of the icon document.
    pub icon_png_size: u32,
}

impl Default for VectorProfile {
    fn default() -> Self {
        Self {
            banner_width: 1500,
            banner_height: 600,
            banner_icon_size: 128,
            icon_png_size: 512,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
