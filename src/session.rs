//! Stateful generation for one source image.

use image::RgbaImage;

use crate::color::RgbColor;
use crate::compositor::{RasterAssets, RasterCompositor};
use crate::error::Result;
use crate::profile::GenerationSettings;

// ============================================================================
// GenerationSession
// ============================================================================

/// Holds a decoded source and the current settings, re-rendering only when
/// something that affects the output changed.
///
/// # Example
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use squircle_renderer::{FlowProfile, GenerationSession, GenerationSettings, RasterCompositor};
///
/// let source = RgbaImage::from_pixel(32, 32, Rgba([20, 120, 220, 255]));
/// let mut session = GenerationSession::new(source, RasterCompositor::new(FlowProfile::icon_set()));
///
/// let first = session.render().unwrap().clone();
///
/// // Whitespace around the hex does not change the output
/// assert!(!session.apply_settings(GenerationSettings::new(" #ffffff ", 40.0, 0.0)));
/// assert_eq!(session.render().unwrap(), &first);
/// ```
pub struct GenerationSession {
    compositor: RasterCompositor,
    source: RgbaImage,
    settings: GenerationSettings,

    /// Incremented on every change to the source or settings.
    version: u64,

    /// The last render and the version it was produced at.
    cache: Option<(u64, RasterAssets)>,
}

impl GenerationSession {
    /// Starts a session with the profile's default settings.
    pub fn new(source: RgbaImage, compositor: RasterCompositor) -> Self {
        let settings = compositor.profile().default_settings();
        Self {
            compositor,
            source,
            settings,
            version: 0,
            cache: None,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the settings.
    ///
    /// Returns `true` if the output will change, in which case the cached
    /// render is dropped.
    pub fn apply_settings(&mut self, settings: GenerationSettings) -> bool {
        if !settings.differs_from(&self.settings) {
            return false;
        }
        self.settings = settings;
        self.invalidate();
        true
    }

    /// Swaps in a new source and restores the profile's default settings.
    pub fn replace_source(&mut self, source: RgbaImage) {
        self.source = source;
        self.settings = self.compositor.profile().default_settings();
        self.invalidate();
    }

    /// The suggested background for the current source.
    pub fn suggested_background(&self) -> RgbColor {
        self.compositor.suggest_background(&self.source)
    }

    /// Returns the icon and banner for the current state, rendering only if
    /// the cached pair is out of date.
    ///
    /// A failed render leaves no cached output behind.
    pub fn render(&mut self) -> Result<&RasterAssets> {
        let assets = match self.cache.take() {
            Some((at, assets)) if at == self.version => assets,
            _ => self.compositor.generate(&self.source, &self.settings)?,
        };
        Ok(&self.cache.insert((self.version, assets)).1)
    }

    /// Drops the cached render. Useful for freeing memory.
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    fn invalidate(&mut self) {
        self.cache = None;
        self.version = self.version.wrapping_add(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
