//! Raster compositing of the squircle icon and its banner.
//!
//! A [`RasterCompositor`] is configured once with a [`FlowProfile`] and then
//! turns any decoded source image plus [`GenerationSettings`] into a fresh
//! icon/banner pair. Each call allocates its own surfaces; the compositor
//! itself holds no mutable state and can be shared across threads.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use squircle_renderer::{FlowProfile, GenerationSettings, RasterCompositor};
//!
//! let source = RgbaImage::from_pixel(64, 32, Rgba([200, 40, 40, 255]));
//! let compositor = RasterCompositor::new(FlowProfile::icon_set());
//!
//! let assets = compositor
//!     .generate(&source, &GenerationSettings::new("#2463e9", 22.0, 48.0))
//!     .unwrap();
//! assert_eq!(assets.icon.extension(), "png");
//! ```

use image::RgbaImage;

use crate::asset::{Asset, BannerAsset, IconAsset};
use crate::color::{RgbColor, clamp, normalize_hex};
use crate::error::{Result, SurfaceError};
use crate::geometry::{percent_to_pixels, squircle_path};
use crate::layer::{ComposedIcon, CoverImage, Fill, IconStamp, Layer, RenderContext, render_layers};
use crate::profile::{FlowProfile, GenerationSettings};
use crate::sampler;
use crate::surface::{DestRect, Surface};

/// Largest corner radius, as a percentage of the icon size.
pub const MAX_CORNER_RADIUS_PERCENT: f64 = 50.0;

/// Settings after validation and clamping against a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSettings {
    pub background: RgbColor,
    pub corner_radius_percent: f64,
    pub padding: f64,
}

/// The two surfaces of one call, before encoding.
#[derive(Debug, Clone)]
pub struct Composition {
    pub icon: Surface,
    pub banner: Surface,
}

impl Composition {
    /// Encodes both surfaces as PNG.
    pub fn encode(&self) -> Result<RasterAssets> {
        Ok(RasterAssets {
            icon: Asset::Png(self.icon.encode_png()?),
            banner: Asset::Png(self.banner.encode_png()?),
        })
    }
}

/// An encoded icon/banner pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterAssets {
    pub icon: IconAsset,
    pub banner: BannerAsset,
}

// ============================================================================
// RasterCompositor
// ============================================================================

/// Composites decoded images into icons and banners for one workflow.
#[derive(Debug, Clone, Default)]
pub struct RasterCompositor {
    profile: FlowProfile,
}

impl RasterCompositor {
    pub fn new(profile: FlowProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &FlowProfile {
        &self.profile
    }

    /// Validates raw settings.
    ///
    /// A malformed hex falls back to the profile's default background; the
    /// corner radius is clamped to `[0, 50]` percent and the padding to
    /// `[0, icon_size / 2]`.
    pub fn resolve(&self, settings: &GenerationSettings) -> ResolvedSettings {
        let background = match normalize_hex(&settings.background_hex) {
            Some(hex) => hex.to_rgb(),
            None => {
                log::debug!(
                    "falling back to {} for background {:?}",
                    self.profile.default_background,
                    settings.background_hex
                );
                self.profile.default_background.to_rgb()
            }
        };

        ResolvedSettings {
            background,
            corner_radius_percent: clamp(
                settings.corner_radius_percent,
                0.0,
                MAX_CORNER_RADIUS_PERCENT,
            ),
            padding: clamp(settings.padding, 0.0, self.profile.icon_size as f64 / 2.0),
        }
    }

    /// Paints the icon and banner surfaces for `source`.
    ///
    /// The source must have non-zero dimensions.
    pub fn compose(
        &self,
        source: &RgbaImage,
        settings: &GenerationSettings,
    ) -> Result<Composition, SurfaceError> {
        let resolved = self.resolve(settings);
        log::debug!("compositing {}x{} source with {resolved:?}", source.width(), source.height());

        let mut ctx = RenderContext::new(Surface::from_rgba_image(source)?, resolved.background);

        let size = self.profile.icon_size;
        let icon = render_layers(size, size, &self.icon_layers(&resolved), &ctx)?;
        ctx.set(ComposedIcon(icon.clone()));

        let banner = render_layers(
            self.profile.banner_width,
            self.profile.banner_height,
            &self.banner_layers(),
            &ctx,
        )?;

        Ok(Composition { icon, banner })
    }

    /// Composes and encodes the icon and banner for `source`.
    pub fn generate(&self, source: &RgbaImage, settings: &GenerationSettings) -> Result<RasterAssets> {
        let assets = self.compose(source, settings)?.encode()?;
        log::debug!(
            "encoded icon ({} bytes) and banner ({} bytes)",
            assets.icon.as_bytes().len(),
            assets.banner.as_bytes().len()
        );
        Ok(assets)
    }

    /// Suggests a background color for `source`, using the profile's
    /// fallback for fully transparent images.
    pub fn suggest_background(&self, source: &RgbaImage) -> RgbColor {
        sampler::suggest_background(source, self.profile.sample_fallback)
    }

    fn icon_layers(&self, resolved: &ResolvedSettings) -> Vec<Box<dyn Layer>> {
        let size = self.profile.icon_size as f64;
        let radius = percent_to_pixels(resolved.corner_radius_percent, size);
        let outline = squircle_path(0.0, 0.0, size, size, radius);

        let padding = resolved.padding;
        let inner = size - padding * 2.0;
        let artwork = DestRect::new(padding, padding + self.profile.icon_offset_y, inner, inner);

        vec![
            Box::new(Fill::Outline(outline.clone())),
            Box::new(CoverImage::new(artwork).with_clip(outline)),
        ]
    }

    fn banner_layers(&self) -> Vec<Box<dyn Layer>> {
        let profile = &self.profile;
        let mut layers: Vec<Box<dyn Layer>> = vec![Box::new(Fill::Background)];

        if let Some(backdrop) = &profile.backdrop {
            let full = DestRect::new(
                0.0,
                0.0,
                profile.banner_width as f64,
                profile.banner_height as f64,
            );
            layers.push(Box::new(
                CoverImage::new(full)
                    .with_opacity(backdrop.opacity)
                    .with_blur(backdrop.blur),
            ));
            layers.push(Box::new(Fill::Tint {
                alpha: backdrop.tint,
            }));
        }

        layers.push(Box::new(
            IconStamp::centered(
                profile.banner_width,
                profile.banner_height,
                profile.banner_icon_size,
                profile.banner_icon_offset_y,
            )
            .with_shadow(profile.shadow),
        ));
        layers
    }
}

// ============================================================================
// Tests
// ============================================================================
