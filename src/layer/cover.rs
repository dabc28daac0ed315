//! Cover-fitted drawing of the source artwork.

use image::imageops;

use super::{Layer, RenderContext};
use crate::error::SurfaceError;
use crate::geometry::{SquirclePath, cover_fit};
use crate::surface::{DestRect, Surface};

/// Draws the source cropped to fill `dest` without distortion.
#[derive(Debug, Clone)]
pub struct CoverImage {
    /// Where the artwork lands.
    pub dest: DestRect,

    /// Opacity of the artwork (0-1).
    pub opacity: f64,

    /// Restricts drawing to the inside of this outline.
    pub clip: Option<SquirclePath>,

    /// Gaussian blur sigma applied to the source before drawing.
    pub blur: Option<f32>,
}

impl CoverImage {
    pub fn new(dest: DestRect) -> Self {
        Self {
            dest,
            opacity: 1.0,
            clip: None,
            blur: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_clip(mut self, clip: SquirclePath) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn with_blur(mut self, blur: Option<f32>) -> Self {
        self.blur = blur;
        self
    }
}

impl Layer for CoverImage {
    fn paint(&self, ctx: &RenderContext, surface: &mut Surface) -> Result<(), SurfaceError> {
        if self.dest.width <= 0.0 || self.dest.height <= 0.0 {
            return Ok(());
        }

        let source = &ctx.source;
        let rect = cover_fit(
            source.width() as f64,
            source.height() as f64,
            self.dest.width,
            self.dest.height,
        );
        let mask = self
            .clip
            .as_ref()
            .map(|outline| surface.clip_mask(outline))
            .transpose()?;

        match self.blur.filter(|sigma| *sigma > 0.0) {
            Some(sigma) => {
                let blurred = Surface::from_rgba_image(&imageops::blur(&source.to_rgba_image(), sigma))?;
                surface.draw_image(&blurred, rect, self.dest, self.opacity, mask.as_ref());
            }
            None => surface.draw_image(source, rect, self.dest, self.opacity, mask.as_ref()),
        }
        Ok(())
    }
}
