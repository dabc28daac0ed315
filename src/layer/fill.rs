//! Flat background fills.

use super::{Layer, RenderContext};
use crate::error::SurfaceError;
use crate::geometry::SquirclePath;
use crate::surface::Surface;

/// Paints the call's background color.
#[derive(Debug, Clone)]
pub enum Fill {
    /// Covers the whole surface.
    Background,

    /// Covers only the inside of an outline, leaving the rest transparent.
    Outline(SquirclePath),

    /// Paints the background color over everything at the given opacity.
    Tint { alpha: f64 },
}

impl Layer for Fill {
    fn paint(&self, ctx: &RenderContext, surface: &mut Surface) -> Result<(), SurfaceError> {
        match self {
            Fill::Background => surface.fill(ctx.background),
            Fill::Outline(outline) => surface.fill_path(outline, ctx.background),
            Fill::Tint { alpha } => surface.fill_translucent(ctx.background, *alpha),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RgbColor;
    use crate::geometry::squircle_path;
    use image::{Rgba, RgbaImage};

    fn context(background: RgbColor) -> RenderContext {
        let source = Surface::from_rgba_image(&RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])))
            .unwrap();
        RenderContext::new(source, background)
    }

    #[test]
    fn outline_fill_leaves_corners_clear() {
        let ctx = context(RgbColor::new(36, 99, 233));
        let mut surface = Surface::new(64, 64).unwrap();
        Fill::Outline(squircle_path(0.0, 0.0, 64.0, 64.0, 32.0))
            .paint(&ctx, &mut surface)
            .unwrap();

        let img = surface.to_rgba_image();
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        assert_eq!(img.get_pixel(32, 32).0, [36, 99, 233, 255]);
    }

    #[test]
    fn tint_mutes_existing_content() {
        let ctx = context(RgbColor::WHITE);
        let mut surface = Surface::new(2, 2).unwrap();
        surface.fill(RgbColor::BLACK);
        Fill::Tint { alpha: 0.6 }.paint(&ctx, &mut surface).unwrap();

        let [r, _, _, a] = surface.to_rgba_image().get_pixel(0, 0).0;
        assert_eq!(a, 255);
        assert!((151..=155).contains(&r), "got {r}");
    }
}
