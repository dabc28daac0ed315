//! Placement of the composed icon on the banner.

use image::imageops;

use super::{ComposedIcon, Layer, RenderContext};
use crate::color::clamp;
use crate::error::SurfaceError;
use crate::profile::ShadowSettings;
use crate::surface::{DestRect, Surface};

/// Draws the [`ComposedIcon`] of the call scaled into `dest`, optionally
/// casting a soft drop shadow first.
///
/// Does nothing if no icon has been published to the context.
#[derive(Debug, Clone)]
pub struct IconStamp {
    pub dest: DestRect,
    pub shadow: Option<ShadowSettings>,
}

impl IconStamp {
    /// Centers a `size x size` icon on a `width x height` surface, shifted
    /// vertically by `offset_y`.
    pub fn centered(width: u32, height: u32, size: u32, offset_y: f64) -> Self {
        let size = size as f64;
        Self {
            dest: DestRect::new(
                (width as f64 - size) / 2.0,
                (height as f64 - size) / 2.0 + offset_y,
                size,
                size,
            ),
            shadow: None,
        }
    }

    pub fn with_shadow(mut self, shadow: Option<ShadowSettings>) -> Self {
        self.shadow = shadow;
        self
    }
}

impl Layer for IconStamp {
    fn paint(&self, ctx: &RenderContext, surface: &mut Surface) -> Result<(), SurfaceError> {
        let Some(ComposedIcon(icon)) = ctx.get::<ComposedIcon>() else {
            log::warn!("banner painted before an icon was composed");
            return Ok(());
        };

        if let Some(shadow) = &self.shadow {
            paint_shadow(surface, icon, self.dest, shadow)?;
        }
        surface.draw_surface(icon, self.dest, 1.0);
        Ok(())
    }
}

/// Paints a blurred black silhouette of `icon` under where it will be drawn.
fn paint_shadow(
    surface: &mut Surface,
    icon: &Surface,
    dest: DestRect,
    shadow: &ShadowSettings,
) -> Result<(), SurfaceError> {
    let opacity = clamp(shadow.opacity, 0.0, 1.0);
    if opacity == 0.0 || dest.width <= 0.0 || dest.height <= 0.0 {
        return Ok(());
    }

    let sigma = (clamp(shadow.blur, 0.0, f64::MAX) / 2.0) as f32;
    let margin = (sigma * 3.0).ceil() as f64;
    let width = (dest.width + margin * 2.0).ceil() as u32;
    let height = (dest.height + margin * 2.0).ceil() as u32;

    let mut silhouette = Surface::new(width, height)?;
    silhouette.draw_surface(icon, DestRect::new(margin, margin, dest.width, dest.height), 1.0);

    let mut pixels = silhouette.to_rgba_image();
    for pixel in pixels.pixels_mut() {
        let alpha = (pixel.0[3] as f64 * opacity).round() as u8;
        pixel.0 = [0, 0, 0, alpha];
    }
    if sigma > 0.0 {
        pixels = imageops::blur(&pixels, sigma);
    }

    let shadow_surface = Surface::from_rgba_image(&pixels)?;
    surface.draw_surface(
        &shadow_surface,
        DestRect::new(
            dest.x - margin,
            dest.y - margin + shadow.offset_y,
            width as f64,
            height as f64,
        ),
        1.0,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RgbColor;

    fn context_with_icon() -> RenderContext {
        let mut icon = Surface::new(16, 16).unwrap();
        icon.fill(RgbColor::new(0, 0, 255));
        let mut ctx = RenderContext::new(Surface::new(1, 1).unwrap(), RgbColor::WHITE);
        ctx.set(ComposedIcon(icon));
        ctx
    }

    #[test]
    fn centered_geometry() {
        let stamp = IconStamp::centered(1500, 600, 256, 0.0);
        assert_eq!(stamp.dest, DestRect::new(622.0, 172.0, 256.0, 256.0));

        let raised = IconStamp::centered(3000, 1200, 300, -30.0);
        assert_eq!(raised.dest, DestRect::new(1350.0, 420.0, 300.0, 300.0));
    }

    #[test]
    fn stamps_icon_in_place() {
        let ctx = context_with_icon();
        let mut surface = Surface::new(40, 40).unwrap();
        IconStamp::centered(40, 40, 20, 0.0)
            .paint(&ctx, &mut surface)
            .unwrap();

        let img = surface.to_rgba_image();
        assert_eq!(img.get_pixel(20, 20).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(2, 2).0[3], 0);
    }

    #[test]
    fn shadow_darkens_below_the_icon() {
        let ctx = context_with_icon();
        let mut surface = Surface::new(100, 100).unwrap();
        surface.fill(RgbColor::WHITE);
        IconStamp::centered(100, 100, 40, 0.0)
            .with_shadow(Some(ShadowSettings {
                opacity: 0.5,
                blur: 4.0,
                offset_y: 10.0,
            }))
            .paint(&ctx, &mut surface)
            .unwrap();

        let img = surface.to_rgba_image();
        // Just below the icon's bottom edge (y = 70) the shadow shows through.
        let below = img.get_pixel(50, 74).0;
        assert!(below[0] < 255, "expected shadow, got {below:?}");
        // Far above the icon nothing changed.
        assert_eq!(img.get_pixel(50, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn missing_icon_is_skipped() {
        let ctx = RenderContext::new(Surface::new(1, 1).unwrap(), RgbColor::WHITE);
        let mut surface = Surface::new(8, 8).unwrap();
        IconStamp::centered(8, 8, 4, 0.0)
            .paint(&ctx, &mut surface)
            .unwrap();
        assert!(surface.to_rgba_image().pixels().all(|p| p.0[3] == 0));
    }
}
