//! Drawing surfaces backed by tiny-skia pixmaps.
//!
//! A [`Surface`] is allocated per compositing call and dropped when the call
//! returns; nothing here is shared between calls.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, Mask, Paint, Pattern, Pixmap, Rect, SpreadMode,
    Transform,
};

use crate::color::{RgbColor, clamp};
use crate::error::SurfaceError;
use crate::geometry::{CoverRect, SquirclePath};

/// A destination rectangle on a surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DestRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    fn to_skia(self) -> Option<Rect> {
        Rect::from_xywh(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

/// An RGBA drawing surface with premultiplied storage.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocates a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(SurfaceError::Unavailable { width, height })?;
        Ok(Self { pixmap })
    }

    /// Copies a straight-alpha image onto a new surface.
    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self, SurfaceError> {
        let mut surface = Self::new(image.width(), image.height())?;
        for (dst, src) in surface.pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(surface)
    }

    /// Wraps a pixmap that was painted elsewhere.
    pub(crate) fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Replaces every pixel with an opaque color.
    pub fn fill(&mut self, color: RgbColor) {
        self.pixmap.fill(skia_color(color, 1.0));
    }

    /// Paints a color at the given opacity over the whole surface.
    pub fn fill_translucent(&mut self, color: RgbColor, alpha: f64) {
        let Some(rect) = DestRect::new(0.0, 0.0, self.width() as f64, self.height() as f64).to_skia()
        else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(skia_color(color, alpha));
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Fills the inside of an outline with an opaque color.
    pub fn fill_path(&mut self, outline: &SquirclePath, color: RgbColor) {
        let Some(path) = outline.to_skia_path() else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(skia_color(color, 1.0));
        paint.anti_alias = true;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    /// Builds a clip mask covering the inside of an outline.
    pub fn clip_mask(&self, outline: &SquirclePath) -> Result<Mask, SurfaceError> {
        let (width, height) = (self.width(), self.height());
        let mut mask = Mask::new(width, height).ok_or(SurfaceError::Unavailable { width, height })?;
        if let Some(path) = outline.to_skia_path() {
            mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
        }
        Ok(mask)
    }

    /// Draws `source_rect` of `source` scaled into `dest`.
    ///
    /// Nothing outside `dest` (or outside `mask`, when given) is touched.
    /// Empty destinations are skipped.
    pub fn draw_image(
        &mut self,
        source: &Surface,
        source_rect: CoverRect,
        dest: DestRect,
        opacity: f64,
        mask: Option<&Mask>,
    ) {
        if source_rect.s_width <= 0.0 || source_rect.s_height <= 0.0 {
            return;
        }
        let Some(rect) = dest.to_skia() else {
            return;
        };

        let scale_x = dest.width / source_rect.s_width;
        let scale_y = dest.height / source_rect.s_height;
        let transform = Transform::from_row(
            scale_x as f32,
            0.0,
            0.0,
            scale_y as f32,
            (dest.x - source_rect.sx * scale_x) as f32,
            (dest.y - source_rect.sy * scale_y) as f32,
        );

        let paint = Paint {
            shader: Pattern::new(
                source.pixmap.as_ref(),
                SpreadMode::Pad,
                FilterQuality::Bicubic,
                clamp(opacity, 0.0, 1.0) as f32,
                transform,
            ),
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), mask);
    }

    /// Draws the whole of `source` scaled into `dest`.
    pub fn draw_surface(&mut self, source: &Surface, dest: DestRect, opacity: f64) {
        let full = CoverRect::full(source.width() as f64, source.height() as f64);
        self.draw_image(source, full, dest, opacity, None);
    }

    /// Converts to a straight-alpha image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width(), self.height());
        for (dst, src) in img.pixels_mut().zip(self.pixmap.pixels()) {
            let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
            *dst = Rgba([r, g, b, a]);
        }
        img
    }

    /// Encodes the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, SurfaceError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(self.to_rgba_image())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Converts an 8-bit color and opacity into a tiny-skia color.
fn skia_color(color: RgbColor, alpha: f64) -> Color {
    let alpha = (clamp(alpha, 0.0, 1.0) * 255.0).round() as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

/// Unpremultiplies a premultiplied alpha pixel.
fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
