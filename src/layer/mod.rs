//! Paint passes used to composite icons and banners.
//!
//! A compositing call is an ordered list of [`Layer`]s painted onto a fresh
//! [`Surface`]. Layers read their inputs from a [`RenderContext`] shared by
//! every pass of the call.
//!
//! # Architecture
//!
//! The context carries the decoded source and the resolved background color,
//! plus a typed property bag. The icon pass publishes its result as a
//! [`ComposedIcon`] property so the banner's [`IconStamp`] can place it
//! without the two passes knowing about each other.

pub mod cover;
pub mod fill;
pub mod stamp;

pub use cover::CoverImage;
pub use fill::Fill;
pub use stamp::IconStamp;

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::color::RgbColor;
use crate::error::SurfaceError;
use crate::surface::Surface;

// ============================================================================
// Render Context
// ============================================================================

/// Inputs shared by every layer of one compositing call.
///
/// # Example
///
/// ```ignore
/// // The icon pass publishes its surface
/// ctx.set(ComposedIcon(icon));
///
/// // A banner layer reads it back
/// if let Some(ComposedIcon(icon)) = ctx.get::<ComposedIcon>() {
///     // Draw the icon...
/// }
/// ```
pub struct RenderContext {
    /// The source artwork, premultiplied once for all passes.
    pub source: Surface,

    /// The resolved background color of this call.
    pub background: RgbColor,

    /// Typed property bag for inter-pass communication.
    properties: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RenderContext {
    pub fn new(source: Surface, background: RgbColor) -> Self {
        Self {
            source,
            background,
            properties: HashMap::new(),
        }
    }

    /// Sets a typed property that later passes can read.
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.properties.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Gets a typed property set by an earlier pass.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.properties
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref())
    }
}

// ============================================================================
// Common Properties
// ============================================================================

/// The finished square icon of the current call.
///
/// Emitted after the icon pass; consumed by [`IconStamp`].
#[derive(Debug, Clone)]
pub struct ComposedIcon(pub Surface);

// ============================================================================
// Layer Trait
// ============================================================================

/// One paint step of a compositing call.
pub trait Layer {
    /// Paints onto `surface`, reading inputs from `ctx`.
    fn paint(&self, ctx: &RenderContext, surface: &mut Surface) -> Result<(), SurfaceError>;
}

/// Allocates a `width x height` surface and paints `layers` onto it in order.
pub fn render_layers(
    width: u32,
    height: u32,
    layers: &[Box<dyn Layer>],
    ctx: &RenderContext,
) -> Result<Surface, SurfaceError> {
    let mut surface = Surface::new(width, height)?;
    for layer in layers {
        layer.paint(ctx, &mut surface)?;
    }
    Ok(surface)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn context() -> RenderContext {
        let source = Surface::from_rgba_image(&RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255])))
            .unwrap();
        RenderContext::new(source, RgbColor::new(255, 0, 0))
    }

    #[test]
    fn properties_round_trip() {
        let mut ctx = context();
        assert!(ctx.get::<ComposedIcon>().is_none());

        ctx.set(ComposedIcon(Surface::new(2, 2).unwrap()));
        assert_eq!(ctx.get::<ComposedIcon>().unwrap().0.width(), 2);
    }

    #[test]
    fn layers_paint_in_order() {
        let ctx = context();
        let layers: Vec<Box<dyn Layer>> = vec![
            Box::new(Fill::Background),
            Box::new(Fill::Tint { alpha: 1.0 }),
        ];
        let surface = render_layers(3, 3, &layers, &ctx).unwrap();
        assert_eq!(surface.to_rgba_image().get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn render_layers_fails_without_surface() {
        let ctx = context();
        let err = render_layers(0, 0, &[], &ctx).unwrap_err();
        assert!(matches!(err, SurfaceError::Unavailable { .. }));
    }
}
