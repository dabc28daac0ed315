//! Geometry helpers: cover-fit cropping and squircle outlines.

use resvg::tiny_skia::{Path, PathBuilder};

use crate::color::clamp;

/// Control-point ratio for squircle corners.
///
/// Approximates the continuous-curvature corners of modern icon masks rather
/// than a circular arc. Changing it changes every rendered corner.
pub const SQUIRCLE_CONTROL_RATIO: f64 = 0.8;

// ============================================================================
// Cover Fit
// ============================================================================

/// A source-space rectangle selected by [`cover_fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverRect {
    pub sx: f64,
    pub sy: f64,
    pub s_width: f64,
    pub s_height: f64,
}

impl CoverRect {
    /// A rectangle selecting the whole of a `width x height` source.
    pub fn full(width: f64, height: f64) -> Self {
        Self {
            sx: 0.0,
            sy: 0.0,
            s_width: width,
            s_height: height,
        }
    }
}

/// Selects the part of a source that fills a target with `object-fit: cover`
/// semantics.
///
/// The result has the target's aspect ratio and is centered on the source,
/// cropping symmetrically along the relatively longer axis.
///
/// All four dimensions must be greater than zero.
pub fn cover_fit(source_w: f64, source_h: f64, target_w: f64, target_h: f64) -> CoverRect {
    let target_ratio = target_w / target_h;
    let source_ratio = source_w / source_h;

    if source_ratio > target_ratio {
        let s_height = source_h;
        let s_width = target_ratio * s_height;
        CoverRect {
            sx: (source_w - s_width) / 2.0,
            sy: 0.0,
            s_width,
            s_height,
        }
    } else {
        let s_width = source_w;
        let s_height = s_width / target_ratio;
        CoverRect {
            sx: 0.0,
            sy: (source_h - s_height) / 2.0,
            s_width,
            s_height,
        }
    }
}

/// Converts a percentage (clamped to `[0, 100]`) of `dimension` into pixels.
pub fn percent_to_pixels(percent: f64, dimension: f64) -> f64 {
    clamp(percent, 0.0, 100.0) / 100.0 * dimension
}

// ============================================================================
// Squircle Path
// ============================================================================

/// One segment of a [`SquirclePath`], in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CubicTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    Close,
}

/// A closed rounded-rectangle outline.
#[derive(Debug, Clone, PartialEq)]
pub struct SquirclePath {
    segments: Vec<PathSegment>,
}

impl SquirclePath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Formats the path as SVG path data (`d` attribute).
    ///
    /// Axis-aligned lines are written as `H`/`V` commands.
    pub fn to_svg_data(&self) -> String {
        let mut parts = Vec::with_capacity(self.segments.len());
        let (mut cx, mut cy) = (0.0, 0.0);

        for segment in &self.segments {
            let part = match *segment {
                PathSegment::MoveTo { x, y } => {
                    (cx, cy) = (x, y);
                    format!("M{},{}", format_number(x), format_number(y))
                }
                PathSegment::LineTo { x, y } => {
                    let part = if y == cy {
                        format!("H{}", format_number(x))
                    } else if x == cx {
                        format!("V{}", format_number(y))
                    } else {
                        format!("L{},{}", format_number(x), format_number(y))
                    };
                    (cx, cy) = (x, y);
                    part
                }
                PathSegment::CubicTo { x1, y1, x2, y2, x, y } => {
                    (cx, cy) = (x, y);
                    format!(
                        "C{},{} {},{} {},{}",
                        format_number(x1),
                        format_number(y1),
                        format_number(x2),
                        format_number(y2),
                        format_number(x),
                        format_number(y)
                    )
                }
                PathSegment::Close => "Z".to_string(),
            };
            parts.push(part);
        }

        parts.join(" ")
    }

    /// Builds a rasterizable path. Returns `None` for degenerate outlines.
    pub fn to_skia_path(&self) -> Option<Path> {
        let mut builder = PathBuilder::new();
        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo { x, y } => builder.move_to(x as f32, y as f32),
                PathSegment::LineTo { x, y } => builder.line_to(x as f32, y as f32),
                PathSegment::CubicTo { x1, y1, x2, y2, x, y } => builder.cubic_to(
                    x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
                ),
                PathSegment::Close => builder.close(),
            }
        }
        builder.finish()
    }
}

/// Generates a squircle outline for the given rectangle.
///
/// The radius saturates at half the shorter side. A radius of zero or less
/// yields a plain rectangle. The outline starts at the end of the top-left
/// corner and runs clockwise.
pub fn squircle_path(x: f64, y: f64, width: f64, height: f64, radius: f64) -> SquirclePath {
    let r = clamp(radius, 0.0, f64::INFINITY)
        .min(width / 2.0)
        .min(height / 2.0);
    let right = x + width;
    let bottom = y + height;

    if r <= 0.0 {
        return SquirclePath {
            segments: vec![
                PathSegment::MoveTo { x, y },
                PathSegment::LineTo { x: right, y },
                PathSegment::LineTo { x: right, y: bottom },
                PathSegment::LineTo { x, y: bottom },
                PathSegment::Close,
            ],
        };
    }

    let cp = r * SQUIRCLE_CONTROL_RATIO;

    SquirclePath {
        segments: vec![
            PathSegment::MoveTo { x: x + r, y },
            PathSegment::LineTo { x: right - r, y },
            PathSegment::CubicTo {
                x1: right - r + cp,
                y1: y,
                x2: right,
                y2: y + r - cp,
                x: right,
                y: y + r,
            },
            PathSegment::LineTo { x: right, y: bottom - r },
            PathSegment::CubicTo {
                x1: right,
                y1: bottom - r + cp,
                x2: right - r + cp,
                y2: bottom,
                x: right - r,
                y: bottom,
            },
            PathSegment::LineTo { x: x + r, y: bottom },
            PathSegment::CubicTo {
                x1: x + r - cp,
                y1: bottom,
                x2: x,
                y2: bottom - r + cp,
                x,
                y: bottom - r,
            },
            PathSegment::LineTo { x, y: y + r },
            PathSegment::CubicTo {
                x1: x,
                y1: y + r - cp,
                x2: x + r - cp,
                y2: y,
                x: x + r,
                y,
            },
            PathSegment::Close,
        ],
    }
}

/// Formats a number the way markup attributes expect: rounded to six
/// decimals, with integers written without a fractional part.
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        "0".to_string()
    } else if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        (rounded as i64).to_string()
    } else {
        rounded.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_cover_invariants(sw: f64, sh: f64, tw: f64, th: f64) {
        let rect = cover_fit(sw, sh, tw, th);
        assert!(
            (rect.s_width / rect.s_height - tw / th).abs() < 1e-6,
            "aspect mismatch for {sw}x{sh} -> {tw}x{th}: {rect:?}"
        );
        assert!(rect.sx >= -EPSILON && rect.sx <= sw - rect.s_width + EPSILON);
        assert!(rect.sy >= -EPSILON && rect.sy <= sh - rect.s_height + EPSILON);
    }

    #[test]
    fn cover_fit_wide_source_square_target() {
        let rect = cover_fit(2000.0, 1000.0, 500.0, 500.0);
        assert_eq!(
            rect,
            CoverRect {
                sx: 750.0,
                sy: 0.0,
                s_width: 500.0,
                s_height: 1000.0,
            }
        );
    }

    #[test]
    fn cover_fit_tall_source_wide_target() {
        let rect = cover_fit(600.0, 900.0, 1500.0, 600.0);
        assert_eq!(rect.sx, 0.0);
        assert_eq!(rect.s_width, 600.0);
        assert!((rect.s_height - 240.0).abs() < EPSILON);
        assert!((rect.sy - 330.0).abs() < EPSILON);
    }

    #[test]
    fn cover_fit_matching_ratio_selects_everything() {
        let rect = cover_fit(300.0, 120.0, 1500.0, 600.0);
        assert_eq!(rect.sx, 0.0);
        assert_eq!(rect.s_width, 300.0);
        assert!((rect.s_height - 120.0).abs() < EPSILON);
        assert!(rect.sy.abs() < EPSILON);
    }

    #[test]
    fn cover_fit_invariants_hold() {
        let sizes = [1.0, 7.0, 64.0, 333.0, 1024.0, 4000.0];
        for &sw in &sizes {
            for &sh in &sizes {
                for &(tw, th) in &[(512.0, 512.0), (1500.0, 600.0), (3000.0, 1200.0), (3.0, 7.0)] {
                    assert_cover_invariants(sw, sh, tw, th);
                }
            }
        }
    }

    #[test]
    fn percent_to_pixels_clamps() {
        assert_eq!(percent_to_pixels(50.0, 512.0), 256.0);
        assert_eq!(percent_to_pixels(-10.0, 512.0), 0.0);
        assert_eq!(percent_to_pixels(250.0, 512.0), 512.0);
    }

    #[test]
    fn zero_radius_is_rectangle() {
        let path = squircle_path(2.0, 3.0, 10.0, 20.0, 0.0);
        assert_eq!(
            path.segments(),
            &[
                PathSegment::MoveTo { x: 2.0, y: 3.0 },
                PathSegment::LineTo { x: 12.0, y: 3.0 },
                PathSegment::LineTo { x: 12.0, y: 23.0 },
                PathSegment::LineTo { x: 2.0, y: 23.0 },
                PathSegment::Close,
            ]
        );
        assert_eq!(path.to_svg_data(), "M2,3 H12 V23 H2 Z");
    }

    #[test]
    fn negative_radius_is_rectangle() {
        let path = squircle_path(0.0, 0.0, 4.0, 4.0, -5.0);
        assert_eq!(path, squircle_path(0.0, 0.0, 4.0, 4.0, 0.0));
        assert_eq!(path, squircle_path(0.0, 0.0, 4.0, 4.0, f64::NAN));
    }

    #[test]
    fn radius_saturates_at_half_short_side() {
        let huge = squircle_path(0.0, 0.0, 100.0, 40.0, 500.0);
        let exact = squircle_path(0.0, 0.0, 100.0, 40.0, 20.0);
        assert_eq!(huge, exact);

        // Left and right corners meet at the vertical midpoint.
        assert_eq!(huge.segments()[3], PathSegment::LineTo { x: 100.0, y: 20.0 });
        assert_eq!(huge.segments()[0], PathSegment::MoveTo { x: 20.0, y: 0.0 });
    }

    #[test]
    fn squircle_corners_use_control_ratio() {
        let path = squircle_path(0.0, 0.0, 100.0, 100.0, 10.0);
        assert_eq!(path.segments().len(), 10);
        assert_eq!(
            path.segments()[2],
            PathSegment::CubicTo {
                x1: 98.0,
                y1: 0.0,
                x2: 100.0,
                y2: 2.0,
                x: 100.0,
                y: 10.0,
            }
        );
        assert_eq!(path.segments().last(), Some(&PathSegment::Close));
    }

    #[test]
    fn squircle_svg_data() {
        let path = squircle_path(-4.0, -4.0, 32.0, 32.0, 6.0);
        assert_eq!(
            path.to_svg_data(),
            "M2,-4 H22 C26.8,-4 28,-2.8 28,2 V22 C28,26.8 26.8,28 22,28 \
             H2 C-2.8,28 -4,26.8 -4,22 V2 C-4,-2.8 -2.8,-4 2,-4 Z"
        );
    }

    #[test]
    fn squircle_builds_skia_path() {
        let path = squircle_path(0.0, 0.0, 512.0, 512.0, 204.8).to_skia_path().unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.width(), 512.0);
        assert_eq!(bounds.height(), 512.0);
    }

    #[test]
    fn format_number_like_markup() {
        assert_eq!(format_number(32.0), "32");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-4.0 + 6.0 - 4.8), "-2.8");
        assert_eq!(format_number(-1e-9), "0");
    }
}
