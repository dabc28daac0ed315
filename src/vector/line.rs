//! Rounded divider lines: a single filled `<rect>` sized to the line itself.

use crate::asset::Asset;
use crate::color::clamp;
use crate::error::Result;
use crate::geometry::format_number;
use crate::profile::LineSettings;

use super::{SVG_NAMESPACE, render_markup};

/// Line dimensions after defaults and radius capping are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineGeometry {
    width: f64,
    height: f64,
    radius: f64,
}

impl LineGeometry {
    fn of(settings: &LineSettings) -> Self {
        let width = positive_or(settings.width, LineSettings::DEFAULT_WIDTH);
        let height = positive_or(settings.height, LineSettings::DEFAULT_HEIGHT);
        let radius = clamp(settings.radius, 0.0, f64::INFINITY)
            .min(width / 2.0)
            .min(height / 2.0);

        Self {
            width,
            height,
            radius,
        }
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Builds the standalone document for a rounded line.
pub fn generate_line_markup(settings: &LineSettings) -> String {
    let LineGeometry {
        width,
        height,
        radius,
    } = LineGeometry::of(settings);
    let (w, h, r) = (format_number(width), format_number(height), format_number(radius));

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg xmlns=\"{ns}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            "  <rect width=\"{w}\" height=\"{h}\" rx=\"{r}\" ry=\"{r}\" fill=\"{fill}\" />\n",
            "</svg>"
        ),
        ns = SVG_NAMESPACE,
        w = w,
        h = h,
        r = r,
        fill = settings.color,
    )
}

/// Renders the line to PNG at its own size, rounded to whole pixels.
pub fn rasterize_line(settings: &LineSettings) -> Result<Asset> {
    let geometry = LineGeometry::of(settings);
    let width = geometry.width.round().max(1.0) as u32;
    let height = geometry.height.round().max(1.0) as u32;

    let surface = render_markup(&generate_line_markup(settings), width, height)?;
    Ok(Asset::Png(surface.encode_png()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(width: f64, height: f64, radius: f64) -> LineSettings {
        LineSettings {
            width,
            height,
            radius,
            ..LineSettings::default()
        }
    }

    #[test]
    fn default_line_markup() {
        assert_eq!(
            generate_line_markup(&LineSettings::default()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1600\" height=\"4\" viewBox=\"0 0 1600 4\">\n  \
             <rect width=\"1600\" height=\"4\" rx=\"2\" ry=\"2\" fill=\"#2463e9\" />\n\
             </svg>"
        );
    }

    #[test]
    fn radius_is_capped_by_half_extents() {
        assert_eq!(LineGeometry::of(&line(100.0, 10.0, 40.0)).radius, 5.0);
        assert_eq!(LineGeometry::of(&line(6.0, 10.0, 40.0)).radius, 3.0);
        assert_eq!(LineGeometry::of(&line(100.0, 10.0, 2.5)).radius, 2.5);
        assert_eq!(LineGeometry::of(&line(100.0, 10.0, -3.0)).radius, 0.0);
        assert_eq!(LineGeometry::of(&line(100.0, 10.0, f64::NAN)).radius, 0.0);
    }

    #[test]
    fn invalid_sizes_fall_back_to_defaults() {
        for bad in [0.0, -12.0, f64::NAN, f64::INFINITY] {
            let geometry = LineGeometry::of(&line(bad, bad, 1.0));
            assert_eq!(geometry.width, LineSettings::DEFAULT_WIDTH);
            assert_eq!(geometry.height, LineSettings::DEFAULT_HEIGHT);
        }
    }

    #[test]
    fn rasterizes_at_line_size() {
        let settings = LineSettings {
            color: "#ff0000".parse().unwrap(),
            ..line(40.0, 6.0, 0.0)
        };
        let Asset::Png(bytes) = rasterize_line(&settings).unwrap() else {
            panic!("expected png");
        };
        let image = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (40, 6));
        assert_eq!(image.get_pixel(20, 3).0, [255, 0, 0, 255]);
    }
}
