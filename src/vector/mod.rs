//! Vector compositing: squircle backgrounds injected into SVG markup.
//!
//! The vector flow never rasterizes while composing. The icon is the caller's
//! own document with its view box padded and a background path inserted
//! behind the original content; the banner is a small fixed document that
//! embeds the icon as a data URI. Rounded divider lines are generated by
//! [`line`].
//!
//! # Example
//!
//! ```
//! use squircle_renderer::vector::apply_background_and_padding;
//!
//! let icon = apply_background_and_padding(
//!     r#"<svg viewBox="0 0 24 24"><circle cx="12" cy="12" r="8"/></svg>"#,
//!     &"#2463e9".parse().unwrap(),
//!     6.0,
//!     4.0,
//!     &"#ffffff".parse().unwrap(),
//! )
//! .unwrap();
//! assert!(icon.contains(r#"viewBox="-4 -4 32 32""#));
//! ```

pub mod document;
pub mod line;

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::asset::{Asset, svg_data_uri};
use crate::color::{HexColor, clamp};
use crate::compositor::RasterAssets;
use crate::error::{InputError, MarkupError, Result, SurfaceError};
use crate::geometry::{format_number, squircle_path};
use crate::profile::{VectorProfile, VectorSettings};
use crate::surface::Surface;
use document::{Document, Element, escape_attribute};

pub use line::{generate_line_markup, rasterize_line};

/// Attribute tagging the injected background so it can be replaced.
pub const BACKGROUND_MARKER: &str = "data-background-path";

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Padding beyond this is clamped so the padded view box stays finite.
const MAX_PADDING: f64 = 1e9;

// ============================================================================
// View Box
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct ViewBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl ViewBox {
    /// Reads the explicit `viewBox`, or derives one from `width`/`height`.
    fn of(root: &Element) -> Result<Self, InputError> {
        if let Some(value) = root.attribute("viewBox") {
            return Self::parse(value);
        }

        match (root.attribute("width"), root.attribute("height")) {
            (Some(width), Some(height)) => Ok(Self {
                x: 0.0,
                y: 0.0,
                width: parse_length("width", width)?,
                height: parse_length("height", height)?,
            }),
            _ => Err(InputError::MissingDimensions),
        }
    }

    fn parse(value: &str) -> Result<Self, InputError> {
        let numbers = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>().ok().filter(|n| n.is_finite()))
            .collect::<Option<Vec<_>>>();

        match numbers.as_deref() {
            Some(&[x, y, width, height]) => Ok(Self {
                x,
                y,
                width,
                height,
            }),
            _ => Err(InputError::InvalidViewBox(value.to_string())),
        }
    }

    fn expand(self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }
}

impl std::fmt::Display for ViewBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            format_number(self.x),
            format_number(self.y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// Returns `value`, or `fallback` if it is NaN or infinite.
fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Reads the leading number of a length such as `24px` or `1.5em`.
fn parse_length(attribute: &'static str, value: &str) -> Result<f64, InputError> {
    let trimmed = value.trim_start();
    trimmed[..numeric_prefix_len(trimmed)]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| InputError::InvalidDimension {
            attribute,
            value: value.to_string(),
        })
}

/// Byte length of the longest `[+-]digits[.digits][e[+-]digits]` prefix.
fn numeric_prefix_len(value: &str) -> usize {
    let bytes = value.as_bytes();
    let digits_from = |start: usize| {
        start
            + bytes[start..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
    };

    let mut end = match bytes.first() {
        Some(b'+' | b'-') => 1,
        _ => 0,
    };
    let integer_end = digits_from(end);
    let mut mantissa_digits = integer_end - end;
    end = integer_end;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        mantissa_digits += fraction_end - end - 1;
        end = fraction_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if let Some(b'e' | b'E') = bytes.get(end) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent_end = digits_from(end + 1 + sign);
        if exponent_end > end + 1 + sign {
            end = exponent_end;
        }
    }
    end
}

/// Replaces any `color` declaration in an inline style.
fn merge_color_style(style: Option<&str>, color: &HexColor) -> String {
    let mut declarations: Vec<&str> = style
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl.split(':').next().unwrap_or_default().trim();
            !property.eq_ignore_ascii_case("color")
        })
        .collect();

    let color = format!("color: {color}");
    declarations.push(&color);
    declarations.join("; ")
}

fn is_background(element: &Element) -> bool {
    element.local_name() == "path" && element.attribute(BACKGROUND_MARKER) == Some("true")
}

// ============================================================================
// Markup Transforms
// ============================================================================

/// Pads a document's view box and places a squircle background behind it.
///
/// The view box (explicit, or derived from `width`/`height`) grows by
/// `padding` on every side; negative or non-finite padding counts as zero.
/// Width, height and view box are rewritten to match, and `foreground`
/// becomes the document's `color` so `currentColor` content picks it up. A
/// background injected by an earlier call is replaced, never duplicated.
pub fn apply_background_and_padding(
    markup: &str,
    background: &HexColor,
    corner_radius: f64,
    padding: f64,
    foreground: &HexColor,
) -> Result<String> {
    let Document { root } = Document::parse(markup)?;

    let padding = clamp(finite_or(padding, 0.0), 0.0, MAX_PADDING);
    let view = ViewBox::of(&root)?.expand(padding);
    log::trace!("padded view box to {view}");

    let corner_radius = finite_or(corner_radius, 0.0);
    let outline = squircle_path(view.x, view.y, view.width, view.height, corner_radius);
    let path_name = match root.prefix() {
        Some(prefix) => format!("{prefix}:path"),
        None => "path".to_string(),
    };
    let background_path = Element::new(path_name)
        .with_attribute("d", outline.to_svg_data())
        .with_attribute("fill", background.as_str())
        .with_attribute("stroke", "none")
        .with_attribute(BACKGROUND_MARKER, "true");

    let style = merge_color_style(root.attribute("style"), foreground);
    let root = root
        .with_default_namespace(SVG_NAMESPACE)
        .with_attribute("width", format_number(view.width))
        .with_attribute("height", format_number(view.height))
        .with_attribute("viewBox", view.to_string())
        .with_attribute("color", foreground.as_str())
        .with_attribute("style", style)
        .without_descendants(&is_background)
        .with_first_child(background_path);

    Ok(Document { root }.to_string())
}

/// Builds the wide banner document embedding the icon at its center.
pub fn generate_banner_markup(
    icon_data_uri: &str,
    background: &HexColor,
    profile: &VectorProfile,
) -> String {
    let width = profile.banner_width as f64;
    let height = profile.banner_height as f64;
    let size = profile.banner_icon_size as f64;

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg xmlns=\"{ns}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            "  <rect width=\"100%\" height=\"100%\" fill=\"{bg}\" />\n",
            "  <image x=\"{x}\" y=\"{y}\" width=\"{s}\" height=\"{s}\" href=\"{href}\" />\n",
            "</svg>"
        ),
        ns = SVG_NAMESPACE,
        w = format_number(width),
        h = format_number(height),
        bg = background,
        x = format_number((width - size) / 2.0),
        y = format_number((height - size) / 2.0),
        s = format_number(size),
        href = escape_attribute(icon_data_uri),
    )
}

// ============================================================================
// Rasterization
// ============================================================================

/// Renders markup stretched to exactly `width x height` pixels.
pub fn rasterize_markup(markup: &str, width: u32, height: u32) -> Result<RgbaImage> {
    Ok(render_markup(markup, width, height)?.to_rgba_image())
}

fn render_markup(markup: &str, width: u32, height: u32) -> Result<Surface> {
    let tree = Tree::from_str(markup, &Options::default())
        .map_err(|err| MarkupError::Render(err.to_string()))?;

    let mut pixmap = Pixmap::new(width, height).ok_or(SurfaceError::Unavailable { width, height })?;
    let size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(Surface::from_pixmap(pixmap))
}

// ============================================================================
// VectorCompositor
// ============================================================================

/// Markup outputs of the vector flow, each also packaged for inline preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorAssets {
    pub icon_markup: String,
    pub icon_data_uri: String,
    pub banner_markup: String,
    pub banner_data_uri: String,
}

impl VectorAssets {
    pub fn icon(&self) -> Asset {
        Asset::Markup(self.icon_markup.clone())
    }

    pub fn banner(&self) -> Asset {
        Asset::Markup(self.banner_markup.clone())
    }
}

/// Composites SVG icons and banners for the vector workflow.
#[derive(Debug, Clone, Default)]
pub struct VectorCompositor {
    profile: VectorProfile,
}

impl VectorCompositor {
    pub fn new(profile: VectorProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &VectorProfile {
        &self.profile
    }

    /// Produces the icon and banner documents for the `markup` icon.
    pub fn generate(&self, markup: &str, settings: &VectorSettings) -> Result<VectorAssets> {
        let icon_markup = apply_background_and_padding(
            markup,
            &settings.background,
            settings.corner_radius,
            settings.padding,
            &settings.foreground,
        )?;
        let icon_data_uri = svg_data_uri(&icon_markup);
        let banner_markup = generate_banner_markup(&icon_data_uri, &settings.background, &self.profile);
        let banner_data_uri = svg_data_uri(&banner_markup);

        log::debug!(
            "generated vector icon ({} bytes) and banner ({} bytes)",
            icon_markup.len(),
            banner_markup.len()
        );
        Ok(VectorAssets {
            icon_markup,
            icon_data_uri,
            banner_markup,
            banner_data_uri,
        })
    }

    /// Renders both documents to PNG at the profile's export sizes.
    pub fn rasterize(&self, assets: &VectorAssets) -> Result<RasterAssets> {
        let size = self.profile.icon_png_size;
        let icon = render_markup(&assets.icon_markup, size, size)?;
        let banner = render_markup(
            &assets.banner_markup,
            self.profile.banner_width,
            self.profile.banner_height,
        )?;

        Ok(RasterAssets {
            icon: Asset::Png(icon.encode_png()?),
            banner: Asset::Png(banner.encode_png()?),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    const GLYPH: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" width="24" height="24"><path d="M12 2L2 22h20z" fill="currentColor"/></svg>"#;

    fn hex(value: &str) -> HexColor {
        value.parse().unwrap()
    }

    fn apply(markup: &str, padding: f64) -> Result<String> {
        apply_background_and_padding(markup, &hex("#ffffff"), 6.0, padding, &hex("#000000"))
    }

    fn background_count(markup: &str) -> usize {
        markup.matches(BACKGROUND_MARKER).count()
    }

    #[test]
    fn pads_and_injects_background() {
        let output = apply(GLYPH, 4.0).unwrap();
        assert_eq!(
            output,
            concat!(
                r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="-4 -4 32 32" width="32" height="32" color="#000000" style="color: #000000">"##,
                r##"<path d="M2,-4 H22 C26.8,-4 28,-2.8 28,2 V22 C28,26.8 26.8,28 22,28 H2 C-2.8,28 -4,26.8 -4,22 V2 C-4,-2.8 -2.8,-4 2,-4 Z" fill="#ffffff" stroke="none" data-background-path="true"/>"##,
                r#"<path d="M12 2L2 22h20z" fill="currentColor"/></svg>"#
            )
        );
    }

    #[test]
    fn reapplying_replaces_the_background() {
        let once = apply(GLYPH, 4.0).unwrap();
        let twice = apply(&once, 4.0).unwrap();
        assert_eq!(background_count(&twice), 1);
        assert!(twice.contains(r#"viewBox="-8 -8 40 40""#));

        let flat = apply(GLYPH, 0.0).unwrap();
        assert_eq!(apply(&flat, 0.0).unwrap(), flat);
    }

    #[test]
    fn nested_backgrounds_are_removed() {
        let markup = r#"<svg viewBox="0 0 10 10"><g><path data-background-path="true" d="M0 0"/></g></svg>"#;
        let output = apply(markup, 0.0).unwrap();
        assert_eq!(background_count(&output), 1);
        assert!(output.contains("<g/>"));
    }

    #[test]
    fn derives_view_box_from_lengths() {
        let output = apply(r#"<svg width="24px" height="12"><g/></svg>"#, 1.0).unwrap();
        assert!(output.contains(r#"width="26" height="14""#), "{output}");
        assert!(output.contains(r#"viewBox="-1 -1 26 14""#), "{output}");
        assert!(output.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg""#));
    }

    #[test]
    fn negative_padding_is_ignored() {
        let output = apply(r#"<svg viewBox="0,0,24,24"/>"#, -5.0).unwrap();
        assert!(output.contains(r#"viewBox="0 0 24 24""#));
    }

    #[test]
    fn non_finite_sizes_keep_markup_renderable() {
        let square = r#"<svg viewBox="0 0 24 24"/>"#;
        for padding in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let output = apply_background_and_padding(
                square,
                &hex("#fff"),
                f64::INFINITY,
                padding,
                &hex("#000"),
            )
            .unwrap();
            assert!(!output.contains("inf") && !output.contains("NaN"), "{output}");
            assert!(output.contains(r#"viewBox="0 0 24 24""#), "{output}");
            assert!(output.contains(r#"d="M0,0 H24 V24 H0 Z""#), "{output}");
            rasterize_markup(&output, 8, 8).unwrap();
        }

        let huge = apply(square, f64::MAX).unwrap();
        assert!(huge.contains(r#"viewBox="-1000000000 -1000000000 2000000024 2000000024""#));
    }

    #[test]
    fn merges_color_into_style() {
        let output = apply_background_and_padding(
            r#"<svg viewBox="0 0 1 1" style="fill: none; Color: red;"/>"#,
            &hex("#fff"),
            0.0,
            0.0,
            &hex("#123"),
        )
        .unwrap();
        assert!(output.contains(r##"color="#112233""##));
        assert!(output.contains(r#"style="fill: none; color: #112233""#));
    }

    #[test]
    fn dimension_errors() {
        let err = apply(r#"<svg width="24"/>"#, 0.0).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::MissingDimensions)));

        let err = apply(r#"<svg width="auto" height="24"/>"#, 0.0).unwrap_err();
        assert!(matches!(
            err,
            Error::Input(InputError::InvalidDimension { attribute: "width", .. })
        ));

        let err = apply(r#"<svg viewBox="0 0 24"/>"#, 0.0).unwrap_err();
        assert!(matches!(err, Error::Input(InputError::InvalidViewBox(_))));
    }

    #[test]
    fn markup_errors() {
        let err = apply("<svg><g></svg>", 0.0).unwrap_err();
        assert!(matches!(err, Error::Markup(MarkupError::InvalidDocument(_))));

        let err = apply(r#"<div width="1" height="1"/>"#, 0.0).unwrap_err();
        assert!(matches!(err, Error::Markup(MarkupError::UnexpectedRoot(_))));
    }

    #[test]
    fn leading_number_lengths() {
        assert_eq!(parse_length("width", "24px"), Ok(24.0));
        assert_eq!(parse_length("width", " 1.5em"), Ok(1.5));
        assert_eq!(parse_length("height", "-3"), Ok(-3.0));
        assert_eq!(parse_length("width", "2.5e1em"), Ok(25.0));
        assert_eq!(parse_length("width", "3e"), Ok(3.0));
        assert_eq!(parse_length("width", ".5."), Ok(0.5));
        assert_eq!(parse_length("width", "7.pt"), Ok(7.0));
        assert!(parse_length("height", "px").is_err());
        assert!(parse_length("height", "-.").is_err());
        assert!(parse_length("height", "infinity").is_err());
        assert!(parse_length("height", "").is_err());

        let long = format!("12{}", "x".repeat(100_000));
        assert_eq!(parse_length("width", &long), Ok(12.0));
    }

    #[test]
    fn banner_template() {
        let banner = generate_banner_markup(
            "data:image/svg+xml;base64,AAAA",
            &hex("#2463e9"),
            &VectorProfile::default(),
        );
        assert_eq!(
            banner,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1500\" height=\"600\" viewBox=\"0 0 1500 600\">\n  \
             <rect width=\"100%\" height=\"100%\" fill=\"#2463e9\" />\n  \
             <image x=\"686\" y=\"236\" width=\"128\" height=\"128\" href=\"data:image/svg+xml;base64,AAAA\" />\n\
             </svg>"
        );
    }

    #[test]
    fn rasterizes_with_exact_size() {
        let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="#ff0000"/></svg>"##;
        let image = rasterize_markup(markup, 20, 40).unwrap();
        assert_eq!(image.dimensions(), (20, 40));
        assert_eq!(image.get_pixel(10, 30).0, [255, 0, 0, 255]);

        let err = rasterize_markup("not markup", 4, 4).unwrap_err();
        assert!(matches!(err, Error::Markup(MarkupError::Render(_))));
    }

    #[test]
    fn compositor_generates_and_rasterizes() {
        let compositor = VectorCompositor::default();
        let settings = VectorSettings {
            background: hex("#ff0000"),
            ..VectorSettings::default()
        };
        let assets = compositor.generate(GLYPH, &settings).unwrap();

        assert_eq!(background_count(&assets.icon_markup), 1);
        assert!(assets.banner_markup.contains(&assets.icon_data_uri));
        assert!(assets.banner_data_uri.starts_with("data:image/svg+xml;base64,"));

        let raster = compositor.rasterize(&assets).unwrap();
        let Asset::Png(banner) = &raster.banner else {
            panic!("expected png banner");
        };
        let banner = image::load_from_memory(banner).unwrap().to_rgba8();
        assert_eq!(banner.dimensions(), (1500, 600));
        assert_eq!(banner.get_pixel(5, 5).0, [255, 0, 0, 255]);

        let Asset::Png(icon) = &raster.icon else {
            panic!("expected png icon");
        };
        let icon = image::load_from_memory(icon).unwrap().to_rgba8();
        assert_eq!(icon.dimensions(), (512, 512));
        assert_eq!(icon.get_pixel(1, 1).0[3], 0);
    }
}
