//! squircle-renderer: squircle icons and wide banners from images and SVGs
//!
//! This crate turns user artwork into a pair of assets: a square icon with
//! squircle corners and a wide banner that centers the icon on a matching
//! background. Raster sources go through [`RasterCompositor`]; SVG markup goes
//! through [`VectorCompositor`], which edits the document instead of
//! rasterizing it.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use squircle_renderer::{FlowProfile, GenerationSettings, RasterCompositor};
//!
//! let source = RgbaImage::from_pixel(120, 80, Rgba([36, 99, 233, 255]));
//! let compositor = RasterCompositor::new(FlowProfile::image_upload());
//!
//! // Suggest a background from the artwork itself
//! let background = compositor.suggest_background(&source);
//!
//! let settings = GenerationSettings::new(background.to_hex().as_str(), 40.0, 24.0);
//! let assets = compositor.generate(&source, &settings).unwrap();
//! let preview = assets.icon.to_data_uri();
//! assert!(preview.starts_with("data:image/png;base64,"));
//! ```
//!
//! # Vector Markup
//!
//! ```
//! use squircle_renderer::{VectorCompositor, VectorSettings};
//!
//! let svg = r#"<svg viewBox="0 0 24 24"><path d="M4 4h16v16H4z" fill="currentColor"/></svg>"#;
//! let assets = VectorCompositor::default()
//!     .generate(svg, &VectorSettings::default())
//!     .unwrap();
//!
//! assert!(assets.icon_markup.contains("data-background-path"));
//! assert!(assets.banner_markup.contains(&assets.icon_data_uri));
//! ```
//!
//! # Serializable Settings
//!
//! Settings and per-flow profiles (de)serialize as camelCase JSON, so a
//! frontend can hand them over unchanged. See [`GenerationSettings`],
//! [`VectorSettings`] and [`FlowProfile`].

pub mod asset;
pub mod color;
pub mod compositor;
pub mod error;
pub mod generation;
pub mod geometry;
mod layer;
pub mod profile;
pub mod sampler;
pub mod session;
pub mod surface;
pub mod vector;

pub use asset::{Asset, BannerAsset, IconAsset};
pub use color::{HexColor, RgbColor, normalize_hex};
pub use compositor::{RasterAssets, RasterCompositor, ResolvedSettings};
pub use error::{Error, InputError, MarkupError, Result, SurfaceError};
pub use generation::{GenerationId, GenerationTracker};
pub use profile::{
    BackdropSettings, FlowProfile, GenerationSettings, LineSettings, ShadowSettings,
    VectorProfile, VectorSettings,
};
pub use sampler::{sample_average_color, suggest_background};
pub use session::GenerationSession;
pub use vector::{VectorAssets, VectorCompositor, generate_line_markup};
