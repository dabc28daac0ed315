//! Output artifacts handed back to the caller.
//!
//! Every compositing call produces a fresh icon/banner pair. The engine never
//! writes them anywhere; filenames, downloads and clipboard actions belong to
//! the caller.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// One finished artifact: either encoded raster bytes or vector markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// A PNG-encoded image.
    Png(Vec<u8>),

    /// A standalone SVG document.
    Markup(String),
}

impl Asset {
    /// The file extension matching the artifact's format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png(_) => "png",
            Self::Markup(_) => "svg",
        }
    }

    /// The raw bytes of the artifact as they would be written to disk.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Png(bytes) => bytes,
            Self::Markup(markup) => markup.as_bytes(),
        }
    }

    /// Packages the artifact as a base64 data URI for inline preview.
    pub fn to_data_uri(&self) -> String {
        match self {
            Self::Png(bytes) => png_data_uri(bytes),
            Self::Markup(markup) => svg_data_uri(markup),
        }
    }
}

/// The square icon of a generation.
pub type IconAsset = Asset;

/// The wide banner of a generation.
pub type BannerAsset = Asset;

/// Encodes SVG markup as a `data:image/svg+xml;base64,` URI.
pub fn svg_data_uri(markup: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(markup))
}

/// Encodes PNG bytes as a `data:image/png;base64,` URI.
pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}
