//! Error types for the compositing engine.
//!
//! Malformed *structure* (unparsable markup, missing attributes, a drawing
//! surface that cannot be allocated) is reported through these types.
//! Out-of-range *magnitudes* (corner radius, padding, opacity) are clamped by
//! the operations themselves and never surface here.

use thiserror::Error;

/// Malformed caller input that the caller can correct and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A color string is not `#rgb` / `#rrggbb` hex.
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),

    /// The document has neither a `viewBox` nor both `width` and `height`.
    #[error("document needs a viewBox or both width and height attributes")]
    MissingDimensions,

    /// A `width`/`height` attribute does not start with a number.
    #[error("{attribute} attribute is not numeric: {value:?}")]
    InvalidDimension {
        attribute: &'static str,
        value: String,
    },

    /// A `viewBox` attribute is not four numbers.
    #[error("invalid viewBox: {0:?}")]
    InvalidViewBox(String),
}

/// Vector markup that cannot be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("root element is <{0}>, expected <svg>")]
    UnexpectedRoot(String),

    #[error("markup could not be rendered: {0}")]
    Render(String),
}

/// The drawing surface for a call could not be created or encoded.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface unavailable ({width}x{height})")]
    Unavailable { width: u32, height: u32 },

    #[error("failed to encode surface: {0}")]
    Encode(#[from] image::ImageError),
}

/// Any failure produced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
