//! Error types for voxform

use thiserror::Error;

/// Result type alias using voxform's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or evaluating field trees
#[derive(Error, Debug)]
pub enum Error {
    /// A node parameter is out of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A transform cannot be inverted (e.g. zero scale factor)
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    /// An unbounded field reached the rasterizer without an enclosing
    /// bounded combinator
    #[error("Missing bounds: {0}")]
    MissingBounds(String),

    /// Rasterization produced an unusable sample
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// The enclosing job was aborted; no partial grid is returned
    #[error("Rasterization cancelled")]
    Cancelled,

    /// Image decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
