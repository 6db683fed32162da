use std::path::PathBuf;
use thiserror::Error;

/// Invalid color input. These are configuration errors and are raised
/// before any image is read.
#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("{0} is not a valid hex color")]
    InvalidHex(String),

    #[error("color threshold must be a finite, non-negative number (got {0})")]
    InvalidThreshold(f64),

    #[error("cannot average an empty list of colors")]
    Empty,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClusterError {
    #[error("proximity threshold must be a finite, non-negative number (got {0})")]
    InvalidThreshold(f64),

    #[error("point {0} has a non-finite coordinate")]
    NonFinitePoint(usize),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid color key: {0}")]
    Configuration(#[from] ColorError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("colors for '{first}' and '{second}' overlap")]
    OverlappingColors { first: String, second: String },

    #[error("failed to read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image {}: {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
