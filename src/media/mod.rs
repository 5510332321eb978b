//! Product photo acquisition and normalization
//!
//! Every stored photo is a PNG of the configured canvas size with the
//! source image scaled to fit and centered on a transparent background.
//! Files live under `<storage-root>/<product id>/`.

mod processor;

pub use processor::{fit_within, normalize_image, CanvasFit, ImageProcessor};

use crate::FetchError;
use thiserror::Error;

/// Reasons a single image produced no stored file
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has no pixels")]
    Empty,

    #[error("encode failed: {0}")]
    Encode(image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
