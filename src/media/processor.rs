//! Image download, canvas normalization and storage

use crate::config::ImageConfig;
use crate::crawler::PageSource;
use crate::media::ImageError;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use rand::Rng;
use std::path::PathBuf;

const TOKEN_DIGITS: usize = 8;

/// Size and offset of a source image scaled onto the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasFit {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Computes how a `src_width`×`src_height` image sits on the canvas
///
/// The side that is longer relative to its canvas side is scaled to fill
/// that side; the other side scales proportionally (rounded down, never
/// below 1) and is centered, leaving transparent bands.
///
/// # Example
///
/// ```
/// use catalog_ingest::media::{fit_within, CanvasFit};
///
/// let fit = fit_within(1000, 500, 580, 760);
/// assert_eq!(fit, CanvasFit { width: 580, height: 290, x: 0, y: 235 });
/// ```
pub fn fit_within(src_width: u32, src_height: u32, canvas_width: u32, canvas_height: u32) -> CanvasFit {
    let (sw, sh) = (src_width.max(1) as u64, src_height.max(1) as u64);
    let (cw, ch) = (canvas_width as u64, canvas_height as u64);

    // sw / cw >= sh / ch, without floating point
    let (width, height) = if sw * ch >= sh * cw {
        (cw, (sh * cw / sw).max(1))
    } else {
        ((sw * ch / sh).max(1), ch)
    };

    CanvasFit {
        width: width as u32,
        height: height as u32,
        x: ((cw - width) / 2) as u32,
        y: ((ch - height) / 2) as u32,
    }
}

/// Decodes `bytes` and composites them centered on a transparent canvas
pub fn normalize_image(
    bytes: &[u8],
    canvas_width: u32,
    canvas_height: u32,
) -> Result<RgbaImage, ImageError> {
    let source = image::load_from_memory(bytes)?.to_rgba8();
    if source.width() == 0 || source.height() == 0 {
        return Err(ImageError::Empty);
    }

    let fit = fit_within(source.width(), source.height(), canvas_width, canvas_height);
    let scaled = imageops::resize(&source, fit.width, fit.height, FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, Rgba([0, 0, 0, 0]));
    imageops::overlay(&mut canvas, &scaled, fit.x as i64, fit.y as i64);

    Ok(canvas)
}

/// Downloads product photos and stores them as normalized PNGs
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    canvas_width: u32,
    canvas_height: u32,
    storage_root: PathBuf,
}

impl ImageProcessor {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            storage_root: PathBuf::from(&config.storage_root),
        }
    }

    /// Directory holding every stored image of one product
    pub fn product_dir(&self, product_id: i64) -> PathBuf {
        self.storage_root.join(product_id.to_string())
    }

    /// Downloads, normalizes and stores one image
    ///
    /// Any failure is logged and reported as `None`; the caller skips the
    /// image and carries on.
    pub async fn process<P: PageSource + ?Sized>(
        &self,
        source: &P,
        image_url: &str,
        product_id: i64,
        sequence_index: usize,
    ) -> Option<PathBuf> {
        match self
            .try_process(source, image_url, product_id, sequence_index)
            .await
        {
            Ok(path) => {
                tracing::debug!("Stored {} as {}", image_url, path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Error processing image {}: {}", image_url, e);
                None
            }
        }
    }

    /// Same as [`process`](Self::process) but keeps the failure
    pub async fn try_process<P: PageSource + ?Sized>(
        &self,
        source: &P,
        image_url: &str,
        product_id: i64,
        sequence_index: usize,
    ) -> Result<PathBuf, ImageError> {
        let bytes = source.fetch_image(image_url).await.into_result(image_url)?;
        let canvas = normalize_image(&bytes, self.canvas_width, self.canvas_height)?;

        let dir = self.product_dir(product_id);
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}-{}.png", random_digits(TOKEN_DIGITS), sequence_index));
        canvas
            .save_with_format(&path, ImageFormat::Png)
            .map_err(ImageError::Encode)?;

        Ok(path)
    }
}

/// Random numeric token used to keep file names unique across runs
fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
