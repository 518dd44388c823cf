//! JPEG codec capability used by the resize pipeline.
//!
//! The pipeline only needs four operations: decode a source file, report its
//! dimensions, resample to an exact size and encode at a quality. [`Codec`]
//! captures exactly that, so the engine can be driven by [`JpegCodec`] in
//! production and by an in-memory fake in tests.

use std::path::Path;

use image::DynamicImage;
use mozjpeg::{ColorSpace, Compress};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::processing::resize::{Dimensions, FilterType};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a JPEG file")]
    NotJpeg,
    #[error("image has no pixels ({0})")]
    EmptyImage(Dimensions),
    #[error("{0}")]
    Image(#[from] image::ImageError),
    #[error("encoder failed: {0}")]
    Encoder(String),
}

/// JPEG scan layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Single sequential scan
    Baseline,
    /// Interlaced scans rendering coarse-to-fine
    #[default]
    Progressive,
}

/// Encoder hints passed along with the quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeHints {
    pub scan: ScanMode,
    /// Optimized Huffman tables (smaller files, slower encode)
    pub optimize_coding: bool,
}

impl Default for EncodeHints {
    fn default() -> Self {
        Self {
            scan: ScanMode::Progressive,
            optimize_coding: true,
        }
    }
}

impl EncodeHints {
    pub fn baseline() -> Self {
        Self {
            scan: ScanMode::Baseline,
            ..Self::default()
        }
    }
}

/// Decode / resample / encode operations the pipeline depends on.
///
/// Shared by every worker, hence `Sync`.
pub trait Codec: Send + Sync {
    /// Decoded pixel data
    type Image: Send;

    /// Decode the file at `path`.
    fn decode(&self, path: &Path) -> Result<Self::Image, CodecError>;

    /// Pixel dimensions of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resample to exactly `size`.
    fn resample(&self, image: &Self::Image, size: Dimensions) -> Result<Self::Image, CodecError>;

    /// Encode to JPEG bytes.
    fn encode(&self, image: &Self::Image, quality: u8, hints: &EncodeHints) -> Result<Vec<u8>, CodecError>;
}

/// Production codec: `image` for decoding and resampling, mozjpeg for
/// progressive output and the `image` JPEG encoder for baseline output.
#[derive(Debug, Clone, Default)]
pub struct JpegCodec {
    filter: FilterType,
}

impl JpegCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    fn encode_progressive(
        &self,
        rgb: &image::RgbImage,
        quality: u8,
        optimize_coding: bool,
    ) -> Result<Vec<u8>, CodecError> {
        let (w, h) = rgb.dimensions();
        let pixels: &[u8] = rgb.as_raw();

        // libjpeg reports fatal errors by unwinding
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> Result<Vec<u8>, CodecError> {
            let mut comp = Compress::new(ColorSpace::JCS_RGB);
            comp.set_size(w as usize, h as usize);
            comp.set_color_space(ColorSpace::JCS_YCbCr);
            comp.set_quality(f32::from(quality));
            comp.set_progressive_mode();
            comp.set_optimize_coding(optimize_coding);

            let mut output = Vec::with_capacity((w as usize * h as usize * 3 / 10).max(4096));
            {
                let mut writer = comp
                    .start_compress(&mut output)
                    .map_err(|e| CodecError::Encoder(format!("failed to start compress: {e}")))?;

                let stride = w as usize * 3;
                for row in pixels.chunks(stride) {
                    writer
                        .write_scanlines(row)
                        .map_err(|e| CodecError::Encoder(format!("failed to write scanlines: {e}")))?;
                }

                writer
                    .finish()
                    .map_err(|e| CodecError::Encoder(format!("failed to finish: {e}")))?;
            }
            Ok(output)
        }))
        .map_err(|_| CodecError::Encoder("mozjpeg aborted".to_string()))?
    }

    fn encode_baseline(&self, rgb: &image::RgbImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let mut output = Vec::new();
        {
            // the image encoder only accepts 1-100
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality.max(1));
            encoder.encode_image(rgb)?;
        }
        Ok(output)
    }
}

impl Codec for JpegCodec {
    type Image = DynamicImage;

    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        let data = std::fs::read(path)?;

        if !infer::image::is_jpeg(&data) {
            return Err(CodecError::NotJpeg);
        }

        let image = image::load_from_memory_with_format(&data, image::ImageFormat::Jpeg)?;
        let size = Dimensions::new(image.width(), image.height());
        if size.is_empty() {
            return Err(CodecError::EmptyImage(size));
        }

        debug!("Decoded {:?}: {}", path, size);
        Ok(image)
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions::new(image.width(), image.height())
    }

    fn resample(&self, image: &DynamicImage, size: Dimensions) -> Result<DynamicImage, CodecError> {
        if size.is_empty() {
            return Err(CodecError::EmptyImage(size));
        }

        if size == self.dimensions(image) {
            return Ok(image.clone());
        }

        Ok(image.resize_exact(size.width, size.height, self.filter.into()))
    }

    fn encode(&self, image: &DynamicImage, quality: u8, hints: &EncodeHints) -> Result<Vec<u8>, CodecError> {
        let size = self.dimensions(image);
        if size.is_empty() {
            return Err(CodecError::EmptyImage(size));
        }

        let rgb = image.to_rgb8();
        match hints.scan {
            ScanMode::Progressive => self.encode_progressive(&rgb, quality.min(100), hints.optimize_coding),
            ScanMode::Baseline => self.encode_baseline(&rgb, quality.min(100)),
        }
    }
}
