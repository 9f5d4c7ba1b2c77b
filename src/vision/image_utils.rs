// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading and storage helpers for captured tongue photos

use chrono::{DateTime, Local};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Maximum image size (25MB, full-resolution phone captures)
const MAX_IMAGE_SIZE: usize = 25 * 1024 * 1024;

/// Errors raised while reading or decoding an input image
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read image {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Errors raised while writing an image copy to app storage
#[derive(Debug, Error)]
pub enum ImageSaveError {
    #[error("Failed to create {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels after orientation and downsampling
    pub width: u32,
    /// Height in pixels after orientation and downsampling
    pub height: u32,
    pub format: ImageFormat,
    pub size_bytes: usize,
    /// Power-of-two factor applied on load (1 = untouched)
    pub sample_size: u32,
}

/// Decode raw image bytes, honouring the EXIF orientation tag
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), DecodeError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(DecodeError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(DecodeError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let mut decoder = ImageReader::with_format(Cursor::new(bytes), format)
        .into_decoder()
        .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;
    // Formats without EXIF support report an error here; treat as upright
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;
    if orientation != Orientation::NoTransforms {
        debug!("Applying EXIF orientation {:?}", orientation);
        img.apply_orientation(orientation);
    }

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::EmptyImage {
            width: img.width(),
            height: img.height(),
        });
    }

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
        sample_size: 1,
    };

    Ok((img, info))
}

/// Load an image from disk, correct its orientation and downsample it so the
/// width does not exceed `max_width` by much
pub fn load_image<P: AsRef<Path>>(
    path: P,
    max_width: u32,
) -> Result<(DynamicImage, ImageInfo), DecodeError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let (img, mut info) = decode_image_bytes(&bytes)?;

    let sample_size = calculate_sample_size(img.width(), max_width);
    if sample_size == 1 {
        return Ok((img, info));
    }

    let width = (img.width() / sample_size).max(1);
    let height = (img.height() / sample_size).max(1);
    debug!(
        "Downsampling {} from {}x{} to {}x{} (factor {})",
        path.display(),
        img.width(),
        img.height(),
        width,
        height,
        sample_size
    );
    let img = img.resize_exact(width, height, FilterType::Triangle);

    info.width = img.width();
    info.height = img.height();
    info.sample_size = sample_size;
    Ok((img, info))
}

/// Largest power-of-two divisor keeping half the width at or above `max_width`
pub fn calculate_sample_size(width: u32, max_width: u32) -> u32 {
    let mut sample_size = 1;
    if max_width == 0 || width <= max_width {
        return sample_size;
    }
    let half_width = width / 2;
    while half_width / sample_size >= max_width {
        sample_size *= 2;
    }
    sample_size
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    if bytes.len() < 4 {
        return Err(DecodeError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        _ => Err(DecodeError::UnsupportedFormat),
    }
}

/// Path for a new capture: `LICKY_<yyyyMMdd_HHmmss>_<suffix>.jpg` inside `dir`
pub fn capture_file_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    dir.join(format!(
        "LICKY_{}_{}.jpg",
        now.format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    ))
}

/// Encode `image` as JPEG at `path`
pub fn save_jpeg(image: &DynamicImage, path: &Path, quality: u8) -> Result<(), ImageSaveError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ImageSaveError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| ImageSaveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    encoder.encode_image(&image.to_rgb8())?;
    debug!("Saved JPEG copy to {} (quality {})", path.display(), quality);
    Ok(())
}
