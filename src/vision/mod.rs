// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for captured tongue images
//!
//! This module provides:
//! - Image loading with EXIF orientation correction and downsampling
//! - Conversion into the normalized NHWC tensor the classifier expects

pub mod image_utils;
pub mod preprocessing;

pub use image_utils::{
    calculate_sample_size, capture_file_path, decode_image_bytes, detect_format, load_image,
    save_jpeg, DecodeError, ImageInfo, ImageSaveError,
};
pub use preprocessing::{
    Normalization, Preprocessor, DEFAULT_INPUT_SIZE, IMAGENET_MEAN, IMAGENET_STD,
};
