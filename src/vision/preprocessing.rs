// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the tongue classifier

use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::image_utils::DecodeError;

/// Default square edge length fed to the classifier
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// ImageNet normalization mean values
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet normalization std values
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Per-channel normalization applied after scaling pixels to [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// (pixel/255 - mean) / std with ImageNet constants
    #[serde(rename = "imagenet")]
    ImageNet,
    /// pixel/255 only
    #[serde(rename = "unit_scale")]
    UnitScale,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::ImageNet
    }
}

impl Normalization {
    pub fn mean(&self) -> [f32; 3] {
        match self {
            Normalization::ImageNet => IMAGENET_MEAN,
            Normalization::UnitScale => [0.0; 3],
        }
    }

    pub fn std(&self) -> [f32; 3] {
        match self {
            Normalization::ImageNet => IMAGENET_STD,
            Normalization::UnitScale => [1.0; 3],
        }
    }
}

impl FromStr for Normalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "imagenet" => Ok(Normalization::ImageNet),
            "unit_scale" | "unit" => Ok(Normalization::UnitScale),
            _ => Err(format!("Unknown normalization scheme: {}", s)),
        }
    }
}

/// Turns a decoded image into the classifier input tensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preprocessor {
    input_size: u32,
    normalization: Normalization,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE, Normalization::ImageNet)
    }
}

impl Preprocessor {
    pub fn new(input_size: u32, normalization: Normalization) -> Self {
        Self {
            input_size,
            normalization,
        }
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Shape of every tensor this preprocessor produces (NHWC)
    pub fn tensor_shape(&self) -> [usize; 4] {
        let size = self.input_size as usize;
        [1, size, size, 3]
    }

    /// Preprocess an image into a `(1, S, S, 3)` tensor
    ///
    /// Steps:
    /// 1. Resize to exactly S x S (aspect ratio is not preserved)
    /// 2. Convert to RGB
    /// 3. Normalize each channel: (pixel / 255.0 - mean) / std
    pub fn preprocess(&self, image: &DynamicImage) -> Result<Array4<f32>, DecodeError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || self.input_size == 0 {
            return Err(DecodeError::EmptyImage { width, height });
        }

        let size = self.input_size;
        let rgb = if (width, height) == (size, size) {
            image.to_rgb8()
        } else {
            image
                .resize_exact(size, size, image::imageops::FilterType::Triangle)
                .to_rgb8()
        };

        let mean = self.normalization.mean();
        let std = self.normalization.std();
        let size = size as usize;
        let mut tensor = Array4::zeros((1, size, size, 3));

        for (x, y, pixel) in rgb.enumerate_pixels() {
            for c in 0..3 {
                let scaled = pixel[c] as f32 / 255.0;
                tensor[[0, y as usize, x as usize, c]] = (scaled - mean[c]) / std[c];
            }
        }

        Ok(tensor)
    }
}
