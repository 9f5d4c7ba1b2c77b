// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! From an image file on disk to the classifier input tensor

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use licky_scan::vision::{
    capture_file_path, load_image, save_jpeg, DecodeError, Normalization, Preprocessor,
    IMAGENET_MEAN, IMAGENET_STD,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn test_png_on_disk_to_tensor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tongue.png");
        solid(300, 200, [255, 0, 0])
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let (image, info) = load_image(&path, 1024).unwrap();
        assert_eq!((info.width, info.height), (300, 200));

        let tensor = Preprocessor::default().preprocess(&image).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);

        let red = (1.0 - IMAGENET_MEAN[0]) / IMAGENET_STD[0];
        let green = (0.0 - IMAGENET_MEAN[1]) / IMAGENET_STD[1];
        assert!((tensor[[0, 100, 100, 0]] - red).abs() < 1e-4);
        assert!((tensor[[0, 100, 100, 1]] - green).abs() < 1e-4);
    }

    #[test]
    fn test_large_capture_is_downsampled_before_preprocessing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        solid(2400, 8, [120, 60, 60])
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let (image, info) = load_image(&path, 1024).unwrap();
        assert_eq!(info.sample_size, 2);
        assert_eq!(image.width(), 1200);

        let tensor = Preprocessor::new(32, Normalization::UnitScale)
            .preprocess(&image)
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 32, 32, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_imported_copy_lands_in_captures_dir() {
        let dir = tempfile::tempdir().unwrap();
        let captures = dir.path().join("captures");
        let target = capture_file_path(&captures, chrono::Local::now());

        save_jpeg(&solid(16, 16, [200, 120, 130]), &target, 90).unwrap();

        assert!(target.starts_with(&captures));
        let (image, info) = load_image(&target, 1024).unwrap();
        assert_eq!(info.format, ImageFormat::Jpeg);
        assert_eq!((image.width(), image.height()), (16, 16));
    }

    #[test]
    fn test_unsupported_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"this is not an image").unwrap();

        let err = load_image(&path, 1024).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat));
    }
}
