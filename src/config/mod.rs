// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Application configuration
//!
//! Defaults are overridden first by an optional TOML file, then by `LICKY_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::vision::Normalization;

/// Reference label set, in model output order
pub const DEFAULT_LABELS: [&str; 5] = [
    "healthy",
    "benign",
    "OPMD_Pra-Cancer",
    "OSCC_Cancer",
    "Diabetes",
];

pub const DEFAULT_MODEL_PATH: &str = "assets/ml/tongue_classifier_model.onnx";
pub const DEFAULT_FALLBACK_MODEL_PATH: &str = "assets/tongue_classifier_model.onnx";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Tried when `path` does not exist
    pub fallback_path: Option<PathBuf>,
    /// Square edge length fed to the network
    pub input_size: u32,
    pub normalization: Normalization,
    pub intra_threads: usize,
    /// Class labels in model output order
    pub labels: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            fallback_path: Some(PathBuf::from(DEFAULT_FALLBACK_MODEL_PATH)),
            input_size: 224,
            normalization: Normalization::ImageNet,
            intra_threads: 1,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub healthy_label: String,
    pub min_healthy_probability: f32,
    pub margin: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            healthy_label: "healthy".to_string(),
            min_healthy_probability: 0.50,
            margin: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub scans_file: String,
    pub user_file: String,
    pub captures_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./licky-data"),
            scans_file: "scan_results.json".to_string(),
            user_file: "user.json".to_string(),
            captures_dir: "captures".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn scans_path(&self) -> PathBuf {
        self.data_dir.join(&self.scans_file)
    }

    pub fn user_path(&self) -> PathBuf {
        self.data_dir.join(&self.user_file)
    }

    pub fn captures_path(&self) -> PathBuf {
        self.data_dir.join(&self.captures_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Images wider than this are downsampled on load
    pub max_load_width: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_load_width: 1024,
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub calibration: CalibrationConfig,
    pub storage: StorageConfig,
    pub image: ImageConfig,
}

impl AppConfig {
    /// Parse a TOML file on top of the defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Defaults, then the optional file, then environment overrides, validated
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply `LICKY_*` overrides read through `lookup`
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LICKY_MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(path) = lookup("LICKY_MODEL_FALLBACK_PATH") {
            // Empty value disables the fallback asset
            self.model.fallback_path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Some(dir) = lookup("LICKY_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("LICKY_INPUT_SIZE") {
            self.model.input_size = size.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "LICKY_INPUT_SIZE".to_string(),
                value: size.clone(),
            })?;
        }
        if let Some(scheme) = lookup("LICKY_NORMALIZATION") {
            self.model.normalization =
                scheme.parse().map_err(|_| ConfigError::InvalidEnv {
                    key: "LICKY_NORMALIZATION".to_string(),
                    value: scheme.clone(),
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.input_size == 0 {
            return Err(ConfigError::Invalid(
                "model.input_size must be greater than 0".to_string(),
            ));
        }
        if self.model.labels.is_empty() {
            return Err(ConfigError::Invalid(
                "model.labels must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for label in &self.model.labels {
            if !seen.insert(label.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate label in model.labels: {}",
                    label
                )));
            }
        }
        for (key, value) in [
            (
                "calibration.min_healthy_probability",
                self.calibration.min_healthy_probability,
            ),
            ("calibration.margin", self.calibration.margin),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    key, value
                )));
            }
        }
        if self.image.jpeg_quality == 0 || self.image.jpeg_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "image.jpeg_quality must be within 1..=100, got {}",
                self.image.jpeg_quality
            )));
        }
        Ok(())
    }
}
