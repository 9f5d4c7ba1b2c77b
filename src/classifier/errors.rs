// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for model loading and inference

use thiserror::Error;

/// Failures acquiring the model handle
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// Neither the primary nor the fallback asset exists
    #[error("Model not found at {primary}{}", fallback_suffix(.fallback))]
    NotFound {
        primary: String,
        fallback: Option<String>,
    },

    /// ONNX Runtime rejected the asset
    #[error("Failed to load model from {path}: {reason}")]
    Session { path: String, reason: String },

    /// The owning component already released its handle
    #[error("Model handle has been released")]
    Released,
}

fn fallback_suffix(fallback: &Option<String>) -> String {
    fallback
        .as_ref()
        .map(|path| format!(" or {}", path))
        .unwrap_or_default()
}

/// Failures while running the loaded model
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Input tensor shape {actual:?} does not match expected {expected:?}")]
    InputShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Model produced {actual} scores, expected {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("Model produced a non-finite score at index {index}")]
    NonFiniteOutput { index: usize },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model lock poisoned")]
    LockPoisoned,

    #[error("Inference worker failed: {0}")]
    Worker(String),
}

/// Anything the classifier can fail with
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Load(#[from] ModelLoadError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}
