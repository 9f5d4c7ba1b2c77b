// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Seams between the classifier and the inference runtime

use ndarray::Array4;

use super::errors::{ClassificationError, ModelLoadError};

/// A loaded model that turns one input tensor into raw class scores
pub trait InferenceBackend: Send {
    /// Run a single forward pass and return the flattened logits
    fn run(&mut self, input: Array4<f32>) -> Result<Vec<f32>, ClassificationError>;

    /// Short description for logs (usually the asset path)
    fn name(&self) -> &str;
}

/// Produces a backend on first use
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn InferenceBackend>, ModelLoadError>;

    fn describe(&self) -> String;
}
