// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tongue classifier: a lazily loaded model that maps a preprocessed tensor
//! to one raw score per label

pub mod backend;
pub mod errors;
pub mod lazy_model;
pub mod onnx;

pub use backend::{InferenceBackend, ModelLoader};
pub use errors::{ClassificationError, ClassifierError, ModelLoadError};
pub use lazy_model::LazyModel;
pub use onnx::{resolve_model_path, OnnxBackend, OnnxModelLoader};

use ndarray::Array4;

use crate::config::ModelConfig;

/// Validating wrapper around the model handle
#[derive(Debug)]
pub struct TongueClassifier {
    model: LazyModel,
    labels: Vec<String>,
    input_shape: [usize; 4],
}

impl TongueClassifier {
    pub fn new(loader: Box<dyn ModelLoader>, labels: Vec<String>, input_size: u32) -> Self {
        let size = input_size as usize;
        Self {
            model: LazyModel::new(loader),
            labels,
            input_shape: [1, size, size, 3],
        }
    }

    /// Classifier backed by ONNX Runtime at the configured asset paths
    pub fn from_config(config: &ModelConfig) -> Self {
        let loader = OnnxModelLoader::new(config.path.clone(), config.fallback_path.clone())
            .with_intra_threads(config.intra_threads);
        Self::new(Box::new(loader), config.labels.clone(), config.input_size)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    pub fn model(&self) -> &LazyModel {
        &self.model
    }

    /// Load the model ahead of the first classification
    pub fn warm_up(&self) -> Result<(), ClassifierError> {
        self.model.ensure_loaded()
    }

    /// Run the model and return one logit per label
    pub fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        if input.shape() != &self.input_shape[..] {
            return Err(ClassificationError::InputShape {
                expected: self.input_shape.to_vec(),
                actual: input.shape().to_vec(),
            }
            .into());
        }

        let logits = self.model.run(input)?;
        if logits.len() != self.labels.len() {
            return Err(ClassificationError::OutputLength {
                expected: self.labels.len(),
                actual: logits.len(),
            }
            .into());
        }
        Ok(logits)
    }

    pub fn release(&self) -> bool {
        self.model.release()
    }
}
