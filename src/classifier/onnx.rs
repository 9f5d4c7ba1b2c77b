// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Runtime backend for the tongue classifier
//!
//! The bundled model takes a `[1, 224, 224, 3]` f32 tensor and returns one
//! logit per class. Runs on CPU only.

use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::backend::{InferenceBackend, ModelLoader};
use super::errors::{ClassificationError, ModelLoadError};

/// Pick the asset to load: the primary path, or the fallback when the
/// primary does not exist
pub fn resolve_model_path(
    primary: &Path,
    fallback: Option<&Path>,
) -> Result<PathBuf, ModelLoadError> {
    if primary.exists() {
        return Ok(primary.to_path_buf());
    }

    match fallback {
        Some(fallback) if fallback.exists() => {
            warn!(
                "⚠️  Model not found at {}, using fallback {}",
                primary.display(),
                fallback.display()
            );
            Ok(fallback.to_path_buf())
        }
        _ => Err(ModelLoadError::NotFound {
            primary: primary.display().to_string(),
            fallback: fallback.map(|f| f.display().to_string()),
        }),
    }
}

/// Loads the classifier from a bundled asset path with one fallback location
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    primary: PathBuf,
    fallback: Option<PathBuf>,
    intra_threads: usize,
}

impl OnnxModelLoader {
    pub fn new(primary: impl Into<PathBuf>, fallback: Option<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            fallback,
            intra_threads: 1,
        }
    }

    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = threads.max(1);
        self
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(&self) -> Result<Box<dyn InferenceBackend>, ModelLoadError> {
        let path = resolve_model_path(&self.primary, self.fallback.as_deref())?;
        let backend = OnnxBackend::from_file(&path, self.intra_threads)?;
        Ok(Box::new(backend))
    }

    fn describe(&self) -> String {
        match &self.fallback {
            Some(fallback) => format!("{} (fallback {})", self.primary.display(), fallback.display()),
            None => self.primary.display().to_string(),
        }
    }
}

fn session_error(path: &Path, err: impl std::fmt::Display) -> ModelLoadError {
    ModelLoadError::Session {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// ONNX Runtime session holding the classifier graph
pub struct OnnxBackend {
    session: Session,
    name: String,
}

impl std::fmt::Debug for OnnxBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxBackend")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl OnnxBackend {
    pub fn from_file(path: &Path, intra_threads: usize) -> Result<Self, ModelLoadError> {
        info!("🚀 Loading tongue classifier from {}", path.display());

        let session = Session::builder()
            .map_err(|e| session_error(path, e))?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| session_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| session_error(path, e))?
            .with_intra_threads(intra_threads)
            .map_err(|e| session_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| session_error(path, e))?;

        info!("✅ Tongue classifier loaded from {}", path.display());

        Ok(Self {
            session,
            name: path.display().to_string(),
        })
    }
}

impl InferenceBackend for OnnxBackend {
    fn run(&mut self, input: Array4<f32>) -> Result<Vec<f32>, ClassificationError> {
        let value =
            Value::from_array(input).map_err(|e| ClassificationError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![value])
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;

        // Use index [0] instead of name since exported graphs name outputs differently
        let logits = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| ClassificationError::Inference(e.to_string()))?;

        Ok(logits.iter().copied().collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
