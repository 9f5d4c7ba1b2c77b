// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error type for a full analysis run
//!
//! Every failure the pipeline can hit folds into [`AnalysisError`]:
//! - Image decoding or scaling failures
//! - Missing or corrupt model assets
//! - Inference runtime failures
//! - Storage write failures

use thiserror::Error;

use crate::classifier::{ClassificationError, ClassifierError, ModelLoadError};
use crate::storage::PersistenceError;
use crate::vision::{DecodeError, ImageSaveError};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<ClassifierError> for AnalysisError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::Load(e) => AnalysisError::ModelLoad(e),
            ClassifierError::Classification(e) => AnalysisError::Classification(e),
        }
    }
}

/// Saving an imported capture counts as a storage failure
impl From<ImageSaveError> for AnalysisError {
    fn from(err: ImageSaveError) -> Self {
        let persistence = match err {
            ImageSaveError::Io { path, source } => PersistenceError::Io { path, source },
            ImageSaveError::Encode(e) => {
                PersistenceError::Backend(format!("Failed to encode JPEG: {}", e))
            }
        };
        AnalysisError::Persistence(persistence)
    }
}

impl AnalysisError {
    /// Single failure line shown to the user
    pub fn user_message(&self) -> String {
        let reason = match self {
            AnalysisError::Decode(DecodeError::Io { .. }) => {
                "the image file could not be read".to_string()
            }
            AnalysisError::Decode(DecodeError::UnsupportedFormat) => {
                "the image format is not supported".to_string()
            }
            AnalysisError::Decode(DecodeError::TooLarge(_, _)) => {
                "the image is too large".to_string()
            }
            AnalysisError::Decode(_) => "the image could not be processed".to_string(),
            AnalysisError::ModelLoad(_) => "the analysis model is unavailable".to_string(),
            AnalysisError::Classification(_) => "the model could not classify the image".to_string(),
            AnalysisError::Persistence(_) => "the result could not be saved".to_string(),
        };
        format!("Analysis failed: {}", reason)
    }

    /// Stable code for logs and scripting
    pub fn error_code(&self) -> &'static str {
        match self {
            AnalysisError::Decode(_) => "DECODE_ERROR",
            AnalysisError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            AnalysisError::Classification(_) => "CLASSIFICATION_ERROR",
            AnalysisError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}
