// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image to record pipeline: preprocess, classify, compose, persist
//!
//! The CPU bound stages run on the blocking pool. A record is written only
//! after all of them succeed.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::composer::{build_record, Calibration, ClassificationOutcome, ResultComposer};
use super::errors::AnalysisError;
use crate::classifier::{ClassificationError, TongueClassifier};
use crate::config::AppConfig;
use crate::models::ScanRecord;
use crate::storage::ScanStore;
use crate::vision::{load_image, Preprocessor};

/// Outcome of a successful analysis together with the stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub outcome: ClassificationOutcome,
    pub record: ScanRecord,
}

#[derive(Clone)]
pub struct Analyzer {
    preprocessor: Preprocessor,
    classifier: Arc<TongueClassifier>,
    composer: ResultComposer,
    store: Arc<dyn ScanStore>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("preprocessor", &self.preprocessor)
            .field("classifier", &self.classifier)
            .field("composer", &self.composer)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(
        preprocessor: Preprocessor,
        classifier: Arc<TongueClassifier>,
        composer: ResultComposer,
        store: Arc<dyn ScanStore>,
    ) -> Self {
        Self {
            preprocessor,
            classifier,
            composer,
            store,
        }
    }

    /// Wire up the ONNX classifier and composer described by `config`
    pub fn from_config(config: &AppConfig, store: Arc<dyn ScanStore>) -> Self {
        let preprocessor = Preprocessor::new(config.model.input_size, config.model.normalization);
        let classifier = Arc::new(TongueClassifier::from_config(&config.model));
        let composer = ResultComposer::new(
            config.model.labels.clone(),
            Calibration::from(&config.calibration),
        );
        Self::new(preprocessor, classifier, composer, store)
    }

    pub fn classifier(&self) -> &Arc<TongueClassifier> {
        &self.classifier
    }

    pub fn composer(&self) -> &ResultComposer {
        &self.composer
    }

    pub fn store(&self) -> &Arc<dyn ScanStore> {
        &self.store
    }

    /// Run the CPU bound stages on the calling thread, without persisting
    pub fn infer(&self, image: &DynamicImage) -> Result<ClassificationOutcome, AnalysisError> {
        let started = Instant::now();
        let tensor = self.preprocessor.preprocess(image)?;
        let logits = self.classifier.classify(tensor)?;
        let outcome = self.composer.compose(&logits)?;
        info!(
            "🔍 Classified as {} ({:.1}%{}) in {} ms",
            outcome.label,
            outcome.probability * 100.0,
            if outcome.calibrated { ", calibrated" } else { "" },
            started.elapsed().as_millis()
        );
        Ok(outcome)
    }

    /// Analyze `image` captured at `image_path` and persist the result
    pub async fn analyze(
        &self,
        image_path: impl Into<String>,
        image: DynamicImage,
    ) -> Result<AnalysisReport, AnalysisError> {
        let image_path = image_path.into();
        let timestamp = chrono::Utc::now().timestamp_millis();

        let worker = self.clone();
        let outcome = tokio::task::spawn_blocking(move || worker.infer(&image))
            .await
            .map_err(|e| ClassificationError::Worker(e.to_string()))?
            .map_err(|e| {
                error!("❌ Analysis of {} failed: {}", image_path, e);
                e
            })?;

        let record = build_record(&outcome, image_path, timestamp);
        let id = self.store.insert(record.clone()).await.map_err(|e| {
            error!("❌ Failed to save scan {}: {}", record.id, e);
            AnalysisError::from(e)
        })?;
        info!("✅ Scan {} saved ({})", id, record.overall_health);

        Ok(AnalysisReport { outcome, record })
    }

    /// Load `path` from disk (with orientation correction) and analyze it
    pub async fn analyze_path(
        &self,
        path: &Path,
        max_load_width: u32,
    ) -> Result<AnalysisReport, AnalysisError> {
        let owned = path.to_path_buf();
        let (image, _info) =
            tokio::task::spawn_blocking(move || load_image(&owned, max_load_width))
                .await
                .map_err(|e| ClassificationError::Worker(e.to_string()))??;
        self.analyze(path.display().to_string(), image).await
    }
}
