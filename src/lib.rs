// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod models;
pub mod storage;
pub mod utils;
pub mod version;
pub mod vision;

pub use analysis::{
    AnalysisError, AnalysisReport, AnalysisService, AnalysisState, Analyzer,
    ClassificationOutcome, ResultComposer,
};
pub use classifier::{InferenceBackend, ModelLoader, TongueClassifier};
pub use config::AppConfig;
pub use models::{HealthStatus, ScanRecord, UserProfile};
pub use storage::{InMemoryScanStore, JsonFileScanStore, PersistenceError, ScanStore};
pub use vision::{DecodeError, Preprocessor};
