// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tongue image analysis
//!
//! This module provides:
//! - The per-label content and status table
//! - Softmax, healthy-leaning calibration and record composition
//! - The async pipeline that persists successful results
//! - A background service publishing Loading/Success/Error state

pub mod composer;
pub mod errors;
pub mod labels;
pub mod pipeline;
pub mod service;

pub use composer::{
    build_record, softmax, Calibration, ClassificationOutcome, LabelProbability, ResultComposer,
};
pub use errors::AnalysisError;
pub use labels::{
    condition_for, health_status_for, profile_for, LabelProfile, StatusRule,
    DEFAULT_AFFECTED_AREA, LABEL_PROFILES, UNKNOWN_PROFILE,
};
pub use pipeline::{AnalysisReport, Analyzer};
pub use service::{AnalysisService, AnalysisState};
