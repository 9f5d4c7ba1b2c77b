// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Background analysis with observable state
//!
//! `submit` spawns one task per request and hands back a oneshot receiver
//! that fires exactly once when the pipeline finishes. Progress is also
//! published on a watch channel: `None` while idle, then `Loading`, then
//! `Success` or `Error`. Dropping the receiver does not cancel the task;
//! the record is still saved and the result is discarded.

use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use super::errors::AnalysisError;
use super::pipeline::{AnalysisReport, Analyzer};

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Loading,
    Success(AnalysisReport),
    Error { message: String, code: &'static str },
}

impl AnalysisState {
    pub fn from_result(result: &Result<AnalysisReport, AnalysisError>) -> Self {
        match result {
            Ok(report) => AnalysisState::Success(report.clone()),
            Err(e) => AnalysisState::Error {
                message: e.user_message(),
                code: e.error_code(),
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading)
    }
}

pub struct AnalysisService {
    analyzer: Arc<Analyzer>,
    state: Arc<watch::Sender<Option<AnalysisState>>>,
}

impl AnalysisService {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            analyzer,
            state: Arc::new(state),
        }
    }

    pub fn analyzer(&self) -> &Arc<Analyzer> {
        &self.analyzer
    }

    /// Receiver for state changes; starts at the current state
    pub fn subscribe(&self) -> watch::Receiver<Option<AnalysisState>> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> Option<AnalysisState> {
        self.state.borrow().clone()
    }

    /// Back to idle
    pub fn reset(&self) {
        self.state.send_replace(None);
    }

    /// Start analyzing `image` in the background
    pub fn submit(
        &self,
        image_path: impl Into<String>,
        image: DynamicImage,
    ) -> oneshot::Receiver<Result<AnalysisReport, AnalysisError>> {
        let image_path = image_path.into();
        let (tx, rx) = oneshot::channel();
        let analyzer = self.analyzer.clone();
        let state = self.state.clone();

        self.state.send_replace(Some(AnalysisState::Loading));
        debug!("Submitted analysis for {}", image_path);

        tokio::spawn(async move {
            let result = analyzer.analyze(image_path.clone(), image).await;
            state.send_replace(Some(AnalysisState::from_result(&result)));
            if tx.send(result).is_err() {
                warn!(
                    "⚠️ Result for {} discarded: receiver dropped before completion",
                    image_path
                );
            }
        });

        rx
    }
}
