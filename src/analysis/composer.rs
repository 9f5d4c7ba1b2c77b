// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Turns raw logits into a calibrated outcome and a persistable record

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::labels::{condition_for, health_status_for, DEFAULT_AFFECTED_AREA};
use crate::classifier::ClassificationError;
use crate::config::CalibrationConfig;
use crate::models::{ConditionDetection, HealthStatus, ScanRecord};

/// Numerically stable softmax (subtracts the max logit first)
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelProbability {
    pub label: String,
    pub probability: f32,
}

/// Near-tie rule that prefers the healthy label
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub healthy_label: String,
    pub min_healthy_probability: f32,
    pub margin: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::from(&CalibrationConfig::default())
    }
}

impl From<&CalibrationConfig> for Calibration {
    fn from(config: &CalibrationConfig) -> Self {
        Self {
            healthy_label: config.healthy_label.clone(),
            min_healthy_probability: config.min_healthy_probability,
            margin: config.margin,
        }
    }
}

impl Calibration {
    /// Whether a healthy probability should replace the provisional top one
    pub fn overrides(&self, healthy: f32, top: f32) -> bool {
        healthy >= self.min_healthy_probability && healthy + self.margin >= top
    }
}

/// Result of one classification after calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub label: String,
    /// Reported confidence (0.0-1.0)
    pub probability: f32,
    pub health_status: HealthStatus,
    /// Every label with its softmax probability, in model order
    pub probabilities: Vec<LabelProbability>,
    /// True when the healthy override replaced the provisional top label
    pub calibrated: bool,
}

impl ClassificationOutcome {
    /// Probabilities sorted by descending value (model order among ties)
    pub fn sorted_probabilities(&self) -> Vec<LabelProbability> {
        let mut sorted = self.probabilities.clone();
        sorted.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        sorted
    }

    /// Lines like `1. healthy 87.5%` for the `k` most likely labels
    pub fn format_top_k(&self, k: usize) -> String {
        self.sorted_probabilities()
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, entry)| {
                format!("{}. {} {:.1}%", i + 1, entry.label, entry.probability * 100.0)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Softmax, calibration and content lookup over a fixed label set
#[derive(Debug, Clone)]
pub struct ResultComposer {
    labels: Vec<String>,
    calibration: Calibration,
}

impl ResultComposer {
    pub fn new(labels: Vec<String>, calibration: Calibration) -> Self {
        Self {
            labels,
            calibration,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Compose an outcome from raw model logits
    pub fn compose(&self, logits: &[f32]) -> Result<ClassificationOutcome, ClassificationError> {
        self.check_scores(logits)?;
        self.compose_probabilities(&softmax(logits))
    }

    /// Compose an outcome from probabilities that were already normalized
    pub fn compose_probabilities(
        &self,
        probabilities: &[f32],
    ) -> Result<ClassificationOutcome, ClassificationError> {
        self.check_scores(probabilities)?;

        // First index wins ties
        let mut top = 0;
        for (i, &p) in probabilities.iter().enumerate().skip(1) {
            if p > probabilities[top] {
                top = i;
            }
        }

        let mut index = top;
        let mut calibrated = false;
        if let Some(healthy) = self
            .labels
            .iter()
            .position(|label| *label == self.calibration.healthy_label)
        {
            if healthy != top
                && self
                    .calibration
                    .overrides(probabilities[healthy], probabilities[top])
            {
                debug!(
                    "Calibration override: {} ({:.3}) -> {} ({:.3})",
                    self.labels[top], probabilities[top], self.labels[healthy], probabilities[healthy]
                );
                index = healthy;
                calibrated = true;
            }
        }

        let label = self.labels[index].clone();
        let probability = probabilities[index].clamp(0.0, 1.0);
        let health_status = health_status_for(&label, probability);

        Ok(ClassificationOutcome {
            label,
            probability,
            health_status,
            probabilities: self
                .labels
                .iter()
                .zip(probabilities)
                .map(|(label, &probability)| LabelProbability {
                    label: label.clone(),
                    probability,
                })
                .collect(),
            calibrated,
        })
    }

    fn check_scores(&self, scores: &[f32]) -> Result<(), ClassificationError> {
        if scores.is_empty() || scores.len() != self.labels.len() {
            return Err(ClassificationError::OutputLength {
                expected: self.labels.len(),
                actual: scores.len(),
            });
        }
        if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
            return Err(ClassificationError::NonFiniteOutput { index });
        }
        Ok(())
    }
}

/// Record for a completed analysis: fresh id, one detection, no notes
pub fn build_record(
    outcome: &ClassificationOutcome,
    image_path: impl Into<String>,
    timestamp: i64,
) -> ScanRecord {
    ScanRecord {
        id: uuid::Uuid::new_v4().to_string(),
        image_path: image_path.into(),
        timestamp,
        detected_conditions: vec![ConditionDetection {
            label: outcome.label.clone(),
            condition: condition_for(&outcome.label),
            probability: outcome.probability,
            affected_areas: vec![DEFAULT_AFFECTED_AREA.to_string()],
        }],
        overall_health: outcome.health_status,
        confidence_score: outcome.probability,
        notes: None,
    }
}
