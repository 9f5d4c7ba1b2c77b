// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scan record types persisted after every successful tongue analysis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overall health reading attached to a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    MildConcerns,
    ModerateConcerns,
    SevereConcerns,
    Unknown,
}

impl HealthStatus {
    /// All statuses, mildest first
    pub const ALL: [HealthStatus; 5] = [
        HealthStatus::Healthy,
        HealthStatus::MildConcerns,
        HealthStatus::ModerateConcerns,
        HealthStatus::SevereConcerns,
        HealthStatus::Unknown,
    ];

    /// Stable storage name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::MildConcerns => "MILD_CONCERNS",
            HealthStatus::ModerateConcerns => "MODERATE_CONCERNS",
            HealthStatus::SevereConcerns => "SEVERE_CONCERNS",
            HealthStatus::Unknown => "UNKNOWN",
        }
    }

    /// Human readable label for terminal output
    pub fn display_name(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::MildConcerns => "Mild concerns",
            HealthStatus::ModerateConcerns => "Moderate concerns",
            HealthStatus::SevereConcerns => "Severe concerns",
            HealthStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HealthStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown health status: {}", s))
    }
}

/// Descriptive content for a classified condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub recommendations: Vec<String>,
}

/// One detected condition inside a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDetection {
    /// Label the classifier produced (e.g. "OSCC_Cancer")
    pub label: String,
    pub condition: Condition,
    /// Calibrated probability (0.0-1.0)
    pub probability: f32,
    #[serde(default)]
    pub affected_areas: Vec<String>,
}

/// Persisted outcome of one completed analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub image_path: String,
    /// Capture time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub detected_conditions: Vec<ConditionDetection>,
    pub overall_health: HealthStatus,
    pub confidence_score: f32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ScanRecord {
    /// The primary (first) detection, if any
    pub fn primary_detection(&self) -> Option<&ConditionDetection> {
        self.detected_conditions.first()
    }

    /// Copy of this record with new notes
    pub fn with_notes(&self, notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..self.clone()
        }
    }
}
