// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-label content and health-status thresholds
//!
//! Every label the classifier can emit maps to a display name, description,
//! symptom and recommendation lists, and a [`StatusRule`]. Labels outside the
//! table use [`UNKNOWN_PROFILE`] with the raw label as the display name.

use crate::models::{Condition, HealthStatus};

/// Region tag recorded for every detection
pub const DEFAULT_AFFECTED_AREA: &str = "Center";

/// Single-cutoff bucketing: `p >= cutoff` gives `at_or_above`, otherwise `below`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusRule {
    pub cutoff: f32,
    pub at_or_above: HealthStatus,
    pub below: HealthStatus,
}

impl StatusRule {
    pub const fn new(cutoff: f32, at_or_above: HealthStatus, below: HealthStatus) -> Self {
        Self {
            cutoff,
            at_or_above,
            below,
        }
    }

    /// A rule that yields `status` for every probability
    pub const fn fixed(status: HealthStatus) -> Self {
        Self::new(f32::INFINITY, status, status)
    }

    pub fn status_for(&self, probability: f32) -> HealthStatus {
        if probability >= self.cutoff {
            self.at_or_above
        } else {
            self.below
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelProfile {
    pub label: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub symptoms: &'static [&'static str],
    pub recommendations: &'static [&'static str],
    pub rule: StatusRule,
}

pub static LABEL_PROFILES: [LabelProfile; 5] = [
    LabelProfile {
        label: "healthy",
        display_name: "Healthy",
        description: "Your tongue appears healthy with normal color and texture.",
        symptoms: &["Pink color", "Uniform texture"],
        recommendations: &["Maintain oral hygiene", "Stay hydrated"],
        rule: StatusRule::new(0.7, HealthStatus::Healthy, HealthStatus::Unknown),
    },
    LabelProfile {
        label: "benign",
        display_name: "Benign Condition",
        description: "Likely a benign tongue variation with minimal health risk.",
        symptoms: &["Mild discoloration", "Localized patches"],
        recommendations: &["Monitor changes", "Avoid irritants"],
        rule: StatusRule::new(0.6, HealthStatus::MildConcerns, HealthStatus::Unknown),
    },
    LabelProfile {
        label: "OPMD_Pra-Cancer",
        display_name: "OPMD (Pre-Cancer)",
        description: "Oral potentially malignant disorder; consider clinical evaluation.",
        symptoms: &["Persistent patches", "Texture changes"],
        recommendations: &["Consult a dentist/ENT", "Avoid tobacco and alcohol"],
        rule: StatusRule::new(
            0.5,
            HealthStatus::ModerateConcerns,
            HealthStatus::MildConcerns,
        ),
    },
    LabelProfile {
        label: "OSCC_Cancer",
        display_name: "OSCC (Cancer)",
        description: "Findings suggest oral squamous cell carcinoma; seek immediate care.",
        symptoms: &["Lesions", "Ulceration", "Bleeding"],
        recommendations: &["Seek urgent specialist care", "Diagnostic biopsy recommended"],
        rule: StatusRule::new(
            0.4,
            HealthStatus::SevereConcerns,
            HealthStatus::ModerateConcerns,
        ),
    },
    LabelProfile {
        label: "Diabetes",
        display_name: "Diabetes Indicator",
        description: "Patterns that may correlate with diabetes; consider testing.",
        symptoms: &["Dryness", "Coating", "Cracks"],
        recommendations: &["Check blood glucose", "Consult physician"],
        rule: StatusRule::new(
            0.5,
            HealthStatus::ModerateConcerns,
            HealthStatus::MildConcerns,
        ),
    },
];

/// Fallback for labels not in [`LABEL_PROFILES`]; `display_name` is replaced
/// by the raw label
pub static UNKNOWN_PROFILE: LabelProfile = LabelProfile {
    label: "unknown",
    display_name: "Unknown",
    description: "Unknown condition detected.",
    symptoms: &["Unspecified"],
    recommendations: &["Consult a healthcare professional"],
    rule: StatusRule::fixed(HealthStatus::Unknown),
};

/// Table entry for `label`, if it is a known label
pub fn profile_for(label: &str) -> Option<&'static LabelProfile> {
    LABEL_PROFILES.iter().find(|profile| profile.label == label)
}

/// Descriptive content for `label`
pub fn condition_for(label: &str) -> Condition {
    let (profile, name) = match profile_for(label) {
        Some(profile) => (profile, profile.display_name.to_string()),
        None => (&UNKNOWN_PROFILE, label.to_string()),
    };

    Condition {
        name,
        description: profile.description.to_string(),
        symptoms: profile.symptoms.iter().map(|s| s.to_string()).collect(),
        recommendations: profile
            .recommendations
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

pub fn health_status_for(label: &str, probability: f32) -> HealthStatus {
    profile_for(label)
        .unwrap_or(&UNKNOWN_PROFILE)
        .rule
        .status_for(probability)
}
