// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for scan and profile persistence

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    /// No record with this id is stored
    #[error("Scan record not found: {0}")]
    NotFound(String),

    /// Profile update requested but no profile is stored
    #[error("No user profile stored")]
    NoProfile,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The backing file exists but is not valid JSON for this store
    #[error("Corrupt data file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend failed: {0}")]
    Backend(String),
}

impl PersistenceError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
