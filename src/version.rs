// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for licky-scan

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-tongue-classifier-2025-10-13";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-13";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "onnx-classifier",
    "lazy-model-load",
    "model-fallback-path",
    "exif-orientation",
    "healthy-calibration",
    "json-history",
    "user-profile",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("licky-scan {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Version info as JSON for `--version`-style reporting
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
