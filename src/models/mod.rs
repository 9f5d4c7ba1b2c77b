// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod scan;
pub mod user;

pub use scan::{Condition, ConditionDetection, HealthStatus, ScanRecord};
pub use user::{Gender, UserProfile};
