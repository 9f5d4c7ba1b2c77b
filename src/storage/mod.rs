// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persistence for scan records and the user profile

pub mod errors;
pub mod json_store;
pub mod profile_store;
pub mod scan_store;

pub use errors::PersistenceError;
pub use json_store::JsonFileScanStore;
pub use profile_store::{InMemoryProfileStore, JsonProfileStore, ProfileStore};
pub use scan_store::{sort_newest_first, InMemoryScanStore, ScanStore, ScanStoreStats};
