// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scan record storage
//!
//! [`ScanStore`] is the async persistence seam used by the analysis
//! pipeline. [`InMemoryScanStore`] keeps records in a map and tracks lookup
//! statistics.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::errors::PersistenceError;
use crate::models::ScanRecord;

#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Insert or replace a record keyed by its id; returns the id
    async fn insert(&self, record: ScanRecord) -> Result<String, PersistenceError>;

    /// Replace an existing record; fails with `NotFound` if absent
    async fn update(&self, record: ScanRecord) -> Result<(), PersistenceError>;

    /// Remove a record; returns whether it was present
    async fn delete(&self, record: &ScanRecord) -> Result<bool, PersistenceError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<ScanRecord>, PersistenceError>;

    /// All records, newest first
    async fn get_all(&self) -> Result<Vec<ScanRecord>, PersistenceError>;

    /// At most `limit` records, newest first
    async fn get_recent(&self, limit: usize) -> Result<Vec<ScanRecord>, PersistenceError>;

    async fn count(&self) -> Result<usize, PersistenceError>;

    async fn delete_all(&self) -> Result<(), PersistenceError>;

    /// Replace the notes on a stored record and return the updated record
    async fn update_notes(
        &self,
        id: &str,
        notes: Option<String>,
    ) -> Result<ScanRecord, PersistenceError> {
        let mut record = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        record.notes = notes;
        // A record deleted since the read stays deleted
        self.update(record.clone()).await?;
        Ok(record)
    }
}

/// Order records newest first; equal timestamps fall back to id order
pub fn sort_newest_first(records: &mut [ScanRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}

pub(crate) fn newest_first<'a>(
    records: impl Iterator<Item = &'a ScanRecord>,
    limit: Option<usize>,
) -> Vec<ScanRecord> {
    let mut all: Vec<ScanRecord> = records.cloned().collect();
    sort_newest_first(&mut all);
    if let Some(limit) = limit {
        all.truncate(limit);
    }
    all
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStoreStats {
    pub total_records: usize,
    pub inserts: u64,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryScanStore {
    records: Arc<RwLock<HashMap<String, ScanRecord>>>,
    stats: Arc<RwLock<ScanStoreStats>>,
}

impl InMemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_stats(&self) -> ScanStoreStats {
        self.stats.read().await.clone()
    }
}

#[async_trait]
impl ScanStore for InMemoryScanStore {
    async fn insert(&self, record: ScanRecord) -> Result<String, PersistenceError> {
        let id = record.id.clone();
        let mut records = self.records.write().await;
        records.insert(id.clone(), record);

        let mut stats = self.stats.write().await;
        stats.total_records = records.len();
        stats.inserts += 1;

        debug!("📥 Stored scan {}", id);
        Ok(id)
    }

    async fn update(&self, record: ScanRecord) -> Result<(), PersistenceError> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(PersistenceError::NotFound(record.id)),
        }
    }

    async fn delete(&self, record: &ScanRecord) -> Result<bool, PersistenceError> {
        let mut records = self.records.write().await;
        let removed = records.remove(&record.id).is_some();
        self.stats.write().await.total_records = records.len();
        if !removed {
            warn!("⚠️ No scan to delete with id {}", record.id);
        }
        Ok(removed)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ScanRecord>, PersistenceError> {
        let found = self.records.read().await.get(id).cloned();

        let mut stats = self.stats.write().await;
        if found.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<ScanRecord>, PersistenceError> {
        Ok(newest_first(self.records.read().await.values(), None))
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<ScanRecord>, PersistenceError> {
        Ok(newest_first(self.records.read().await.values(), Some(limit)))
    }

    async fn count(&self) -> Result<usize, PersistenceError> {
        Ok(self.records.read().await.len())
    }

    async fn delete_all(&self) -> Result<(), PersistenceError> {
        info!("🧹 Clearing all scans from store");
        self.records.write().await.clear();
        self.stats.write().await.total_records = 0;
        Ok(())
    }
}
