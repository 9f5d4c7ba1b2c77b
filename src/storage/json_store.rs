// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! JSON file backed scan store
//!
//! The whole record set lives in memory and is rewritten after each
//! mutation. Writes go to a temp file in the same directory and are renamed
//! over the target, so a crash never leaves a half written file behind.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::errors::PersistenceError;
use super::scan_store::{newest_first, ScanStore};
use crate::models::ScanRecord;

/// Read a JSON document, treating a missing file as `None`
pub(crate) async fn read_json_file<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, PersistenceError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistenceError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| PersistenceError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Replace `path` with `bytes` via temp file + rename
pub(crate) async fn write_file_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), PersistenceError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
        tmp.write_all(&bytes)
            .map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| PersistenceError::io(&path, e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| PersistenceError::Backend(format!("write task failed: {}", e)))?
}

pub struct JsonFileScanStore {
    path: PathBuf,
    records: RwLock<HashMap<String, ScanRecord>>,
}

impl std::fmt::Debug for JsonFileScanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileScanStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonFileScanStore {
    /// Open the store at `path`; a missing file starts empty
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let records: Vec<ScanRecord> = read_json_file(&path).await?.unwrap_or_default();
        info!("📂 Opened scan store {} ({} records)", path.display(), records.len());

        Ok(Self {
            path,
            records: RwLock::new(
                records
                    .into_iter()
                    .map(|record| (record.id.clone(), record))
                    .collect(),
            ),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &HashMap<String, ScanRecord>) -> Result<(), PersistenceError> {
        let ordered = newest_first(records.values(), None);
        let bytes = serde_json::to_vec_pretty(&ordered)?;
        write_file_atomic(&self.path, bytes).await?;
        debug!("💾 Wrote {} scans to {}", ordered.len(), self.path.display());
        Ok(())
    }

    /// Apply `change` to a copy of the records, persist it, then commit it
    async fn mutate<T: Send>(
        &self,
        change: impl FnOnce(&mut HashMap<String, ScanRecord>) -> Result<T, PersistenceError> + Send,
    ) -> Result<T, PersistenceError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *records = next;
        Ok(out)
    }
}

#[async_trait]
impl ScanStore for JsonFileScanStore {
    async fn insert(&self, record: ScanRecord) -> Result<String, PersistenceError> {
        self.mutate(move |records| {
            let id = record.id.clone();
            records.insert(id.clone(), record);
            Ok(id)
        })
        .await
    }

    async fn update(&self, record: ScanRecord) -> Result<(), PersistenceError> {
        self.mutate(move |records| match records.get_mut(&record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(PersistenceError::NotFound(record.id)),
        })
        .await
    }

    async fn delete(&self, record: &ScanRecord) -> Result<bool, PersistenceError> {
        if !self.records.read().await.contains_key(&record.id) {
            return Ok(false);
        }
        let id = record.id.clone();
        self.mutate(move |records| Ok(records.remove(&id).is_some()))
            .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ScanRecord>, PersistenceError> {
        Ok(self.records.read().await.get(id).cloned())
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
        info!("🧹 Clearing all scans from {}", self.path.display());
        self.mutate(|records| {
            records.clear();
            Ok(())
        })
        .await
    }
}
