// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Durability of the JSON file scan store

use licky_scan::models::{HealthStatus, ScanRecord};
use licky_scan::storage::{JsonFileScanStore, PersistenceError, ScanStore};

use super::test_scan_store::{record, record_at};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("scan_results.json");

        let store = JsonFileScanStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_results.json");

        let first = record_at(1_000, &[0.9, 0.025, 0.025, 0.025, 0.025]);
        let second = record(2_000);
        {
            let store = JsonFileScanStore::open(&path).await.unwrap();
            store.insert(first.clone()).await.unwrap();
            store.insert(second.clone()).await.unwrap();
            store
                .update_notes(&first.id, Some("after coffee".to_string()))
                .await
                .unwrap();
        }

        let reopened = JsonFileScanStore::open(&path).await.unwrap();
        let all = reopened.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], second);
        assert_eq!(all[1].id, first.id);
        assert_eq!(all[1].notes.as_deref(), Some("after coffee"));
        assert_eq!(all[1].overall_health, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_file_is_json_array_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_results.json");
        let store = JsonFileScanStore::open(&path).await.unwrap();
        store.insert(record(1)).await.unwrap();
        store.insert(record(3)).await.unwrap();
        store.insert(record(2)).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let on_disk: Vec<ScanRecord> = serde_json::from_str(&raw).unwrap();
        let timestamps: Vec<i64> = on_disk.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![3, 2, 1]);
        assert!(raw.contains("\"overall_health\": \"MODERATE_CONCERNS\""));
    }

    #[tokio::test]
    async fn test_delete_and_clear_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_results.json");
        let keep = record(1);
        let gone = record(2);
        {
            let store = JsonFileScanStore::open(&path).await.unwrap();
            store.insert(keep.clone()).await.unwrap();
            store.insert(gone.clone()).await.unwrap();
            store.delete(&gone).await.unwrap();
        }
        let store = JsonFileScanStore::open(&path).await.unwrap();
        assert_eq!(store.get_all().await.unwrap(), vec![keep]);

        store.delete_all().await.unwrap();
        let store = JsonFileScanStore::open(&path).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_results.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileScanStore::open(&path).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan_results.json");
        let store = JsonFileScanStore::open(&path).await.unwrap();

        // A non-empty directory at the target path makes the rename fail
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        let err = store.insert(record(1)).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
