// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Contract tests shared by every `ScanStore` implementation

use async_trait::async_trait;
use licky_scan::analysis::{build_record, Calibration, ResultComposer};
use licky_scan::config::DEFAULT_LABELS;
use licky_scan::models::ScanRecord;
use licky_scan::storage::{InMemoryScanStore, JsonFileScanStore, PersistenceError, ScanStore};

pub fn record_at(timestamp: i64, probabilities: &[f32]) -> ScanRecord {
    let composer = ResultComposer::new(
        DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        Calibration::default(),
    );
    let outcome = composer.compose_probabilities(probabilities).unwrap();
    build_record(&outcome, format!("/captures/{}.jpg", timestamp), timestamp)
}

pub fn record(timestamp: i64) -> ScanRecord {
    record_at(timestamp, &[0.1, 0.1, 0.6, 0.1, 0.1])
}

/// Serves a snapshot from `get_by_id` while the inner store may have moved on
struct StaleReadStore {
    inner: InMemoryScanStore,
    snapshot: ScanRecord,
}

#[async_trait]
impl ScanStore for StaleReadStore {
    async fn insert(&self, record: ScanRecord) -> Result<String, PersistenceError> {
        self.inner.insert(record).await
    }

    async fn update(&self, record: ScanRecord) -> Result<(), PersistenceError> {
        self.inner.update(record).await
    }

    async fn delete(&self, record: &ScanRecord) -> Result<bool, PersistenceError> {
        self.inner.delete(record).await
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<ScanRecord>, PersistenceError> {
        Ok(Some(self.snapshot.clone()))
    }

    async fn get_all(&self) -> Result<Vec<ScanRecord>, PersistenceError> {
        self.inner.get_all().await
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<ScanRecord>, PersistenceError> {
        self.inner.get_recent(limit).await
    }

    async fn count(&self) -> Result<usize, PersistenceError> {
        self.inner.count().await
    }

    async fn delete_all(&self) -> Result<(), PersistenceError> {
        self.inner.delete_all().await
    }
}

async fn check_round_trip(store: &dyn ScanStore) {
    let written = record(1_700_000_000_000).with_notes("morning scan");
    let id = store.insert(written.clone()).await.unwrap();
    assert_eq!(id, written.id);

    let read = store.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(read, written);
    assert!(store.get_by_id("unknown-id").await.unwrap().is_none());
}

async fn check_recent_bounds(store: &dyn ScanStore) {
    for ts in [3_000, 1_000, 5_000, 2_000, 4_000] {
        store.insert(record(ts)).await.unwrap();
    }

    assert!(store.get_recent(0).await.unwrap().is_empty());

    let top2: Vec<i64> = store
        .get_recent(2)
        .await
        .unwrap()
        .iter()
        .map(|r| r.timestamp)
        .collect();
    assert_eq!(top2, vec![5_000, 4_000]);

    let all: Vec<i64> = store
        .get_recent(50)
        .await
        .unwrap()
        .iter()
        .map(|r| r.timestamp)
        .collect();
    assert_eq!(all, vec![5_000, 4_000, 3_000, 2_000, 1_000]);

    let everything = store.get_all().await.unwrap();
    assert_eq!(everything.len(), 5);
    assert_eq!(everything[0].timestamp, 5_000);
}

async fn check_mutations(store: &dyn ScanStore) {
    let first = record(10);
    let second = record(20);
    store.insert(first.clone()).await.unwrap();
    store.insert(second.clone()).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);

    let mut changed = first.clone();
    changed.notes = Some("edited".to_string());
    store.update(changed.clone()).await.unwrap();
    assert_eq!(store.get_by_id(&first.id).await.unwrap(), Some(changed));

    let err = store.update(record(30)).await.unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound(_)));

    assert!(store.delete(&first).await.unwrap());
    assert!(!store.delete(&first).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);

    store.delete_all().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(store.get_all().await.unwrap().is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn json_store(dir: &tempfile::TempDir) -> JsonFileScanStore {
        JsonFileScanStore::open(dir.path().join("scan_results.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        check_round_trip(&InMemoryScanStore::new()).await;
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        check_round_trip(&json_store(&dir).await).await;
    }

    #[tokio::test]
    async fn test_in_memory_recent_bounds() {
        check_recent_bounds(&InMemoryScanStore::new()).await;
    }

    #[tokio::test]
    async fn test_json_recent_bounds() {
        let dir = tempfile::tempdir().unwrap();
        check_recent_bounds(&json_store(&dir).await).await;
    }

    #[tokio::test]
    async fn test_in_memory_mutations() {
        check_mutations(&InMemoryScanStore::new()).await;
    }

    #[tokio::test]
    async fn test_json_mutations() {
        let dir = tempfile::tempdir().unwrap();
        check_mutations(&json_store(&dir).await).await;
    }

    #[tokio::test]
    async fn test_update_notes_clears_with_none() {
        let store = InMemoryScanStore::new();
        let scan = record(1).with_notes("first");
        store.insert(scan.clone()).await.unwrap();

        let updated = store.update_notes(&scan.id, None).await.unwrap();
        assert!(updated.notes.is_none());
        assert!(store.get_by_id(&scan.id).await.unwrap().unwrap().notes.is_none());
    }

    #[tokio::test]
    async fn test_update_notes_does_not_resurrect_deleted_record() {
        let scan = record(5);
        let store = StaleReadStore {
            inner: InMemoryScanStore::new(),
            snapshot: scan.clone(),
        };
        store.insert(scan.clone()).await.unwrap();
        // Deleted after the notes edit read the record
        store.delete(&scan).await.unwrap();

        let err = store
            .update_notes(&scan.id, Some("too late".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(ref id) if *id == scan.id));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_equal_timestamps_are_ordered_by_id() {
        let store = InMemoryScanStore::new();
        let mut a = record(100);
        a.id = "a".to_string();
        let mut b = record(100);
        b.id = "b".to_string();
        store.insert(b).await.unwrap();
        store.insert(a).await.unwrap();

        let ids: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
