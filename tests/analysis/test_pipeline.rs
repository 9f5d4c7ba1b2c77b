// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end pipeline runs against the fixed-logits backend

use async_trait::async_trait;
use image::DynamicImage;
use licky_scan::analysis::AnalysisError;
use licky_scan::classifier::ClassificationError;
use licky_scan::models::{HealthStatus, ScanRecord};
use licky_scan::storage::{InMemoryScanStore, PersistenceError, ScanStore};
use licky_scan::vision::{save_jpeg, DecodeError};
use mockall::mock;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::support::{
    analyzer, analyzer_with, labels, logits_for, tongue_image, FixedLoader, MissingModelLoader,
};

mock! {
    pub Store {}

    #[async_trait]
    impl ScanStore for Store {
        async fn insert(&self, record: ScanRecord) -> Result<String, PersistenceError>;
        async fn update(&self, record: ScanRecord) -> Result<(), PersistenceError>;
        async fn delete(&self, record: &ScanRecord) -> Result<bool, PersistenceError>;
        async fn get_by_id(&self, id: &str) -> Result<Option<ScanRecord>, PersistenceError>;
        async fn get_all(&self) -> Result<Vec<ScanRecord>, PersistenceError>;
        async fn get_recent(&self, limit: usize) -> Result<Vec<ScanRecord>, PersistenceError>;
        async fn count(&self) -> Result<usize, PersistenceError>;
        async fn delete_all(&self) -> Result<(), PersistenceError>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_analyze_persists_record() {
        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer(logits_for(&[0.05, 0.05, 0.05, 0.8, 0.05]), store.clone());

        let report = analyzer
            .analyze("/captures/LICKY_1.jpg", tongue_image())
            .await
            .unwrap();

        assert_eq!(report.outcome.label, "OSCC_Cancer");
        assert_eq!(report.record.overall_health, HealthStatus::SevereConcerns);
        assert_eq!(report.record.image_path, "/captures/LICKY_1.jpg");
        assert!((report.record.confidence_score - 0.8).abs() < 1e-4);

        let stored = store.get_by_id(&report.record.id).await.unwrap().unwrap();
        assert_eq!(stored, report.record);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_model_is_loaded_once_across_analyses() {
        let store = Arc::new(InMemoryScanStore::new());
        let loader = FixedLoader::new(logits_for(&[0.9, 0.025, 0.025, 0.025, 0.025]));
        let loads = loader.loads.clone();
        let analyzer = analyzer_with(Box::new(loader), store.clone());

        for i in 0..3 {
            analyzer
                .analyze(format!("/captures/{}.jpg", i), tongue_image())
                .await
                .unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(analyzer.classifier().model().load_count(), 1);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_analyses_share_one_model() {
        let store = Arc::new(InMemoryScanStore::new());
        let loader = FixedLoader::new(logits_for(&[0.9, 0.025, 0.025, 0.025, 0.025]));
        let loads = loader.loads.clone();
        let analyzer = Arc::new(analyzer_with(Box::new(loader), store.clone()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let analyzer = analyzer.clone();
                tokio::spawn(async move {
                    analyzer
                        .analyze(format!("/captures/{}.jpg", i), tongue_image())
                        .await
                })
            })
            .collect();
        for handle in handles {
            tokio_test::assert_ok!(handle.await.unwrap());
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_missing_model_is_model_load_error() {
        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer_with(Box::new(MissingModelLoader), store.clone());

        let err = analyzer
            .analyze("/captures/a.jpg", tongue_image())
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ModelLoad(_)));
        assert_eq!(err.error_code(), "MODEL_LOAD_ERROR");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_logit_count_is_not_persisted() {
        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer(vec![0.1, 0.2, 0.3], store.clone());

        let err = analyzer
            .analyze("/captures/a.jpg", tongue_image())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Classification(ClassificationError::OutputLength {
                expected: 5,
                actual: 3
            })
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_finite_logits_are_rejected() {
        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer(vec![0.0, f32::INFINITY, 0.0, 0.0, 0.0], store.clone());

        let err = analyzer
            .analyze("/captures/a.jpg", tongue_image())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Classification(ClassificationError::NonFiniteOutput { index: 1 })
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_image_is_decode_error() {
        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer(logits_for(&[0.2; 5]), store.clone());

        let err = analyzer
            .analyze("/captures/a.jpg", DynamicImage::new_rgb8(0, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Decode(DecodeError::EmptyImage { .. })));
        assert!(err.user_message().starts_with("Analysis failed: "));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_persistence_error() {
        let mut store = MockStore::new();
        store
            .expect_insert()
            .times(1)
            .returning(|_| Err(PersistenceError::Backend("disk full".to_string())));

        let analyzer = analyzer(logits_for(&[0.9, 0.025, 0.025, 0.025, 0.025]), Arc::new(store));
        let err = analyzer
            .analyze("/captures/a.jpg", tongue_image())
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Persistence(_)));
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
        assert_eq!(err.user_message(), "Analysis failed: the result could not be saved");
    }

    #[tokio::test]
    async fn test_failed_classification_never_touches_store() {
        let mut store = MockStore::new();
        store.expect_insert().times(0);

        let analyzer = analyzer_with(Box::new(MissingModelLoader), Arc::new(store));
        assert!(analyzer
            .analyze("/captures/a.jpg", tongue_image())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_analyze_path_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tongue.jpg");
        save_jpeg(&tongue_image(), &path, 90).unwrap();

        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer(logits_for(&[0.1, 0.1, 0.6, 0.1, 0.1]), store.clone());

        let report = analyzer.analyze_path(&path, 1024).await.unwrap();
        assert_eq!(report.record.image_path, path.display().to_string());
        assert_eq!(report.outcome.label, "OPMD_Pra-Cancer");
        assert!(labels().contains(&report.outcome.label));
    }

    #[tokio::test]
    async fn test_analyze_path_missing_file() {
        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer(logits_for(&[0.2; 5]), store.clone());

        let err = analyzer
            .analyze_path(std::path::Path::new("/no/such/tongue.jpg"), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Decode(DecodeError::Io { .. })));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_released_model_fails_cleanly() {
        let store = Arc::new(InMemoryScanStore::new());
        let analyzer = analyzer(logits_for(&[0.2; 5]), store.clone());
        analyzer.analyze("/a.jpg", tongue_image()).await.unwrap();

        assert!(analyzer.classifier().release());
        let err = analyzer.analyze("/b.jpg", tongue_image()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
