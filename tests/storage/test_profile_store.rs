// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-profile semantics of the JSON profile store

use licky_scan::models::{Gender, UserProfile};
use licky_scan::storage::{JsonProfileStore, PersistenceError, ProfileStore};

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        let mut user = UserProfile::new("Ana Silva", "ana@example.com");
        user.age = Some(34);
        user.gender = Some(Gender::Female);
        user
    }

    #[tokio::test]
    async fn test_empty_store_has_no_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path().join("user.json"));

        assert!(store.get().await.unwrap().is_none());
        assert!(!store.delete().await.unwrap());

        let err = store.update(profile()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NoProfile));
    }

    #[tokio::test]
    async fn test_upsert_update_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        let user = profile();

        let store = JsonProfileStore::new(&path);
        store.upsert(user.clone()).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(user.clone()));

        let mut changed = user.clone();
        changed.profile_image_path = Some("/captures/me.jpg".to_string());
        store.update(changed.clone()).await.unwrap();

        let reloaded = JsonProfileStore::new(&path);
        assert_eq!(reloaded.get().await.unwrap(), Some(changed));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProfileStore::new(dir.path().join("user.json"));

        store.upsert(profile()).await.unwrap();
        let other = UserProfile::new("Ben", "ben@example.com");
        store.upsert(other.clone()).await.unwrap();

        assert_eq!(store.get().await.unwrap(), Some(other));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        let store = JsonProfileStore::new(&path);

        store.upsert(profile()).await.unwrap();
        assert!(path.exists());
        assert!(store.delete().await.unwrap());
        assert!(!path.exists());
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        std::fs::write(&path, "[]").unwrap();

        let err = JsonProfileStore::new(&path).get().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Corrupt { .. }));
    }
}
