// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single user profile storage

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;

use super::errors::PersistenceError;
use super::json_store::{read_json_file, write_file_atomic};
use crate::models::UserProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self) -> Result<Option<UserProfile>, PersistenceError>;

    /// Store `user`, replacing any existing profile
    async fn upsert(&self, user: UserProfile) -> Result<(), PersistenceError>;

    /// Replace the stored profile; fails with `NoProfile` if there is none
    async fn update(&self, user: UserProfile) -> Result<(), PersistenceError>;

    /// Remove the profile; returns whether one was stored
    async fn delete(&self) -> Result<bool, PersistenceError>;
}

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    user: RwLock<Option<UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self) -> Result<Option<UserProfile>, PersistenceError> {
        Ok(self.user.read().await.clone())
    }

    async fn upsert(&self, user: UserProfile) -> Result<(), PersistenceError> {
        *self.user.write().await = Some(user);
        Ok(())
    }

    async fn update(&self, user: UserProfile) -> Result<(), PersistenceError> {
        let mut slot = self.user.write().await;
        if slot.is_none() {
            return Err(PersistenceError::NoProfile);
        }
        *slot = Some(user);
        Ok(())
    }

    async fn delete(&self) -> Result<bool, PersistenceError> {
        Ok(self.user.write().await.take().is_some())
    }
}

/// Profile kept in a JSON file; a missing file means no profile
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, user: &UserProfile) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(user)?;
        write_file_atomic(&self.path, bytes).await?;
        info!("💾 Saved profile for {}", user.name);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn get(&self) -> Result<Option<UserProfile>, PersistenceError> {
        let _guard = self.lock.read().await;
        read_json_file(&self.path).await
    }

    async fn upsert(&self, user: UserProfile) -> Result<(), PersistenceError> {
        let _guard = self.lock.write().await;
        self.write(&user).await
    }

    async fn update(&self, user: UserProfile) -> Result<(), PersistenceError> {
        let _guard = self.lock.write().await;
        let existing: Option<UserProfile> = read_json_file(&self.path).await?;
        if existing.is_none() {
            return Err(PersistenceError::NoProfile);
        }
        self.write(&user).await
    }

    async fn delete(&self) -> Result<bool, PersistenceError> {
        let _guard = self.lock.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PersistenceError::io(&self.path, e)),
        }
    }
}
