// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Lazily loaded, exclusively locked model handle
//!
//! The handle is loaded on the first `run`, reused for every later call and
//! released exactly once, either explicitly or when the owner is dropped.
//! The lock is held for the whole forward pass so only one inference runs at
//! a time.

use ndarray::Array4;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::backend::{InferenceBackend, ModelLoader};
use super::errors::{ClassificationError, ClassifierError, ModelLoadError};

pub struct LazyModel {
    loader: Box<dyn ModelLoader>,
    handle: Mutex<Option<Box<dyn InferenceBackend>>>,
    load_count: AtomicUsize,
    released: AtomicBool,
}

impl std::fmt::Debug for LazyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyModel")
            .field("loader", &self.loader.describe())
            .field("loaded", &self.is_loaded())
            .field("load_count", &self.load_count())
            .field("released", &self.released.load(Ordering::SeqCst))
            .finish()
    }
}

impl LazyModel {
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            handle: Mutex::new(None),
            load_count: AtomicUsize::new(0),
            released: AtomicBool::new(false),
        }
    }

    pub fn is_loaded(&self) -> bool {
        match self.handle.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// How many times the loader has produced a handle
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Load the model now instead of on the first run
    pub fn ensure_loaded(&self) -> Result<(), ClassifierError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| ClassificationError::LockPoisoned)?;
        self.load_into(&mut guard)?;
        Ok(())
    }

    fn load_into(
        &self,
        slot: &mut Option<Box<dyn InferenceBackend>>,
    ) -> Result<(), ModelLoadError> {
        if self.is_released() {
            return Err(ModelLoadError::Released);
        }
        if slot.is_none() {
            let started = Instant::now();
            let backend = self.loader.load()?;
            self.load_count.fetch_add(1, Ordering::SeqCst);
            info!(
                "✅ Model handle ready ({}) in {} ms",
                backend.name(),
                started.elapsed().as_millis()
            );
            *slot = Some(backend);
        }
        Ok(())
    }

    /// Run one forward pass, loading the model first if needed
    pub fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| ClassificationError::LockPoisoned)?;
        self.load_into(&mut guard)?;

        let backend = guard.as_mut().ok_or(ModelLoadError::Released)?;
        let started = Instant::now();
        let scores = backend.run(input)?;
        debug!(
            "Inference on {} took {} ms",
            backend.name(),
            started.elapsed().as_millis()
        );
        Ok(scores)
    }

    /// Drop the model handle. Returns `true` only for the call that actually
    /// released it; later runs fail with `ModelLoadError::Released`.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        let mut guard = match self.handle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("⚠️  Model lock poisoned during release");
                poisoned.into_inner()
            }
        };
        if let Some(backend) = guard.take() {
            info!("Released model handle {}", backend.name());
        }
        true
    }
}

impl Drop for LazyModel {
    fn drop(&mut self) {
        self.release();
    }
}
