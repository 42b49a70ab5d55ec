//! Lazily-loaded, process-lifetime OCR engine.
//!
//! Loading a recognition model is expensive, so the front ends hold one
//! `EngineHandle` for as long as they run and share the engine it builds on
//! first use. Nothing evicts the engine except an explicit [`EngineHandle::reset`].

use std::sync::{Arc, Mutex, MutexGuard};

use crate::recognizer::{OcrBackend, OcrError};

type Factory = dyn Fn() -> Result<Arc<dyn OcrBackend>, OcrError> + Send + Sync;

pub struct EngineHandle {
    factory: Box<Factory>,
    slot: Mutex<Option<Arc<dyn OcrBackend>>>,
}

impl EngineHandle {
    /// The factory runs on the first [`get`](Self::get) and again after each reset.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn OcrBackend>, OcrError> + Send + Sync + 'static,
    {
        Self { factory: Box::new(factory), slot: Mutex::new(None) }
    }

    /// A handle that always hands out `backend`. Reset is a no-op in practice.
    pub fn preloaded(backend: Arc<dyn OcrBackend>) -> Self {
        let for_factory = Arc::clone(&backend);
        Self {
            factory: Box::new(move || Ok(Arc::clone(&for_factory))),
            slot: Mutex::new(Some(backend)),
        }
    }

    /// Return the cached engine, building it if necessary.
    ///
    /// A failed build leaves the slot empty so the next call tries again.
    pub fn get(&self) -> Result<Arc<dyn OcrBackend>, OcrError> {
        let mut slot = self.lock();
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }
        tracing::info!("Loading OCR engine");
        let engine = (self.factory)()?;
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// Drop the cached engine; the next `get` reloads it.
    pub fn reset(&self) {
        if self.lock().take().is_some() {
            tracing::info!("OCR engine cache cleared");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn OcrBackend>>> {
        // A panic inside the factory can't leave the slot half-written.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").field("loaded", &self.is_loaded()).finish()
    }
}
