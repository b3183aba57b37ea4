//! In-memory `RegistryStore` used by the service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use persona_types::error::StoreError;
use persona_types::registry::Registry;

use crate::repository::registry::RegistryStore;

/// Shared-handle store: clones see the same saved state, so a test can
/// "restart" by opening a second registry on a clone.
#[derive(Clone, Default)]
pub struct MemoryStore {
    saved: Arc<Mutex<Option<Registry>>>,
    fail_writes: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> Option<Registry> {
        self.saved.lock().unwrap().clone()
    }
}

impl RegistryStore for MemoryStore {
    async fn load(&self) -> Result<Registry, StoreError> {
        Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
    }

    async fn save(&self, registry: &Registry) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("simulated disk failure".to_string()));
        }
        *self.saved.lock().unwrap() = Some(registry.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
