//! Per-tier module cache with resolve-once semantics.
//!
//! Each name owns a slot guarded by its own mutex. The first caller holds the
//! slot lock while it loads; concurrent callers for the same name block on
//! that lock and then read the stored module. Other names are unaffected.
//! Failed loads leave the slot empty, so the next caller retries. An empty
//! slot is dropped from the map only when no other caller holds it; a waiter
//! that loads successfully after a failure keeps its module cached.

use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use dashmap::DashMap;
use tenantry_core::error::Result;

use super::ResolvedModule;

type Slot = Arc<Mutex<Option<Arc<ResolvedModule>>>>;

#[derive(Debug, Default)]
pub struct ModuleCache {
    slots: DashMap<String, Slot>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_resolve<F>(&self, name: &str, load: F) -> Result<Arc<ResolvedModule>>
    where
        F: FnOnce() -> Result<Arc<ResolvedModule>>,
    {
        // Clone the slot out so the map shard is not locked while loading.
        let slot: Slot = self
            .slots
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();

        let outcome = {
            // A poisoned slot only means a loader panicked before storing.
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(module) = guard.as_ref() {
                return Ok(Arc::clone(module));
            }
            let outcome = load();
            if let Ok(module) = &outcome {
                *guard = Some(Arc::clone(module));
            }
            outcome
        };

        if outcome.is_err() {
            self.slots
                .remove_if(name, |_, s| Arc::ptr_eq(s, &slot) && slot_is_vacant(s));
        }
        outcome
    }

    /// Already-resolved module, without loading.
    pub fn get(&self, name: &str) -> Option<Arc<ResolvedModule>> {
        let slot = self.slots.get(name)?.value().clone();
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Number of names with a stored module.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| {
                s.value()
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Empty and not held by another caller. Never blocks: the map shard is
/// locked while this runs.
fn slot_is_vacant(slot: &Slot) -> bool {
    match slot.try_lock() {
        Ok(guard) => guard.is_none(),
        Err(TryLockError::Poisoned(p)) => p.into_inner().is_none(),
        Err(TryLockError::WouldBlock) => false,
    }
}
