//! Persisted open/closed state of sections, keyed by raw header text

use std::collections::HashMap;
use tracing::debug;

use crate::storage::{PersistSlot, SharedStore};

#[derive(Debug)]
pub struct CollapseStateStore {
    open: HashMap<String, bool>,
    slot: PersistSlot,
}

impl CollapseStateStore {
    /// Load the map stored under `key`; a missing or corrupt blob starts empty
    pub fn load(store: SharedStore, key: &str) -> Self {
        let slot = PersistSlot::new(store, key);
        let open: HashMap<String, bool> = slot.load();
        debug!(key, section_count = open.len(), "Loaded collapse state");
        CollapseStateStore { open, slot }
    }

    /// Unseen sections start closed
    pub fn is_open(&self, key: &str) -> bool {
        self.open.get(key).copied().unwrap_or(false)
    }

    pub fn set_open(&mut self, key: &str, open: bool) {
        self.open.insert(key.to_string(), open);
        self.save();
    }

    /// Flip and return the new state
    pub fn toggle(&mut self, key: &str) -> bool {
        let next = !self.is_open(key);
        self.set_open(key, next);
        next
    }

    pub fn open_all<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_many(keys, true);
    }

    pub fn close_all<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_many(keys, false);
    }

    /// True when writes stopped reaching storage for this session
    pub fn is_memory_only(&self) -> bool {
        self.slot.is_degraded()
    }

    fn set_many<I, S>(&mut self, keys: I, open: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.open.insert(key.into(), open);
        }
        self.save();
    }

    fn save(&mut self) {
        // Failures flip the slot to memory-only and are logged there
        let _ = self.slot.save(&self.open);
    }
}
