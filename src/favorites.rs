//! Favorites - an ordered set of leaf ids, persisted as a JSON array
//!
//! Insertion order is the display order. Favorites are independent of the
//! folder structure: moving or un-filing an item does not touch them.

use tracing::debug;

use crate::folders::LeafId;
use crate::storage::{PersistSlot, SharedStore};

#[derive(Debug)]
pub struct FavoritesStore<I> {
    ids: Vec<I>,
    slot: PersistSlot,
}

impl<I: LeafId> FavoritesStore<I> {
    /// Load the array stored under `key`, dropping duplicate ids
    pub fn load(store: SharedStore, key: &str) -> Self {
        let slot = PersistSlot::new(store, key);
        let raw: Vec<I> = slot.load();
        let mut ids: Vec<I> = Vec::with_capacity(raw.len());
        for id in raw {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        debug!(key, favorite_count = ids.len(), "Loaded favorites");
        FavoritesStore { ids, slot }
    }

    pub fn is_favorite(&self, id: &I) -> bool {
        self.ids.contains(id)
    }

    /// Add or remove `id`; returns whether it is a favorite afterwards
    pub fn toggle(&mut self, id: &I) -> bool {
        let now_favorite = match self.ids.iter().position(|existing| existing == id) {
            Some(index) => {
                self.ids.remove(index);
                false
            }
            None => {
                self.ids.push(id.clone());
                true
            }
        };
        let _ = self.slot.save(&self.ids);
        now_favorite
    }

    /// Remove `id` if present, e.g. when the host deleted the item
    pub fn remove(&mut self, id: &I) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        let removed = self.ids.len() != before;
        if removed {
            let _ = self.slot.save(&self.ids);
        }
        removed
    }

    /// Favorites in insertion order
    pub fn list(&self) -> &[I] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
