//! Virtual folder store, one instance per leaf universe
//!
//! All operations run against the in-memory [`VirtualFileSystem`] and write
//! it through to storage after every mutation. Mutations that name an
//! unknown folder or item are no-ops, not errors.

use chrono::Utc;
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::{debug, info, instrument, warn};

use super::model::*;
use crate::error::{OrganizerError, Result};
use crate::favorites::FavoritesStore;
use crate::search::{self, SearchDoc};
use crate::storage::{PersistSlot, SharedStore};

const DEFAULT_FOLDER_NAME: &str = "New Folder";

#[derive(Debug)]
pub struct VirtualFolderStore<U: LeafUniverse> {
    vfs: VirtualFileSystem<U::Id>,
    slot: PersistSlot,
    _universe: PhantomData<U>,
}

impl<U: LeafUniverse> VirtualFolderStore<U> {
    /// Load the universe's blob under its default key
    pub fn load(store: SharedStore) -> Self {
        Self::load_with_key(store, U::FOLDERS_KEY)
    }

    #[instrument(name = "vfs_load", skip(store), fields(universe = U::LABEL))]
    pub fn load_with_key(store: SharedStore, key: &str) -> Self {
        let slot = PersistSlot::new(store, key);
        let mut vfs: VirtualFileSystem<U::Id> = slot.load();
        let repaired = repair_hierarchy(&mut vfs);
        if repaired > 0 {
            warn!(repaired, "Re-rooted folders with missing or cyclic parents");
        }
        info!(
            folder_count = vfs.folders.len(),
            item_count = vfs.items.len(),
            "Loaded virtual folders"
        );
        VirtualFolderStore {
            vfs,
            slot,
            _universe: PhantomData,
        }
    }

    pub fn vfs(&self) -> &VirtualFileSystem<U::Id> {
        &self.vfs
    }

    pub fn is_memory_only(&self) -> bool {
        self.slot.is_degraded()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn folder(&self, id: &str) -> Option<&FolderRecord> {
        self.vfs.folders.get(id)
    }

    pub fn folders(&self) -> impl Iterator<Item = &FolderRecord> {
        self.vfs.folders.values()
    }

    /// `"root"` or a stored folder id
    pub fn folder_exists(&self, id: &str) -> bool {
        id == ROOT_FOLDER_ID || self.vfs.folders.contains_key(id)
    }

    /// Folder chain from the top level down to `id` (inclusive).
    /// Empty for root or an unknown id.
    pub fn ancestors(&self, id: &str) -> Vec<&FolderRecord> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = id;
        while let Some(folder) = self.vfs.folders.get(cursor) {
            if !seen.insert(folder.id.as_str()) {
                break;
            }
            chain.push(folder);
            cursor = &folder.parent_id;
        }
        chain.reverse();
        chain
    }

    pub fn subfolder_ids(&self, parent_id: &str) -> Vec<&str> {
        self.vfs
            .folders
            .values()
            .filter(|f| f.parent_id == parent_id)
            .map(|f| f.id.as_str())
            .collect()
    }

    pub fn item_metadata(&self, item_id: &U::Id) -> Option<&ItemMetadata> {
        self.vfs.items.get(item_id)
    }

    /// Folder the item is shown in; `"root"` when unassigned
    pub fn item_location(&self, item_id: &U::Id) -> &str {
        self.vfs
            .items
            .get(item_id)
            .and_then(|meta| meta.folder_id.as_deref())
            .filter(|folder_id| self.vfs.folders.contains_key(*folder_id))
            .unwrap_or(ROOT_FOLDER_ID)
    }

    /// Items assigned directly to `folder_id`
    pub fn folder_item_count(&self, folder_id: &str) -> usize {
        self.vfs
            .items
            .values()
            .filter(|meta| meta.folder_id.as_deref() == Some(folder_id))
            .count()
    }

    /// Contents of one folder, folders first, filtered and sorted per `query`.
    pub fn get_children(
        &self,
        parent_id: &str,
        query: &ChildQuery,
        catalog: &[LeafItem<U::Id>],
        favorites: &FavoritesStore<U::Id>,
    ) -> Vec<GridItem<U::Id>> {
        let mut out: Vec<GridItem<U::Id>> = Vec::new();

        for record in self.vfs.folders.values().filter(|f| f.parent_id == parent_id) {
            out.push(GridItem::Folder {
                record: record.clone(),
                item_count: self.folder_item_count(&record.id),
                subfolder_count: self.subfolder_ids(&record.id).len(),
            });
        }

        for item in catalog {
            if self.item_location(&item.id) != parent_id {
                continue;
            }
            out.push(GridItem::Item {
                id: item.id.clone(),
                name: item.name.clone(),
                folder_id: self
                    .vfs
                    .items
                    .get(&item.id)
                    .and_then(|meta| meta.folder_id.clone()),
                favorite: favorites.is_favorite(&item.id),
            });
        }

        if let Some(term) = query
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            let term = term.to_lowercase();
            out.retain(|grid| grid.name().to_lowercase().contains(&term));
        }

        match query.filter {
            FolderFilter::All => {}
            FolderFilter::Favorites => {
                out.retain(|grid| matches!(grid, GridItem::Item { favorite: true, .. }))
            }
            FolderFilter::Uncategorized => {
                out.retain(|grid| matches!(grid, GridItem::Item { folder_id: None, .. }))
            }
        }

        sort_grid(&mut out, query.sort);
        out
    }

    /// Relevance-ranked items across every folder, ignoring structure
    pub fn search_items(&self, term: &str, catalog: &[LeafItem<U::Id>]) -> Vec<LeafItem<U::Id>> {
        let corpus: Vec<SearchDoc<usize>> = catalog
            .iter()
            .enumerate()
            .map(|(idx, item)| SearchDoc::new(idx, item.name.clone()))
            .collect();
        search::search(&corpus, term)
            .into_iter()
            .map(|hit| catalog[hit.id].clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn create_folder(&mut self, name: &str, parent_id: &str) -> Result<FolderRecord> {
        if !self.folder_exists(parent_id) {
            return Err(OrganizerError::UnknownParent(parent_id.to_string()));
        }
        let now = Utc::now();
        let name = name.trim();
        let record = FolderRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: if name.is_empty() {
                DEFAULT_FOLDER_NAME.to_string()
            } else {
                name.to_string()
            },
            parent_id: parent_id.to_string(),
            color: None,
            created_at: now,
            last_modified: now,
        };
        self.vfs.folders.insert(record.id.clone(), record.clone());
        debug!(universe = U::LABEL, folder_id = %record.id, parent_id, "Created folder");
        self.save();
        Ok(record)
    }

    /// Returns false when `id` is unknown or `new_name` is blank
    pub fn rename_folder(&mut self, id: &str, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return false;
        }
        let Some(folder) = self.vfs.folders.get_mut(id) else {
            return false;
        };
        folder.name = new_name.to_string();
        folder.last_modified = Utc::now();
        self.save();
        true
    }

    /// Returns false when `id` is unknown
    pub fn set_color(&mut self, id: &str, color: Option<&str>) -> bool {
        let Some(folder) = self.vfs.folders.get_mut(id) else {
            return false;
        };
        folder.color = color.map(str::to_string);
        folder.last_modified = Utc::now();
        self.save();
        true
    }

    /// Remove a folder. Its items move to root; its child folders become
    /// top-level folders. Returns false when `id` is unknown.
    pub fn delete_folder(&mut self, id: &str) -> bool {
        if self.vfs.folders.remove(id).is_none() {
            return false;
        }
        let now = Utc::now();

        let mut released = 0usize;
        for meta in self.vfs.items.values_mut() {
            if meta.folder_id.as_deref() == Some(id) {
                meta.folder_id = None;
                meta.last_modified = now;
                released += 1;
            }
        }

        let mut rerooted = 0usize;
        for folder in self.vfs.folders.values_mut() {
            if folder.parent_id == id {
                folder.parent_id = ROOT_FOLDER_ID.to_string();
                folder.last_modified = now;
                rerooted += 1;
            }
        }

        info!(
            universe = U::LABEL,
            folder_id = id,
            released,
            rerooted,
            "Deleted folder"
        );
        self.save();
        true
    }

    /// Assign `item_id` to `folder_id`, or to root for `None`/`"root"`.
    /// Returns false (no-op) when the target folder does not exist.
    pub fn move_item(&mut self, item_id: &U::Id, folder_id: Option<&str>) -> bool {
        let target = folder_id.filter(|f| *f != ROOT_FOLDER_ID);
        if let Some(target) = target {
            if !self.vfs.folders.contains_key(target) {
                debug!(universe = U::LABEL, item = %item_id, target, "Move to unknown folder ignored");
                return false;
            }
        }

        let now = Utc::now();
        let meta = self
            .vfs
            .items
            .entry(item_id.clone())
            .or_insert_with(|| ItemMetadata {
                folder_id: None,
                created_at: now,
                last_modified: now,
            });
        meta.folder_id = target.map(str::to_string);
        meta.last_modified = now;
        self.save();
        true
    }

    /// Reparent a folder.
    ///
    /// Unknown `folder_id` is a no-op (`Ok(false)`). Fails when the new
    /// parent does not exist or is the folder itself or one of its
    /// descendants.
    pub fn move_folder(&mut self, folder_id: &str, new_parent_id: &str) -> Result<bool> {
        if !self.vfs.folders.contains_key(folder_id) {
            return Ok(false);
        }
        if !self.folder_exists(new_parent_id) {
            return Err(OrganizerError::UnknownParent(new_parent_id.to_string()));
        }
        if self.is_self_or_descendant(new_parent_id, folder_id) {
            warn!(universe = U::LABEL, folder_id, new_parent_id, "Rejected cyclic folder move");
            return Err(OrganizerError::FolderCycle {
                folder_id: folder_id.to_string(),
                parent_id: new_parent_id.to_string(),
            });
        }

        if let Some(folder) = self.vfs.folders.get_mut(folder_id) {
            folder.parent_id = new_parent_id.to_string();
            folder.last_modified = Utc::now();
        }
        self.save();
        Ok(true)
    }

    /// Drop metadata for an item the host deleted
    pub fn forget_item(&mut self, item_id: &U::Id) -> bool {
        let removed = self.vfs.items.remove(item_id).is_some();
        if removed {
            self.save();
        }
        removed
    }

    /// Walks up from `candidate`; true if it reaches `folder_id`
    fn is_self_or_descendant(&self, candidate: &str, folder_id: &str) -> bool {
        let mut seen = HashSet::new();
        let mut cursor = candidate;
        loop {
            if cursor == folder_id {
                return true;
            }
            if cursor == ROOT_FOLDER_ID || !seen.insert(cursor) {
                return false;
            }
            match self.vfs.folders.get(cursor) {
                Some(folder) => cursor = &folder.parent_id,
                None => return false,
            }
        }
    }

    fn save(&mut self) {
        let _ = self.slot.save(&self.vfs);
    }
}

fn sort_grid<I: LeafId>(items: &mut [GridItem<I>], sort: SortOrder) {
    items.sort_by(|a, b| {
        b.is_folder()
            .cmp(&a.is_folder())
            .then_with(|| {
                let by_name = a.name().to_lowercase().cmp(&b.name().to_lowercase());
                match sort {
                    SortOrder::NameAsc => by_name,
                    SortOrder::NameDesc => by_name.reverse(),
                }
            })
            .then_with(|| a.key().cmp(b.key()))
    });
}

/// Re-root folders whose parent is missing or that sit on a parent cycle.
/// Returns how many folders were changed.
fn repair_hierarchy<I>(vfs: &mut VirtualFileSystem<I>) -> usize {
    let mut repaired = 0;

    let dangling: Vec<String> = vfs
        .folders
        .values()
        .filter(|f| f.parent_id != ROOT_FOLDER_ID && !vfs.folders.contains_key(&f.parent_id))
        .map(|f| f.id.clone())
        .collect();
    for id in dangling {
        if let Some(folder) = vfs.folders.get_mut(&id) {
            folder.parent_id = ROOT_FOLDER_ID.to_string();
            repaired += 1;
        }
    }

    // Every parent now exists, so each walk ends at root or loops
    let ids: Vec<String> = vfs.folders.keys().cloned().collect();
    for id in ids {
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor = vfs.folders[&id].parent_id.clone();
        let on_cycle = loop {
            if cursor == ROOT_FOLDER_ID {
                break false;
            }
            if cursor == id {
                break true;
            }
            if !seen.insert(cursor.clone()) {
                break false;
            }
            match vfs.folders.get(&cursor) {
                Some(folder) => cursor = folder.parent_id.clone(),
                None => break false,
            }
        };
        if on_cycle {
            if let Some(folder) = vfs.folders.get_mut(&id) {
                folder.parent_id = ROOT_FOLDER_ID.to_string();
                repaired += 1;
            }
        }
    }
    repaired
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
