//! Folder navigation and selection state for one leaf universe
//!
//! The navigator owns the universe's folder store and favorites, tracks the
//! folder being viewed, and turns user gestures (open, back, multi-select,
//! create via dialog) into store calls. Every change that reaches the store
//! is announced as `FoldersChanged` to subscribers.

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::config::OrganizerConfig;
use crate::error::{Result, ResultExt};
use crate::events::{ChangeEvent, ChangeNotifier, SubscriptionId};
use crate::favorites::FavoritesStore;
use crate::folders::{
    ChildQuery, FolderFilter, FolderRecord, GridItem, LeafItem, LeafUniverse, SortOrder,
    VirtualFolderStore, ROOT_FOLDER_ID,
};
use crate::host::Dialogs;
use crate::storage::SharedStore;

const NEW_FOLDER_PROMPT: &str = "Folder name";
const NEW_FOLDER_DEFAULT: &str = "New Folder";
const RENAME_FOLDER_PROMPT: &str = "Rename folder";

#[derive(Debug)]
pub struct FolderNavigator<U: LeafUniverse> {
    folders: VirtualFolderStore<U>,
    favorites: FavoritesStore<U::Id>,
    current: String,
    history: Vec<String>,
    query: ChildQuery,
    selection: BTreeSet<U::Id>,
    notifier: ChangeNotifier,
}

impl<U: LeafUniverse> FolderNavigator<U> {
    /// Load the universe's folders and favorites, starting at root
    pub fn load(store: SharedStore, config: &OrganizerConfig) -> Self {
        FolderNavigator {
            folders: VirtualFolderStore::load(store.clone()),
            favorites: FavoritesStore::load(store, U::FAVORITES_KEY),
            current: ROOT_FOLDER_ID.to_string(),
            history: Vec::new(),
            query: ChildQuery::new(FolderFilter::All, config.default_sort),
            selection: BTreeSet::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn store(&self) -> &VirtualFolderStore<U> {
        &self.folders
    }

    pub fn favorites(&self) -> &FavoritesStore<U::Id> {
        &self.favorites
    }

    pub fn query(&self) -> &ChildQuery {
        &self.query
    }

    pub fn on_changed<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.notifier.on_changed(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn announce(&self) {
        self.notifier
            .notify(&ChangeEvent::FoldersChanged { universe: U::LABEL });
    }

    // ------------------------------------------------------------------
    // Location
    // ------------------------------------------------------------------

    pub fn current_folder(&self) -> &str {
        &self.current
    }

    /// Folders from the top level down to the current one; empty at root
    pub fn breadcrumbs(&self) -> Vec<&FolderRecord> {
        self.folders.ancestors(&self.current)
    }

    /// Returns false for an unknown folder or the folder already shown
    pub fn open_folder(&mut self, folder_id: &str) -> bool {
        if !self.folders.folder_exists(folder_id) || folder_id == self.current {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, folder_id.to_string());
        self.history.push(previous);
        self.selection.clear();
        debug!(universe = U::LABEL, folder_id, "Opened folder");
        true
    }

    pub fn go_root(&mut self) -> bool {
        self.open_folder(ROOT_FOLDER_ID)
    }

    /// Open the parent of the current folder
    pub fn go_up(&mut self) -> bool {
        let Some(parent) = self
            .folders
            .folder(&self.current)
            .map(|f| f.parent_id.clone())
        else {
            return false;
        };
        self.open_folder(&parent)
    }

    /// Return to the previously shown folder, skipping folders deleted since
    pub fn go_back(&mut self) -> bool {
        while let Some(previous) = self.history.pop() {
            if self.folders.folder_exists(&previous) && previous != self.current {
                self.current = previous;
                self.selection.clear();
                return true;
            }
        }
        false
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    // ------------------------------------------------------------------
    // View options
    // ------------------------------------------------------------------

    /// Blank clears the search
    pub fn set_search(&mut self, term: &str) {
        let term = term.trim();
        self.query.search_term = (!term.is_empty()).then(|| term.to_string());
    }

    pub fn set_filter(&mut self, filter: FolderFilter) {
        self.query.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.sort = sort;
    }

    /// Contents of the current folder under the active view options
    pub fn visible_items(&self, catalog: &[LeafItem<U::Id>]) -> Vec<GridItem<U::Id>> {
        self.folders
            .get_children(&self.current, &self.query, catalog, &self.favorites)
    }

    pub fn toggle_favorite(&mut self, item_id: &U::Id) -> bool {
        let now_favorite = self.favorites.toggle(item_id);
        self.announce();
        now_favorite
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &BTreeSet<U::Id> {
        &self.selection
    }

    pub fn is_selected(&self, item_id: &U::Id) -> bool {
        self.selection.contains(item_id)
    }

    /// Returns whether the item is selected afterwards
    pub fn toggle_selection(&mut self, item_id: &U::Id) -> bool {
        if self.selection.remove(item_id) {
            false
        } else {
            self.selection.insert(item_id.clone());
            true
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every item currently visible (folders are not selectable)
    pub fn select_all(&mut self, catalog: &[LeafItem<U::Id>]) {
        let visible = self.visible_items(catalog);
        self.selection = visible
            .into_iter()
            .filter_map(|grid| match grid {
                GridItem::Item { id, .. } => Some(id),
                GridItem::Folder { .. } => None,
            })
            .collect();
    }

    /// Move every selected item into `folder_id` (`None` or `"root"` for
    /// root) and clear the selection. Returns how many items moved; an
    /// unknown target moves nothing and keeps the selection.
    pub fn move_selection_to(&mut self, folder_id: Option<&str>) -> usize {
        if let Some(target) = folder_id {
            if !self.folders.folder_exists(target) {
                return 0;
            }
        }
        let selected = std::mem::take(&mut self.selection);
        let mut moved = 0;
        for id in &selected {
            if self.folders.move_item(id, folder_id) {
                moved += 1;
            }
        }
        info!(universe = U::LABEL, moved, target = ?folder_id, "Moved selection");
        if moved > 0 {
            self.announce();
        }
        moved
    }

    /// Host removed an item: drop its folder assignment, favorite and selection
    pub fn forget_item(&mut self, item_id: &U::Id) {
        let unfiled = self.folders.forget_item(item_id);
        let unstarred = self.favorites.remove(item_id);
        self.selection.remove(item_id);
        if unfiled || unstarred {
            self.announce();
        }
    }

    // ------------------------------------------------------------------
    // Folder management
    // ------------------------------------------------------------------

    /// Create a folder without asking; a blank name gets the default
    pub fn add_folder(&mut self, name: &str, parent_id: &str) -> Result<FolderRecord> {
        let record = self.folders.create_folder(name, parent_id)?;
        self.announce();
        Ok(record)
    }

    /// `None` (or `"root"`) puts the item back at the top level
    pub fn move_item(&mut self, item_id: &U::Id, folder_id: Option<&str>) -> bool {
        let moved = self.folders.move_item(item_id, folder_id);
        if moved {
            self.announce();
        }
        moved
    }

    pub fn set_folder_color(&mut self, folder_id: &str, color: Option<&str>) -> bool {
        let changed = self.folders.set_color(folder_id, color);
        if changed {
            self.announce();
        }
        changed
    }

    /// Ask for a name and create a folder inside the current one.
    /// `Ok(None)` when the user cancelled.
    pub fn create_folder(&mut self, dialogs: &dyn Dialogs) -> Result<Option<FolderRecord>> {
        let Some(name) = dialogs.prompt_text(NEW_FOLDER_PROMPT, NEW_FOLDER_DEFAULT) else {
            return Ok(None);
        };
        let parent = self.current.clone();
        self.add_folder(&name, &parent).map(Some)
    }

    /// Ask for a new name. Cancelling or entering a blank name changes nothing.
    pub fn rename_folder(&mut self, dialogs: &dyn Dialogs, folder_id: &str) -> bool {
        let Some(current_name) = self.folders.folder(folder_id).map(|f| f.name.clone()) else {
            return false;
        };
        let Some(name) = dialogs.prompt_text(RENAME_FOLDER_PROMPT, &current_name) else {
            return false;
        };
        let renamed = self.folders.rename_folder(folder_id, &name);
        if renamed {
            self.announce();
        }
        renamed
    }

    /// Confirm, then delete. Viewing the deleted folder falls back to root.
    pub fn delete_folder(&mut self, dialogs: &dyn Dialogs, folder_id: &str) -> bool {
        let Some(name) = self.folders.folder(folder_id).map(|f| f.name.clone()) else {
            return false;
        };
        let message = format!(
            "Delete folder \"{}\"? Its items and subfolders move to the top level.",
            name
        );
        if !dialogs.confirm(&message) {
            return false;
        }
        if !self.folders.delete_folder(folder_id) {
            return false;
        }
        if self.current == folder_id {
            self.current = ROOT_FOLDER_ID.to_string();
            self.selection.clear();
        }
        self.history.retain(|id| id != folder_id);
        self.announce();
        true
    }

    pub fn move_folder(&mut self, folder_id: &str, new_parent_id: &str) -> Result<bool> {
        let moved = self.folders.move_folder(folder_id, new_parent_id)?;
        if moved {
            self.announce();
        }
        Ok(moved)
    }

    /// Drop handler for dragging a folder onto another. Rejected moves
    /// (cycles, vanished targets) are logged and ignored.
    pub fn drop_folder_onto(&mut self, folder_id: &str, target_id: &str) -> bool {
        self.move_folder(folder_id, target_id)
            .warn_on_err()
            .unwrap_or(false)
    }
}
