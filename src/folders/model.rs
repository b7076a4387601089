//! Virtual folder data types
//!
//! Folders are metadata only: a leaf item (a prompt, a character) lives
//! wherever the host keeps it, and the folder store merely records which
//! virtual folder it is shown in.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::config::{
    CHARACTER_FAVORITES_KEY, CHARACTER_FOLDERS_KEY, PROMPT_FAVORITES_KEY, PROMPT_FOLDERS_KEY,
};

/// Implicit top-level folder; never stored
pub const ROOT_FOLDER_ID: &str = "root";

/// Identifier type of a leaf universe
pub trait LeafId:
    Clone + Eq + Ord + Hash + Debug + Display + AsRef<str> + Serialize + DeserializeOwned + 'static
{
}

macro_rules! leaf_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl LeafId for $name {}
    };
}

leaf_id!(
    /// Prompt identifier, as reported by the host prompt list
    PromptId
);
leaf_id!(
    /// Character identifier (the host's avatar file name)
    CharacterId
);

/// One independently persisted set of folders and item assignments
pub trait LeafUniverse: 'static {
    type Id: LeafId;
    const FOLDERS_KEY: &'static str;
    const FAVORITES_KEY: &'static str;
    /// Name used in logs
    const LABEL: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct Prompts;

impl LeafUniverse for Prompts {
    type Id = PromptId;
    const FOLDERS_KEY: &'static str = PROMPT_FOLDERS_KEY;
    const FAVORITES_KEY: &'static str = PROMPT_FAVORITES_KEY;
    const LABEL: &'static str = "prompts";
}

#[derive(Debug, Clone, Copy)]
pub struct Characters;

impl LeafUniverse for Characters {
    type Id = CharacterId;
    const FOLDERS_KEY: &'static str = CHARACTER_FOLDERS_KEY;
    const FAVORITES_KEY: &'static str = CHARACTER_FAVORITES_KEY;
    const LABEL: &'static str = "characters";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    /// `"root"` for top-level folders
    pub parent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    /// `None` means the item sits at root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// The persisted unit for one leaf universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    default,
    bound(serialize = "I: LeafId", deserialize = "I: LeafId")
)]
pub struct VirtualFileSystem<I> {
    pub folders: BTreeMap<String, FolderRecord>,
    pub items: BTreeMap<I, ItemMetadata>,
}

impl<I> Default for VirtualFileSystem<I> {
    fn default() -> Self {
        VirtualFileSystem {
            folders: BTreeMap::new(),
            items: BTreeMap::new(),
        }
    }
}

/// A leaf item as the host knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafItem<I> {
    pub id: I,
    pub name: String,
}

impl<I> LeafItem<I> {
    pub fn new(id: impl Into<I>, name: impl Into<String>) -> Self {
        LeafItem {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FolderFilter {
    #[default]
    All,
    /// Favorite items only, folders hidden
    Favorites,
    /// Items without a folder assignment only, folders hidden
    Uncategorized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
}

/// View options for [`super::VirtualFolderStore::get_children`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildQuery {
    pub search_term: Option<String>,
    pub filter: FolderFilter,
    pub sort: SortOrder,
}

impl ChildQuery {
    pub fn new(filter: FolderFilter, sort: SortOrder) -> Self {
        ChildQuery {
            search_term: None,
            filter,
            sort,
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }
}

/// One cell of a folder view
#[derive(Debug, Clone, PartialEq)]
pub enum GridItem<I> {
    Folder {
        record: FolderRecord,
        item_count: usize,
        subfolder_count: usize,
    },
    Item {
        id: I,
        name: String,
        folder_id: Option<String>,
        favorite: bool,
    },
}

impl<I: LeafId> GridItem<I> {
    pub fn name(&self) -> &str {
        match self {
            GridItem::Folder { record, .. } => &record.name,
            GridItem::Item { name, .. } => name,
        }
    }

    /// Folder id or item id
    pub fn key(&self) -> &str {
        match self {
            GridItem::Folder { record, .. } => &record.id,
            GridItem::Item { id, .. } => id.as_ref(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, GridItem::Folder { .. })
    }
}
