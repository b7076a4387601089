//! Virtual folders - a metadata-only folder hierarchy over host items
//!
//! One [`VirtualFolderStore`] instance exists per leaf universe (prompts,
//! characters). Instances share the implementation, never the data.

mod model;
mod store;

pub use model::{
    CharacterId, Characters, ChildQuery, FolderFilter, FolderRecord, GridItem, ItemMetadata,
    LeafId, LeafItem, LeafUniverse, PromptId, Prompts, SortOrder, VirtualFileSystem,
    ROOT_FOLDER_ID,
};
pub use store::VirtualFolderStore;
