//! Prompt Organizer - section trees, snapshots and virtual folders for a
//! host application's prompt list
//!
//! The host owns the prompt records. This library turns its flat ordered
//! list into a collapsible section tree, snapshots and restores the enabled
//! set with minimal toggling, and keeps per-universe virtual folders and
//! favorites for prompts and characters.

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

// Host collaborator contract and change notification
pub mod events;
pub mod host;

// Section tree: divider parsing, building, collapse state
pub mod sections;

// Enabled-state snapshots
pub mod snapshot;

// Virtual folders, favorites and folder navigation
pub mod favorites;
pub mod folders;
pub mod navigator;

// Relevance scoring
pub mod search;

pub mod organizer;

pub use error::{OrganizerError, Result};
pub use navigator::FolderNavigator;
pub use organizer::PromptOrganizer;
