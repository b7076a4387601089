//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default storage directory (tilde-expanded at load time)
pub const DEFAULT_STORAGE_DIR: &str = "~/.prompt-organizer";

/// Pause between consecutive host toggle calls while applying a snapshot
pub const DEFAULT_SNAPSHOT_STEP_DELAY_MS: u64 = 50;

/// Names of the synthetic sections produced by the tree builder
pub const DEFAULT_UNGROUPED_SECTION_NAME: &str = "Ungrouped";
pub const DEFAULT_ALL_SECTION_NAME: &str = "All";

/// Storage keys for the persisted blobs
pub const COLLAPSE_STATE_KEY: &str = "collapse_state";
pub const SNAPSHOT_KEY: &str = "toggle_snapshot";
pub const CUSTOM_PATTERNS_KEY: &str = "divider_patterns";
pub const PROMPT_FOLDERS_KEY: &str = "prompt_vfs";
pub const CHARACTER_FOLDERS_KEY: &str = "character_vfs";
pub const PROMPT_FAVORITES_KEY: &str = "prompt_favorites";
pub const CHARACTER_FAVORITES_KEY: &str = "character_favorites";
