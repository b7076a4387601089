//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::*;
use crate::folders::SortOrder;

/// Tunables for the organizer services.
///
/// Every field is optional in the JSON file; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerConfig {
    /// Directory holding the persisted JSON blobs (default: ~/.prompt-organizer)
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Milliseconds to wait between toggle calls when applying a snapshot (default: 50)
    #[serde(default = "default_snapshot_step_delay_ms")]
    pub snapshot_step_delay_ms: u64,
    /// Name of the synthetic section holding entries before the first header
    #[serde(default = "default_ungrouped_section_name")]
    pub ungrouped_section_name: String,
    /// Name of the synthetic section wrapping a list with no top-level headers
    #[serde(default = "default_all_section_name")]
    pub all_section_name: String,
    /// Initial sort for folder views
    #[serde(default)]
    pub default_sort: SortOrder,
}

fn default_storage_dir() -> String {
    DEFAULT_STORAGE_DIR.to_string()
}
fn default_snapshot_step_delay_ms() -> u64 {
    DEFAULT_SNAPSHOT_STEP_DELAY_MS
}
fn default_ungrouped_section_name() -> String {
    DEFAULT_UNGROUPED_SECTION_NAME.to_string()
}
fn default_all_section_name() -> String {
    DEFAULT_ALL_SECTION_NAME.to_string()
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        OrganizerConfig {
            storage_dir: default_storage_dir(),
            snapshot_step_delay_ms: DEFAULT_SNAPSHOT_STEP_DELAY_MS,
            ungrouped_section_name: default_ungrouped_section_name(),
            all_section_name: default_all_section_name(),
            default_sort: SortOrder::default(),
        }
    }
}

impl OrganizerConfig {
    /// Storage directory with `~` expanded
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.storage_dir).as_ref())
    }

    pub fn snapshot_step_delay(&self) -> Duration {
        Duration::from_millis(self.snapshot_step_delay_ms)
    }
}
