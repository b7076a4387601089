//! Configuration loading from file system

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::types::OrganizerConfig;

/// Default config location (~/.prompt-organizer/config.json)
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.prompt-organizer/config.json").as_ref())
}

/// Load configuration from a JSON file.
///
/// Returns `OrganizerConfig::default()` if the file is missing, unreadable
/// or not valid JSON. Never fails.
#[instrument(name = "load_config")]
pub fn load_config(path: &Path) -> OrganizerConfig {
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using defaults");
        return OrganizerConfig::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Failed to read config, using defaults");
            return OrganizerConfig::default();
        }
    };

    match serde_json::from_str::<OrganizerConfig>(&content) {
        Ok(config) => {
            info!(path = %path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %path.display(),
                "Failed to parse config JSON, using defaults"
            );
            OrganizerConfig::default()
        }
    }
}
