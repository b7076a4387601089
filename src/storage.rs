//! Durable string-keyed storage for the organizer's JSON blobs
//!
//! Every store persists one JSON document under one key. Reads never fail
//! from the caller's point of view: a missing or corrupt blob yields the
//! store's empty default.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::OrganizerConfig;
use crate::error::OrganizerError;
use crate::logging;

/// Key-value backend. Implementations must be cheap to share between stores.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`, `Ok(None)` if it was never written
    fn read(&self, key: &str) -> Result<Option<String>>;
    /// Replace the value for `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store file: {}", path.display()))?;
        Ok(Some(content))
    }

    /// Atomic write: write to temp file, then rename
    fn write(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        std::fs::write(&temp_path, value)
            .with_context(|| format!("Failed to write temp store file: {}", temp_path.display()))?;

        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;

        debug!(path = %path.display(), bytes = value.len(), "Saved store file (atomic)");
        Ok(())
    }
}

/// File store rooted at the configured storage directory
pub fn open_store(config: &OrganizerConfig) -> SharedStore {
    let dir = config.storage_path();
    debug!(dir = %dir.display(), "Opening JSON file store");
    Arc::new(JsonFileStore::new(dir))
}

/// In-memory backend, clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value, used by tests to inspect what a store persisted
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load and decode `key`, falling back to `T::default()` on any failure.
pub fn load_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "Store key not found, starting fresh");
            return T::default();
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read store, using empty default");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            logging::log_store_event("kv", "load", key, true);
            value
        }
        Err(e) => {
            warn!(key, error = %e, "Corrupt store JSON, using empty default");
            T::default()
        }
    }
}

/// Encode and write `value` under `key`.
pub fn persist<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> crate::error::Result<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    let result = store.write(key, &json).map_err(|e| OrganizerError::Storage {
        key: key.to_string(),
        message: format!("{:#}", e),
    });
    logging::log_store_event("kv", "save", key, result.is_ok());
    result
}

/// Write-through helper that degrades to memory-only after the first failure.
///
/// Stores embed one of these next to their in-memory state. The first failed
/// write is logged and flips the slot into session-only mode so the user
/// keeps working; later writes are skipped silently.
#[derive(Clone)]
pub struct PersistSlot {
    store: SharedStore,
    key: String,
    degraded: bool,
}

impl std::fmt::Debug for PersistSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistSlot")
            .field("key", &self.key)
            .field("degraded", &self.degraded)
            .finish()
    }
}

impl PersistSlot {
    pub fn new(store: SharedStore, key: impl Into<String>) -> Self {
        PersistSlot {
            store,
            key: key.into(),
            degraded: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True once a write failed and the slot stopped persisting
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn load<T: DeserializeOwned + Default>(&self) -> T {
        load_or_default(self.store.as_ref(), &self.key)
    }

    /// Persist `value`, returning false when the slot is (or just became) memory-only
    pub fn save<T: Serialize + ?Sized>(&mut self, value: &T) -> bool {
        if self.degraded {
            return false;
        }
        match persist(self.store.as_ref(), &self.key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    key = %self.key,
                    error = %e,
                    "Store write failed, keeping changes in memory for this session"
                );
                self.degraded = true;
                false
            }
        }
    }
}
