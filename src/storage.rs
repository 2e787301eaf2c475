//! # Persistence
//!
//! A synchronous string key-value store plus a typed slot layer on top of it.
//! Values are stored JSON-encoded, one entry per slot.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::StorageError;

/// Synchronous get/set/remove over string keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store with no persistence across runs; used by tests and the crate docs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing JSON encoding.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_string(), value.to_string());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// Stores each key in its own file under a directory.
///
/// Writes go to a temporary file that is synced and then renamed over the
/// target, so a reader sees either the old value or the new one.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp_path = self.temp_path_for(key);
        let write_tmp = || -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(value.as_bytes())?;
            tmp_file.sync_all()
        };
        write_tmp().map_err(|source| StorageError::Io {
            path: tmp_path.clone(),
            source,
        })?;

        let path = self.path_for(key);
        fs::rename(&tmp_path, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// Named persistence slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The selected repository identifier, as a JSON string.
    Repository,
    /// The tweet association log, as a JSON array.
    Tweets,
}

impl Slot {
    pub fn key(self) -> &'static str {
        match self {
            Slot::Repository => "repository",
            Slot::Tweets => "tweets",
        }
    }
}

/// Typed access to a [`KeyValueStore`] by [`Slot`].
#[derive(Clone)]
pub struct SlotStore {
    inner: Arc<dyn KeyValueStore>,
}

impl SlotStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load and decode a slot.
    ///
    /// Missing, unreadable and undecodable values all come back as `None`; the
    /// failure is logged and otherwise swallowed.
    pub fn load<T: DeserializeOwned>(&self, slot: Slot) -> Option<T> {
        let raw = match self.inner.get(slot.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "Failed to read persisted slot");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "Ignoring malformed persisted slot");
                None
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: slot.key(),
            source,
        })?;
        debug!(slot = slot.key(), bytes = encoded.len(), "Saving slot");
        self.inner.set(slot.key(), &encoded)
    }

    pub fn clear(&self, slot: Slot) -> Result<(), StorageError> {
        self.inner.remove(slot.key())
    }

    /// Raw access for callers that need to inspect the stored string.
    pub fn raw(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        self.inner.get(slot.key())
    }
}
