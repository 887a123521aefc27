//! Key-value persistence for saved filters.
//!
//! Persistence is always explicit: nothing in the engine writes to a store
//! unless [`save_filters`] (or [`SavedFilterSet::flush`](crate::SavedFilterSet::flush))
//! is called.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::saved::SavedFilter;

/// Current version of the persisted saved-filter envelope.
pub const FORMAT_VERSION: u32 = 1;

/// A string key-value store.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> std::result::Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store holding one file per key.
///
/// Key characters outside `[A-Za-z0-9_.-]` are replaced by `_` in file
/// names. Writes go to a temporary sibling file that is then renamed over the
/// target, so a crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> std::result::Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(FileStore { dir })
    }

    /// The directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }
}

fn file_name(key: &str) -> String {
    let name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match name.as_str() {
        "" | "." | ".." => format!("_{}", name),
        _ => name,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.tmp", file_name(key)));
        fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    filters: &'a [SavedFilter],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Persisted {
    Envelope {
        version: u32,
        filters: Vec<SavedFilter>,
    },
    Legacy(Vec<SavedFilter>),
}

/// Writes saved filters under `key` as `{"version":1,"filters":[...]}`.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save_filters<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    filters: &[SavedFilter],
) -> Result<()> {
    let json = serde_json::to_string(&EnvelopeRef {
        version: FORMAT_VERSION,
        filters,
    })?;
    store.set(key, &json)?;
    tracing::debug!(key, count = filters.len(), "saved filters written");
    Ok(())
}

/// Reads saved filters stored under `key`.
///
/// Accepts the versioned envelope and the legacy bare JSON array. A missing
/// key yields an empty list; a failing store, malformed JSON or a newer
/// format version is logged and also yields an empty list.
pub fn load_filters<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Vec<SavedFilter> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read saved filters");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Persisted>(&raw) {
        Ok(Persisted::Envelope { version, filters }) if version <= FORMAT_VERSION => filters,
        Ok(Persisted::Envelope { version, .. }) => {
            tracing::warn!(key, version, "unsupported saved filter format version");
            Vec::new()
        }
        Ok(Persisted::Legacy(filters)) => filters,
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed saved filters");
            Vec::new()
        }
    }
}
