//! Storage manager for persisting string values to disk
//!
//! Provides a `Storage` that writes each key as a small JSON file holding the
//! value and the time it was stored.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when writing to storage
#[derive(Debug, Error)]
pub enum StorageError {
    /// Directory creation or file write failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be serialized
    #[error("failed to serialize entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Entry stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// The stored string
    pub value: String,
    /// When the value was written
    pub stored_at: DateTime<Utc>,
}

/// Reads and writes string values keyed by name
///
/// Files live in the XDG data directory (`~/.local/share/echojr/` on Linux).
#[derive(Debug, Clone)]
pub struct Storage {
    /// Directory where entries are stored
    storage_dir: PathBuf,
}

impl Storage {
    /// Creates a Storage in the XDG data directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "echojr")?;
        let storage_dir = project_dirs.data_dir().to_path_buf();
        Some(Self { storage_dir })
    }

    /// Creates a Storage rooted at a custom directory
    pub fn with_dir(storage_dir: PathBuf) -> Self {
        Self { storage_dir }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.json", key))
    }

    /// Writes `value` under `key`, replacing any previous value
    ///
    /// The write is synchronous, so a later `get` on the same thread always
    /// sees the complete value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.storage_dir)?;

        let entry = StoredValue {
            value: value.to_string(),
            stored_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&entry)?;

        fs::write(self.entry_path(key), json)?;
        Ok(())
    }

    /// Reads the entry stored under `key`
    ///
    /// Returns `None` if the entry is missing or cannot be parsed.
    pub fn get_entry(&self, key: &str) -> Option<StoredValue> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Reads the value stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_entry(key).map(|entry| entry.value)
    }
}
