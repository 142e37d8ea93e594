// Client-side key/value persistence
// Mirrors session and UI preferences to disk so they survive restarts

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Persisted storage keys
pub mod keys {
    /// Bearer token of the current session (raw string)
    pub const TOKEN: &str = "token";
    /// JSON-serialized user profile
    pub const USER: &str = "user";
    /// `light` or `dark`
    pub const THEME: &str = "theme";
    /// `true` or `false`
    pub const SIDEBAR_COLLAPSED: &str = "sidebarCollapsed";
    /// JSON-serialized user preferences
    pub const USER_PREFERENCES: &str = "userPreferences";
}

/// Error types for persistence operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// File I/O error
    IoError(String),
    /// JSON serialization/deserialization error
    JsonError(String),
    /// Invalid data format
    InvalidData(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::IoError(msg) => write!(f, "IO Error: {}", msg),
            PersistenceError::JsonError(msg) => write!(f, "JSON Error: {}", msg),
            PersistenceError::InvalidData(msg) => write!(f, "Invalid Data: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Persistent string key/value store
///
/// Values are opaque strings; use [`get_json`] / [`set_json`] for structured
/// values.
pub trait Storage: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Read and deserialize a JSON value
///
/// Malformed values are logged and treated as absent.
pub fn get_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Ignoring malformed persisted value");
            None
        }
    }
}

/// Serialize a value to JSON and write it
pub fn set_json<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let json =
        serde_json::to_string(value).map_err(|e| PersistenceError::JsonError(e.to_string()))?;
    storage.set(key, &json)
}

/// In-memory storage, used in tests and when no data directory is available
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Serializable structure for the storage file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageFileData {
    /// Version of the storage format (for future migration support)
    version: u32,
    /// Stored entries
    entries: BTreeMap<String, String>,
}

/// JSON-file backed storage
///
/// The whole file is loaded once on open; every write rewrites it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`
    ///
    /// # Returns
    /// * `Ok(FileStorage)` - with the file's entries, or empty if it does not exist
    /// * `Err(PersistenceError)` - if the file exists but cannot be read or parsed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load_from_file(&path)?;
        tracing::debug!(path = %path.display(), count = entries.len(), "Opened client storage");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, String>, PersistenceError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let json =
            fs::read_to_string(path).map_err(|e| PersistenceError::IoError(e.to_string()))?;

        let data: StorageFileData =
            serde_json::from_str(&json).map_err(|e| PersistenceError::JsonError(e.to_string()))?;

        // Validate version (for future migration support)
        if data.version != 1 {
            return Err(PersistenceError::InvalidData(format!(
                "Unsupported storage version: {}",
                data.version
            )));
        }

        Ok(data.entries)
    }

    fn save_to_file(&self, entries: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        let data = StorageFileData {
            version: 1,
            entries: entries.clone(),
        };

        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| PersistenceError::JsonError(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| PersistenceError::IoError(e.to_string()))?;
            }
        }

        fs::write(&self.path, json).map_err(|e| PersistenceError::IoError(e.to_string()))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.save_to_file(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save_to_file(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.get(keys::TOKEN).is_none());

        storage.set(keys::TOKEN, "abc").unwrap();
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("abc"));

        storage.remove(keys::TOKEN).unwrap();
        assert!(storage.get(keys::TOKEN).is_none());
        // Removing twice is fine
        storage.remove(keys::TOKEN).unwrap();
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::THEME, "light").unwrap();
        storage.set(keys::TOKEN, "secret").unwrap();
        storage.remove(keys::TOKEN).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::THEME).as_deref(), Some("light"));
        assert!(reopened.get(keys::TOKEN).is_none());
    }

    #[test]
    fn test_open_nonexistent_file_is_empty() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.get(keys::USER).is_none());
    }

    #[test]
    fn test_open_rejects_unknown_version() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{"version": 7, "entries": {}}"#).unwrap();

        let err = FileStorage::open(temp_file.path()).unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidData(_)));
    }

    #[test]
    fn test_json_helpers_ignore_malformed_values() {
        let storage = MemoryStorage::new();
        storage.set(keys::USER_PREFERENCES, "{not json").unwrap();
        let parsed: Option<serde_json::Value> = get_json(&storage, keys::USER_PREFERENCES);
        assert!(parsed.is_none());

        set_json(&storage, keys::USER_PREFERENCES, &vec![1, 2, 3]).unwrap();
        let parsed: Option<Vec<u32>> = get_json(&storage, keys::USER_PREFERENCES);
        assert_eq!(parsed, Some(vec![1, 2, 3]));
    }
}
