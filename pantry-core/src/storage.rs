//! Persisted key-value storage for client state.
//!
//! Each store is saved as one JSON blob under its own key. Loading never
//! fails hard: a missing or unreadable blob simply means "no saved state".

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::StorageError;

pub const AUTH_KEY: &str = "auth";
pub const INGREDIENTS_KEY: &str = "ingredients";
pub const FILTERS_KEY: &str = "filters";
pub const TAGS_KEY: &str = "tags";
pub const LANGUAGE_KEY: &str = "language";

/// Raw blob access. Typed helpers live on [`StorageExt`].
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub trait StorageExt {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T>;
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> StorageExt for S {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable saved state");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.write(key, &json)
    }
}

/// One `<key>.json` file per store under a directory.
pub struct DiskStorage {
    dir: PathBuf,
}

impl DiskStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// `PANTRY_STATE_DIR`, else `~/.pantry/state`.
    pub fn default_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("PANTRY_STATE_DIR") {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .map(|h| h.join(".pantry").join("state"))
            .unwrap_or_else(|| PathBuf::from("data/state"))
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }

    /// Remove every saved blob.
    pub fn clear(&self) -> std::io::Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl Storage for DiskStorage {
    fn read(&self, key: &str) -> Option<String> {
        let path = self.path(key);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read saved state");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        // Write then rename so a crash never leaves a half-written blob
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-process storage for tests.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .read()
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.blobs.read().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Saved {
        ids: Vec<i32>,
    }

    #[test]
    fn test_disk_roundtrip_and_remove() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path().join("state"));

        assert_eq!(storage.load::<Saved>(FILTERS_KEY), None);
        storage.save(FILTERS_KEY, &Saved { ids: vec![3, 1] }).unwrap();
        assert_eq!(
            storage.load::<Saved>(FILTERS_KEY),
            Some(Saved { ids: vec![3, 1] })
        );
        assert!(dir.path().join("state/filters.json").exists());

        storage.remove(FILTERS_KEY).unwrap();
        assert_eq!(storage.load::<Saved>(FILTERS_KEY), None);
    }

    #[test]
    fn test_corrupt_blob_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path().to_path_buf());
        storage.write(AUTH_KEY, "{not json").unwrap();
        assert_eq!(storage.load::<Saved>(AUTH_KEY), None);
    }

    #[test]
    fn test_keys_are_sanitized() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path().to_path_buf());
        storage.write("../escape", "{}").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.save(TAGS_KEY, &Saved { ids: vec![] }).unwrap();
        storage.save(AUTH_KEY, &Saved { ids: vec![1] }).unwrap();
        assert_eq!(storage.keys(), vec!["auth", "tags"]);
        storage.remove(TAGS_KEY).unwrap();
        assert_eq!(storage.keys(), vec!["auth"]);
    }
}
