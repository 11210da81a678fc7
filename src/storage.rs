//! Small persisted key/value store for session data (token, theme)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

pub const ACCESS_TOKEN_KEY: &str = "spotify_access_token";
pub const REFRESH_TOKEN_KEY: &str = "spotify_refresh_token";
pub const TOKEN_EXPIRES_AT_KEY: &str = "spotify_token_expires_at";
pub const THEME_KEY: &str = "theme";

const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access session storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode session storage: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session storage backed by a JSON file. Cloning shares the same entries.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl SessionStore {
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tunebox")
            .join(STORAGE_FILE)
    }

    /// Open the store at `path`. A missing file starts empty; an unreadable
    /// one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session storage");
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.insert(key.to_string(), value.into());
        }
        self.flush()
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.remove(key).is_some()
        };
        if removed {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            serde_json::to_string_pretty(&*entries)?
        };
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(STORAGE_FILE);

        let store = SessionStore::open(&path);
        store.set(THEME_KEY, "light").unwrap();
        store.set(ACCESS_TOKEN_KEY, "abc").unwrap();

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).as_deref(), Some("abc"));
    }

    #[test]
    fn remove_deletes_key_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);

        let store = SessionStore::open(&path);
        store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        store.remove(ACCESS_TOKEN_KEY).unwrap();

        assert_eq!(SessionStore::open(&path).get(ACCESS_TOKEN_KEY), None);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::open(&path);
        assert_eq!(store.get(THEME_KEY), None);

        store.set(THEME_KEY, "dark").unwrap();
        assert_eq!(SessionStore::open(&path).get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn clones_share_entries() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path().join(STORAGE_FILE));
        let other = store.clone();

        store.set(ACCESS_TOKEN_KEY, "shared").unwrap();
        assert_eq!(other.get(ACCESS_TOKEN_KEY).as_deref(), Some("shared"));
    }
}
