//! Persistent client-side key/value storage
//!
//! Only non-secret data may be written here. The access token lives in
//! [`TokenStore`](crate::token_store::TokenStore) and the refresh secret in
//! an HTTP-only cookie.

use crate::error::{ClientError, Result};
use papaya::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key of the persisted user profile snapshot
pub const PROFILE_KEY: &str = "pulse_current_user";

/// Keys where older clients kept tokens in plain storage
pub const LEGACY_ACCESS_TOKEN_KEY: &str = "authToken";
pub const LEGACY_REFRESH_TOKEN_KEY: &str = "refreshToken";

/// String key/value storage surviving restarts
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Thread-safe in-memory storage using Papaya HashMap
#[derive(Clone)]
pub struct MemoryStorage {
    entries: Arc<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(HashMap::new()),
        }
    }

    /// All stored keys
    pub fn keys(&self) -> Vec<String> {
        self.entries.pin().iter().map(|(k, _)| k.clone()).collect()
    }

    /// All stored values
    pub fn values(&self) -> Vec<String> {
        self.entries.pin().iter().map(|(_, v)| v.clone()).collect()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.pin().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.pin().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.pin().remove(key);
        Ok(())
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// `~/.pulse`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::home_dir()
            .ok_or_else(|| ClientError::Storage("Cannot determine home directory".to_string()))?
            .join(".pulse");
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ClientError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(PROFILE_KEY).unwrap(), None);

        storage.set(PROFILE_KEY, r#"{"id":1}"#).unwrap();
        assert_eq!(storage.get(PROFILE_KEY).unwrap().as_deref(), Some(r#"{"id":1}"#));
        assert_eq!(storage.keys(), vec![PROFILE_KEY.to_string()]);

        storage.remove(PROFILE_KEY).unwrap();
        storage.remove(PROFILE_KEY).unwrap();
        assert_eq!(storage.get(PROFILE_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("pulse")).unwrap();

        assert_eq!(storage.get(PROFILE_KEY).unwrap(), None);
        storage.set(PROFILE_KEY, r#"{"id":2}"#).unwrap();
        assert!(dir.path().join("pulse").join("pulse_current_user.json").exists());
        assert_eq!(storage.get(PROFILE_KEY).unwrap().as_deref(), Some(r#"{"id":2}"#));

        storage.remove(PROFILE_KEY).unwrap();
        storage.remove(PROFILE_KEY).unwrap();
        assert_eq!(storage.get(PROFILE_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(matches!(storage.set("../escape", "x"), Err(ClientError::Storage(_))));
        assert!(storage.get("").is_err());
    }
}
