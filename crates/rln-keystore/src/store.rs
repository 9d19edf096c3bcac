use rln_types::{RlnError, RlnResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Well-known key holding the full encoded keystore.
pub const KEYSTORE_STORE_KEY: &str = "keystore";

/// Well-known key holding the alias map.
pub const ALIASES_STORE_KEY: &str = "aliases";

/// Host-supplied key-value persistence for the keystore and its alias
/// map.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> RlnResult<Option<String>>;

    fn put(&self, key: &str, value: &str) -> RlnResult<()>;

    fn delete(&self, key: &str) -> RlnResult<()>;
}

/// Ephemeral in-process store, used in tests and throwaway sessions.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> RlnResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RlnError::Storage("lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> RlnResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RlnError::Storage("lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> RlnResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RlnError::Storage("lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// One file per key under a base directory, written atomically via a
/// temp file and rename.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl AsRef<Path>) -> RlnResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        if !base_dir.exists() {
            std::fs::create_dir_all(&base_dir).map_err(|e| RlnError::Storage(e.to_string()))?;
        }

        Ok(Self { base_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> RlnResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| RlnError::Storage(format!("failed to read {}: {}", key, e)))
    }

    fn put(&self, key: &str, value: &str) -> RlnResult<()> {
        let path = self.key_path(key);
        let temp_path = path.with_extension("json.tmp");

        std::fs::write(&temp_path, value)
            .map_err(|e| RlnError::Storage(format!("failed to write {}: {}", key, e)))?;

        std::fs::rename(&temp_path, &path)
            .map_err(|e| RlnError::Storage(format!("failed to save {}: {}", key, e)))
    }

    fn delete(&self, key: &str) -> RlnResult<()> {
        let path = self.key_path(key);

        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| RlnError::Storage(format!("failed to delete {}: {}", key, e)))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();

        assert_eq!(store.get("keystore").unwrap(), None);

        store.put("keystore", "{\"version\":1}").unwrap();
        assert_eq!(
            store.get("keystore").unwrap(),
            Some("{\"version\":1}".to_string())
        );

        store.delete("keystore").unwrap();
        assert_eq!(store.get("keystore").unwrap(), None);

        // Deleting an absent key is a no-op.
        store.delete("keystore").unwrap();
    }
}
