//! TOML-file storage that survives restarts.
//!
//! The whole map is rewritten on every mutation. Write failures are logged
//! and the in-memory copy stays authoritative for the rest of the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::KeyValueStorage;

/// Errors loading or flushing a storage file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read storage file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse storage file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize storage: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the storage at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "Storage loaded");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current map to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        let content = toml::to_string(&self.entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist storage");
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("face-gate-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        {
            let mut storage = FileStorage::open(&path).unwrap();
            storage.set("failed_attempts_a@x.com", "2");
            storage.set("user_email", "a@x.com");
        }

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get("failed_attempts_a@x.com").as_deref(), Some("2"));
        assert_eq!(storage.keys().len(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "this is = = not toml").unwrap();

        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Parse(_))
        ));

        std::fs::remove_file(&path).unwrap();
    }
}
