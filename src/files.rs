//! Flat-file JSON array persistence
//!
//! The shopping list and patient queue keep their whole state in one JSON array
//! per file. Every change is a read-modify-write of the entire file. A mutex
//! serializes those cycles within this process; separate processes sharing a
//! file still overwrite each other (last write wins).

use std::path::PathBuf;

use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// A JSON array stored in a single file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Create the file with an empty array if it does not exist yet
    pub async fn ensure_exists(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        if !fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "Creating data file");
            self.write_unlocked(&[]).await?;
        }
        Ok(())
    }

    /// Read all entries; a missing file reads as an empty array
    pub async fn read(&self) -> Result<Vec<Value>> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Run `f` against the current entries and persist them if it succeeds.
    ///
    /// The lock is held from the read until the write completes. When `f`
    /// returns an error the file is left untouched.
    pub async fn modify<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Value>) -> Result<T>,
    {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_unlocked().await?;
        let result = f(&mut entries)?;
        self.write_unlocked(&entries).await?;
        Ok(result)
    }

    async fn read_unlocked(&self) -> Result<Vec<Value>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn write_unlocked(&self, entries: &[Value]) -> Result<()> {
        let text = serde_json::to_string(entries)?;
        fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectionError;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_exists_writes_empty_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::new(&path);
        store.ensure_exists().await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");

        // existing content is preserved
        std::fs::write(&path, r#"[{"a": 1}]"#).unwrap();
        store.ensure_exists().await.unwrap();
        assert_eq!(store.read().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_modify_persists_on_success() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));

        let len = store
            .modify(|entries| {
                entries.push(json!({"name": "Flour"}));
                Ok(entries.len())
            })
            .await
            .unwrap();

        assert_eq!(len, 1);
        assert_eq!(store.read().await.unwrap(), vec![json!({"name": "Flour"})]);
    }

    #[tokio::test]
    async fn test_modify_discards_on_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "[1]").unwrap();
        let store = JsonFileStore::new(&path);

        let result: Result<()> = store
            .modify(|entries| {
                entries.clear();
                Err(CollectionError::IndexOutOfRange(3))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.read().await.unwrap(), vec![json!(1)]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.read().await, Err(CollectionError::Json(_))));
    }
}
