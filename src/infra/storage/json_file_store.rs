use crate::core::storage::{KvMedium, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// JSON file medium. The whole namespace lives in one file as a map of
/// key -> serialized value, rewritten after every change:
/// { "data-version": "1", "resolutions": "[...]" }
pub struct JsonFileMedium {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl JsonFileMedium {
    pub fn new(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let cache = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Storage file is unreadable, starting empty");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let cache = self.cache.read().await;
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &*cache)?;
        Ok(())
    }
}

#[async_trait]
impl KvMedium for JsonFileMedium {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let cache = self.cache.read().await;
        Ok(cache.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut cache = self.cache.write().await;
        cache.insert(key.to_string(), value);
        drop(cache); // Release lock before persisting
        self.persist().await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut cache = self.cache.write().await;
        let existed = cache.remove(key).is_some();
        drop(cache);
        if !existed {
            return Ok(());
        }

        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_json_persistence_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let medium = JsonFileMedium::new(path.clone()).unwrap();
        medium.set_raw("resolutions", "[]".into()).await.unwrap();
        medium.set_raw("data-version", "1".into()).await.unwrap();

        // Reload from file
        let reloaded = JsonFileMedium::new(path).unwrap();
        assert_eq!(
            reloaded.get_raw("resolutions").await.unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(
            reloaded.get_raw("data-version").await.unwrap().as_deref(),
            Some("1")
        );
        assert_eq!(reloaded.get_raw("liked-resolutions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let medium = JsonFileMedium::new(path.clone()).unwrap();
        medium.set_raw("resolutions", "[1]".into()).await.unwrap();
        medium.remove("resolutions").await.unwrap();
        medium.remove("never-written").await.unwrap();

        let reloaded = JsonFileMedium::new(path).unwrap();
        assert_eq!(reloaded.get_raw("resolutions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        let medium = JsonFileMedium::new(path).unwrap();

        assert_eq!(medium.get_raw("resolutions").await.unwrap(), None);
    }
}
