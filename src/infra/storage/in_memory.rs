// In-memory KvMedium.
//
// Used by tests and by `RESOLUTIONS_BACKEND=memory`. Nothing survives a
// restart. An optional byte quota mimics a browser storage limit so the
// degraded write path can be exercised without a real full disk.

use crate::core::storage::{footprint, KvMedium, StorageError};
use async_trait::async_trait;
use dashmap::DashMap;

pub struct InMemoryMedium {
    entries: DashMap<String, String>,
    quota: Option<usize>,
}

impl InMemoryMedium {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            quota: None,
        }
    }

    /// Reject writes that would grow the namespace past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: DashMap::new(),
            quota: Some(quota),
        }
    }

    fn check_quota(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let Some(quota) = self.quota else {
            return Ok(());
        };

        let others = self
            .entries
            .iter()
            .filter(|entry| entry.key() != key)
            .map(|entry| entry.key().len() + entry.value().len())
            .sum::<usize>();
        let needed = others + footprint(std::iter::once((key, value)));

        if needed > quota {
            return Err(StorageError::QuotaExceeded { needed, quota });
        }
        Ok(())
    }
}

impl Default for InMemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvMedium for InMemoryMedium {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.check_quota(key, &value)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
