// The durable key-value medium every persistent value is written through.
//
// The core only ever sees raw JSON strings here. Typed access lives in
// `persistent_value.rs`; concrete media live in `infra/storage/`.

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage medium unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// A flat namespace of string keys mapped to serialized values.
///
/// `get_raw` returns `None` for a key that was never written or has been
/// removed, which is distinct from a key holding an empty value such as `[]`.
#[async_trait]
pub trait KvMedium: Send + Sync {
    /// Fetch the serialized value stored under `key`.
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing whatever was there.
    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Total bytes a namespace would occupy, counting keys and values the way a
/// browser storage quota does.
pub fn footprint<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> usize {
    entries.map(|(k, v)| k.len() + v.len()).sum()
}
