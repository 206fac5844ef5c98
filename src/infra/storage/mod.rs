// Implementations of the KvMedium port.

pub mod in_memory;
pub mod json_file_store;
pub mod sqlite_store;

pub use in_memory::InMemoryMedium;
pub use json_file_store::JsonFileMedium;
pub use sqlite_store::SqliteMedium;

use crate::config::{AppConfig, StorageBackend};
use crate::core::storage::KvMedium;
use std::sync::Arc;

/// Open the medium selected by `config`. Called once at start.
pub async fn open_medium(config: &AppConfig) -> anyhow::Result<Arc<dyn KvMedium>> {
    let medium: Arc<dyn KvMedium> = match config.backend {
        StorageBackend::Sqlite => {
            let path = config.sqlite_path();
            let url = path.to_string_lossy();
            Arc::new(SqliteMedium::new(&url, config.quota_bytes).await?)
        }
        StorageBackend::Json => {
            if config.quota_bytes.is_some() {
                tracing::warn!("RESOLUTIONS_QUOTA_BYTES is ignored by the json backend");
            }
            Arc::new(JsonFileMedium::new(config.json_path())?)
        }
        StorageBackend::Memory => match config.quota_bytes {
            Some(quota) => Arc::new(InMemoryMedium::with_quota(quota)),
            None => Arc::new(InMemoryMedium::new()),
        },
    };

    tracing::info!(backend = ?config.backend, "Storage medium opened");
    Ok(medium)
}
