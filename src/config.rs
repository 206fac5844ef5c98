// Runtime configuration, read from the environment (and `.env` if present).

use anyhow::{bail, Context};
use std::path::PathBuf;

/// Which durable medium backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Json,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "json" => Ok(StorageBackend::Json),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown storage backend '{other}' (expected sqlite, json or memory)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    /// Grants delete rights in the gallery.
    pub owner: bool,
    pub quota_bytes: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            data_dir: PathBuf::from("data"),
            owner: false,
            quota_bytes: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let backend = match lookup("RESOLUTIONS_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.backend,
        };

        let data_dir = lookup("RESOLUTIONS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let owner = match lookup("RESOLUTIONS_OWNER") {
            Some(value) => value
                .trim()
                .parse::<bool>()
                .with_context(|| format!("RESOLUTIONS_OWNER must be true or false, got '{value}'"))?,
            None => defaults.owner,
        };

        let quota_bytes = match lookup("RESOLUTIONS_QUOTA_BYTES") {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("RESOLUTIONS_QUOTA_BYTES must be a byte count, got '{value}'"))?,
            ),
            None => defaults.quota_bytes,
        };

        Ok(Self {
            backend,
            data_dir,
            owner,
            quota_bytes,
        })
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("resolutions.db")
    }

    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join("resolutions.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(!config.owner);
        assert_eq!(config.quota_bytes, None);
        assert_eq!(config.sqlite_path(), PathBuf::from("data/resolutions.db"));
    }

    #[test]
    fn test_reads_all_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("RESOLUTIONS_BACKEND", "JSON"),
            ("RESOLUTIONS_DATA_DIR", "/tmp/wall"),
            ("RESOLUTIONS_OWNER", "true"),
            ("RESOLUTIONS_QUOTA_BYTES", "5242880"),
        ]))
        .unwrap();

        assert_eq!(config.backend, StorageBackend::Json);
        assert_eq!(config.json_path(), PathBuf::from("/tmp/wall/resolutions.json"));
        assert!(config.owner);
        assert_eq!(config.quota_bytes, Some(5_242_880));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup_from(&[("RESOLUTIONS_BACKEND", "redis")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("RESOLUTIONS_OWNER", "yes")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("RESOLUTIONS_QUOTA_BYTES", "-1")])).is_err());
    }
}
