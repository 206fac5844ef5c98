// SQLite-backed KvMedium.
//
// Tables:
// - kv_entries: one row per key, value kept as serialized JSON text

use crate::core::storage::{KvMedium, StorageError};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteMedium {
    pool: Pool<Sqlite>,
    quota: Option<usize>,
}

impl SqliteMedium {
    pub async fn new(database_url: &str, quota: Option<usize>) -> anyhow::Result<Self> {
        // Ensure the file exists if it's a file path
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self { pool, quota };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Bytes used by every entry except `key`.
    async fn footprint_excluding(&self, key: &str) -> Result<usize, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
            FROM kv_entries WHERE key != ?
            "#,
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(row.get::<i64, _>(0) as usize)
    }
}

#[async_trait]
impl KvMedium for SqliteMedium {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.footprint_excluding(key).await? + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sqlite_persistence_roundtrip() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("resolutions.db");
        let db_path = db_path.to_str().unwrap();

        let medium = SqliteMedium::new(db_path, None).await.unwrap();
        medium.set_raw("resolutions", "[]".into()).await.unwrap();
        medium.set_raw("resolutions", "[\"x\"]".into()).await.unwrap();
        medium.set_raw("data-version", "1".into()).await.unwrap();
        drop(medium);

        let reopened = SqliteMedium::new(db_path, None).await.unwrap();
        assert_eq!(
            reopened.get_raw("resolutions").await.unwrap().as_deref(),
            Some("[\"x\"]")
        );
        assert_eq!(
            reopened.get_raw("data-version").await.unwrap().as_deref(),
            Some("1")
        );
        assert_eq!(reopened.get_raw("liked-resolutions").await.unwrap(), None);

        reopened.remove("resolutions").await.unwrap();
        assert_eq!(reopened.get_raw("resolutions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_quota() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("quota.db");

        let medium = SqliteMedium::new(db_path.to_str().unwrap(), Some(12))
            .await
            .unwrap();
        medium.set_raw("ab", "12345678".into()).await.unwrap();
        medium.set_raw("ab", "87654321".into()).await.unwrap();

        let err = medium.set_raw("cd", "1".into()).await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 13, quota: 12 }));
        assert_eq!(medium.get_raw("cd").await.unwrap(), None);
    }
}
