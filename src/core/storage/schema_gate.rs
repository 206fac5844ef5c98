// Schema version gate.
//
// Runs once at start, before any resolution data is opened. Governed keys are
// removed first and the version bumped last, so an interrupted migration is
// simply repeated on the next start.

use super::kv_medium::{KvMedium, StorageError};

/// Reserved key holding the schema version of the stored data.
pub const DATA_VERSION_KEY: &str = "data-version";

/// What the gate did on this start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Stored data already matches the running schema.
    UpToDate { version: u32 },
    /// Stale data was cleared and the version advanced.
    Reset { from: u32, to: u32 },
    /// A stale key could not be cleared. The version was left at `from`,
    /// so the next start tries again; governed values must not be loaded
    /// from the medium on this run.
    ResetIncomplete { from: u32, to: u32 },
}

impl MigrationOutcome {
    /// Whether governed keys may be read from the medium.
    pub fn data_is_current(&self) -> bool {
        !matches!(self, MigrationOutcome::ResetIncomplete { .. })
    }
}

pub struct SchemaGate<'a> {
    current_version: u32,
    governed_keys: &'a [&'a str],
}

impl<'a> SchemaGate<'a> {
    pub fn new(current_version: u32, governed_keys: &'a [&'a str]) -> Self {
        Self {
            current_version,
            governed_keys,
        }
    }

    /// Bring the medium up to `current_version`.
    ///
    /// A missing or unreadable version counts as 0. The version is only
    /// bumped once every governed key is gone; a failed removal leaves the
    /// old version in place. A failed bump after a full clear is harmless:
    /// the next start clears the (already empty) keys again.
    pub async fn run(&self, medium: &dyn KvMedium) -> MigrationOutcome {
        let stored = self.stored_version(medium).await;

        if stored >= self.current_version {
            tracing::debug!(version = stored, "Stored data is up to date");
            return MigrationOutcome::UpToDate { version: stored };
        }

        tracing::info!(
            from = stored,
            to = self.current_version,
            "Stored data predates current schema, resetting"
        );

        let mut all_cleared = true;
        for key in self.governed_keys {
            if let Err(e) = medium.remove(key).await {
                tracing::error!(key, error = %e, "Failed to clear stale key");
                all_cleared = false;
            }
        }

        if !all_cleared {
            tracing::warn!(
                version = stored,
                "Schema version left unchanged until stale data can be cleared"
            );
            return MigrationOutcome::ResetIncomplete {
                from: stored,
                to: self.current_version,
            };
        }

        if let Err(e) = self.write_version(medium).await {
            tracing::error!(error = %e, "Failed to record schema version");
        }

        MigrationOutcome::Reset {
            from: stored,
            to: self.current_version,
        }
    }

    async fn stored_version(&self, medium: &dyn KvMedium) -> u32 {
        super::persistent_value::read_or_default(medium, DATA_VERSION_KEY, &0u32).await
    }

    async fn write_version(&self, medium: &dyn KvMedium) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.current_version)?;
        medium.set_raw(DATA_VERSION_KEY, raw).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Counts removals so the tests can assert how often data was wiped.
    #[derive(Default)]
    struct CountingMedium {
        entries: DashMap<String, String>,
        removals: AtomicU32,
        reject_removals: AtomicBool,
    }

    #[async_trait]
    impl KvMedium for CountingMedium {
        async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.entries.get(key).map(|v| v.clone()))
        }

        async fn set_raw(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.entries.insert(key.to_string(), value);
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.reject_removals.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("medium is read-only".into()));
            }
            self.removals.fetch_add(1, Ordering::SeqCst);
            self.entries.remove(key);
            Ok(())
        }
    }

    const KEYS: &[&str] = &["resolutions"];

    #[tokio::test]
    async fn test_fresh_medium_is_reset_once() {
        let medium = CountingMedium::default();
        let gate = SchemaGate::new(2, KEYS);

        assert_eq!(gate.run(&medium).await, MigrationOutcome::Reset { from: 0, to: 2 });
        assert_eq!(gate.run(&medium).await, MigrationOutcome::UpToDate { version: 2 });
        assert_eq!(gate.run(&medium).await, MigrationOutcome::UpToDate { version: 2 });
        assert_eq!(medium.removals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_data_is_cleared_and_version_bumped() {
        let medium = CountingMedium::default();
        medium.set_raw("data-version", "1".into()).await.unwrap();
        medium.set_raw("resolutions", "[1,2]".into()).await.unwrap();
        medium.set_raw("liked-resolutions", "[\"a\"]".into()).await.unwrap();

        let outcome = SchemaGate::new(2, KEYS).run(&medium).await;

        assert_eq!(outcome, MigrationOutcome::Reset { from: 1, to: 2 });
        assert!(medium.get_raw("resolutions").await.unwrap().is_none());
        assert_eq!(medium.get_raw("data-version").await.unwrap().as_deref(), Some("2"));
        // Keys outside the schema are left alone.
        assert!(medium.get_raw("liked-resolutions").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_current_data_is_never_cleared() {
        let medium = CountingMedium::default();
        medium.set_raw("data-version", "2".into()).await.unwrap();
        medium.set_raw("resolutions", "[1]".into()).await.unwrap();

        for _ in 0..3 {
            let outcome = SchemaGate::new(2, KEYS).run(&medium).await;
            assert_eq!(outcome, MigrationOutcome::UpToDate { version: 2 });
        }

        assert_eq!(medium.removals.load(Ordering::SeqCst), 0);
        assert_eq!(medium.get_raw("resolutions").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_unreadable_version_counts_as_zero() {
        let medium = CountingMedium::default();
        medium.set_raw("data-version", "\"banana\"".into()).await.unwrap();

        let outcome = SchemaGate::new(1, KEYS).run(&medium).await;

        assert_eq!(outcome, MigrationOutcome::Reset { from: 0, to: 1 });
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_old_version() {
        let medium = CountingMedium::default();
        medium.set_raw("data-version", "0".into()).await.unwrap();
        medium.set_raw("resolutions", "[\"stale\"]".into()).await.unwrap();
        medium.reject_removals.store(true, Ordering::SeqCst);
        let gate = SchemaGate::new(1, KEYS);

        let first = gate.run(&medium).await;
        let second = gate.run(&medium).await;

        assert_eq!(first, MigrationOutcome::ResetIncomplete { from: 0, to: 1 });
        assert_eq!(second, MigrationOutcome::ResetIncomplete { from: 0, to: 1 });
        assert!(!first.data_is_current());
        assert_eq!(medium.get_raw("data-version").await.unwrap().as_deref(), Some("0"));

        // Once the medium recovers the next start finishes the reset.
        medium.reject_removals.store(false, Ordering::SeqCst);
        assert_eq!(gate.run(&medium).await, MigrationOutcome::Reset { from: 0, to: 1 });
        assert!(medium.get_raw("resolutions").await.unwrap().is_none());
        assert_eq!(medium.get_raw("data-version").await.unwrap().as_deref(), Some("1"));
    }
}
