// Typed, cached view of one key in a `KvMedium`.
//
// Reads never fail: a missing or corrupt entry yields the default.
// Writes never fail either: if the medium rejects the write, the error is
// logged and the in-memory copy still advances so callers stay responsive.

use super::kv_medium::{KvMedium, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The argument of [`PersistentValue::set`]: either a replacement value or a
/// pure function of the current value.
pub enum Update<T> {
    Value(T),
    Transform(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Update<T> {
    /// Build a read-modify-write update from a closure.
    pub fn with(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Update::Transform(Box::new(f))
    }

    fn apply(self, current: &T) -> T {
        match self {
            Update::Value(value) => value,
            Update::Transform(f) => f(current),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Update::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Update::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// One key of the medium, deserialized into `T` and kept in memory.
///
/// The mutex is held across the durable write, so a `set` that returns has
/// already reached the medium (or logged why it could not).
pub struct PersistentValue<T> {
    key: String,
    default: T,
    medium: Arc<dyn KvMedium>,
    current: Mutex<T>,
}

impl<T> PersistentValue<T>
where
    T: Serialize + DeserializeOwned + Clone + Send,
{
    /// Load `key` from the medium, falling back to `default`.
    pub async fn open(medium: Arc<dyn KvMedium>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let current = read_or_default(medium.as_ref(), &key, &default).await;

        Self {
            key,
            default,
            medium,
            current: Mutex::new(current),
        }
    }

    /// Snapshot of the current value.
    pub async fn get(&self) -> T {
        self.current.lock().await.clone()
    }

    /// Apply `update`, persist the result and return it.
    pub async fn set(&self, update: Update<T>) -> T {
        let mut current = self.current.lock().await;
        let next = update.apply(&current);
        self.commit(&mut current, next).await
    }

    /// Read-modify-write that also returns something the transform learned,
    /// such as whether an insert was new. Same lock and persistence as `set`.
    pub async fn set_with<R>(&self, f: impl FnOnce(&T) -> (T, R)) -> R {
        let mut current = self.current.lock().await;
        let (next, result) = f(&current);
        self.commit(&mut current, next).await;
        result
    }

    async fn commit(&self, current: &mut T, next: T) -> T {
        if let Err(e) = self.persist(&next).await {
            tracing::error!(key = %self.key, error = %e, "Failed to persist value; continuing in memory");
        }

        *current = next.clone();
        next
    }

    /// Remove the durable entry and reset to the default.
    ///
    /// The in-memory value is reset even when the removal fails.
    pub async fn clear(&self) {
        let mut current = self.current.lock().await;

        if let Err(e) = self.medium.remove(&self.key).await {
            tracing::error!(key = %self.key, error = %e, "Failed to remove stored value");
        }

        *current = self.default.clone();
    }

    async fn persist(&self, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.medium.set_raw(&self.key, raw).await
    }
}

/// Read and deserialize `key`, treating every failure like absence.
pub async fn read_or_default<T>(medium: &dyn KvMedium, key: &str, default: &T) -> T
where
    T: DeserializeOwned + Clone,
{
    match medium.get_raw(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, error = %e, "Stored value is unreadable; using default");
                default.clone()
            }
        },
        Ok(None) => default.clone(),
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to load stored value; using default");
            default.clone()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
