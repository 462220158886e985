//! Storage trait for persisted settings.

use crate::errors::Result;

/// Flat string key-value store holding everything the dashboard persists:
/// credential fields, saved profiles and the connection log.
///
/// Implementations must make each call atomic on its own; callers that need
/// read-modify-write sequences serialize them at a higher level.
pub trait SettingsStore: Send + Sync {
    /// Get the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
