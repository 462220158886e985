//! Settings module - the persisted key-value store and helpers around it.

mod memory_store;
mod settings_traits;

pub use memory_store::InMemorySettingsStore;
pub use settings_traits::SettingsStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::Result;

/// Reads a JSON-encoded value stored under `key`.
///
/// Returns `Ok(None)` when the key is absent. A value that does not parse is
/// reported as a corrupt store error so callers can decide whether to drop it.
pub fn read_json<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}

/// Stores `value` JSON-encoded under `key`.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn SettingsStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_helpers_round_trip_lists() {
        let store = InMemorySettingsStore::new();
        write_json(&store, "list", &vec![1, 2, 3]).unwrap();
        let loaded: Option<Vec<i32>> = read_json(&store, "list").unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn read_json_reports_corrupt_values() {
        let store = InMemorySettingsStore::new();
        store.set("list", "{not json").unwrap();
        let loaded: Result<Option<Vec<i32>>> = read_json(&store, "list");
        assert!(loaded.is_err());
    }

    #[test]
    fn read_json_treats_missing_and_blank_as_none() {
        let store = InMemorySettingsStore::new();
        store.set("blank", "  ").unwrap();
        assert!(read_json::<Vec<i32>>(&store, "missing").unwrap().is_none());
        assert!(read_json::<Vec<i32>>(&store, "blank").unwrap().is_none());
    }
}
