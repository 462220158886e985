//! Omie Storage File - a [`SettingsStore`] kept in one JSON file.
//!
//! Entries are written as `{ "version": 1, "entries": { ... } }`. When an
//! encryption key is configured the same document is sealed with
//! ChaCha20-Poly1305 and stored as `{ "version", "nonce", "ciphertext" }`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use log::debug;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use omie_core::errors::{Result, StorageError};
use omie_core::settings::SettingsStore;

const CURRENT_VERSION: u32 = 1;

#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    encryption_key: Option<[u8; 32]>,
    lock: Mutex<()>,
}

#[derive(Serialize, Deserialize, Default)]
struct PlainEntries {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize)]
struct EncryptedEntries {
    version: u32,
    nonce: String,
    ciphertext: String,
}

impl FileSettingsStore {
    /// Open (lazily) the store at `path`. A blank `encryption_key` means
    /// plaintext.
    pub fn new(path: impl Into<PathBuf>, encryption_key: Option<&str>) -> Result<Self> {
        let key = match encryption_key {
            Some(value) if !value.trim().is_empty() => Some(decode_encryption_key(value)?),
            _ => None,
        };

        Ok(Self {
            path: path.into(),
            encryption_key: key,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.is_some()
    }

    fn with_entries<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        let mut entries = self.load_locked()?;
        op(&mut entries);
        self.persist_locked(&entries)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let _guard = self.lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        self.load_locked()
    }

    #[allow(deprecated)]
    fn load_locked(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read(&self.path)
            .map_err(|e| StorageError::ReadFailed(format!("{}: {}", self.path.display(), e)))?;
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }

        let value: serde_json::Value = serde_json::from_slice(&raw)?;

        if value.get("ciphertext").is_some() {
            let key = self.encryption_key.ok_or_else(|| {
                StorageError::Encryption(
                    "OMIE_STORE_KEY must be set to open the encrypted store".into(),
                )
            })?;
            let enc: EncryptedEntries = serde_json::from_value(value)?;
            let nonce_bytes = BASE64
                .decode(enc.nonce)
                .map_err(|e| StorageError::Encryption(format!("Failed to decode nonce: {e}")))?;
            let cipher_bytes = BASE64.decode(enc.ciphertext).map_err(|e| {
                StorageError::Encryption(format!("Failed to decode ciphertext: {e}"))
            })?;
            if nonce_bytes.len() != 12 {
                return Err(StorageError::Encryption("Nonce must be 12 bytes".into()).into());
            }

            let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
            let nonce = Nonce::from_slice(&nonce_bytes);
            let plaintext = cipher
                .decrypt(nonce, cipher_bytes.as_ref())
                .map_err(|_| StorageError::Encryption("Failed to decrypt store".into()))?;
            let plain: PlainEntries = serde_json::from_slice(&plaintext)?;
            Ok(plain.entries)
        } else {
            let plain: PlainEntries = serde_json::from_value(value)?;
            Ok(plain.entries)
        }
    }

    #[allow(deprecated)]
    fn persist_locked(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        }

        let plain = PlainEntries {
            version: CURRENT_VERSION,
            entries: entries.clone(),
        };

        let json = if let Some(key) = self.encryption_key {
            let serialized = serde_json::to_vec(&plain)?;
            let mut nonce_bytes = [0u8; 12];
            OsRng.fill_bytes(&mut nonce_bytes);
            let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
            let nonce = Nonce::from_slice(&nonce_bytes);
            let ciphertext = cipher
                .encrypt(nonce, serialized.as_ref())
                .map_err(|_| StorageError::Encryption("Failed to encrypt store".into()))?;
            serde_json::to_string_pretty(&EncryptedEntries {
                version: CURRENT_VERSION,
                nonce: BASE64.encode(nonce_bytes),
                ciphertext: BASE64.encode(ciphertext),
            })?
        } else {
            serde_json::to_string_pretty(&plain)?
        };

        fs::write(&self.path, json)
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", self.path.display(), e)))?;
        debug!("[Store] Wrote {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

/// Accepts a base64 string or a 32-character ASCII value.
pub fn decode_encryption_key(raw: &str) -> Result<[u8; 32]> {
    let trimmed = raw.trim();
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            return Err(StorageError::Encryption(
                "OMIE_STORE_KEY must be a base64 string or 32-byte ascii value".into(),
            )
            .into())
        }
    };

    if decoded.len() != 32 {
        return Err(
            StorageError::Encryption("OMIE_STORE_KEY must decode to exactly 32 bytes".into())
                .into(),
        );
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&decoded);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use omie_core::errors::Error;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("store.json"), None).unwrap();
        assert!(store.get("omie_app_key").unwrap().is_none());
    }

    #[test]
    fn entries_persist_across_instances() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("store.json");
        let store = FileSettingsStore::new(file.clone(), None).unwrap();

        store.set("omie_app_key", "123").unwrap();
        store.set("omie_use_proxy", "false").unwrap();
        store.remove("omie_use_proxy").unwrap();

        let reopened = FileSettingsStore::new(file.clone(), None).unwrap();
        assert_eq!(reopened.get("omie_app_key").unwrap().as_deref(), Some("123"));
        assert!(reopened.get("omie_use_proxy").unwrap().is_none());

        let raw = fs::read_to_string(file).unwrap();
        assert!(raw.contains("\"entries\""));
    }

    #[test]
    fn encrypted_store_hides_values() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("store.json");
        let key = BASE64.encode([7u8; 32]);
        let store = FileSettingsStore::new(file.clone(), Some(&key)).unwrap();
        assert!(store.is_encrypted());

        store.set("omie_app_secret", "very-secret").unwrap();
        assert_eq!(
            store.get("omie_app_secret").unwrap().as_deref(),
            Some("very-secret")
        );

        let raw = fs::read_to_string(&file).unwrap();
        assert!(raw.contains("ciphertext"));
        assert!(!raw.contains("very-secret"));
    }

    #[test]
    fn encrypted_store_needs_the_key() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("store.json");
        let key = "0123456789abcdef0123456789abcde!";
        FileSettingsStore::new(file.clone(), Some(key))
            .unwrap()
            .set("omie_app_key", "k")
            .unwrap();

        let without_key = FileSettingsStore::new(file.clone(), None).unwrap();
        assert!(matches!(
            without_key.get("omie_app_key"),
            Err(Error::Storage(StorageError::Encryption(_)))
        ));

        let wrong_key = FileSettingsStore::new(file, Some(&BASE64.encode([1u8; 32]))).unwrap();
        assert!(wrong_key.get("omie_app_key").is_err());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("store.json");
        fs::write(&file, "{not json").unwrap();

        let store = FileSettingsStore::new(file, None).unwrap();
        assert!(matches!(
            store.get("omie_app_key"),
            Err(Error::Storage(StorageError::Corrupt(_)))
        ));
    }

    #[test]
    fn rejects_short_keys() {
        assert!(FileSettingsStore::new("store.json", Some("short")).is_err());
        assert!(FileSettingsStore::new("store.json", Some("   ")).is_ok());
    }
}
