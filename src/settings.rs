//! Persistent key-value settings and the credential gate.
//!
//! The settings repository is injectable so tests can substitute an
//! in-memory fake for the on-disk store.

use crate::error::{PromptPixError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Name of the settings entry holding the API key.
pub const CREDENTIAL_KEY: &str = "api_key";

/// Flat, process-wide string key-value store.
pub trait SettingsStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Returns true if a value is stored under `key`.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn lock_entries(entries: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    entries.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock_entries(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings persisted as a flat JSON object on disk.
///
/// Values are stored as plain text, matching the preference store this
/// replaces. See DESIGN.md for the at-rest encryption note.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading existing entries if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock_entries(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock_entries(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }
}

/// Gates the main generation flow behind a stored API key.
///
/// On startup the caller checks [`has_credential`](Self::has_credential);
/// while it is false the generation flow stays unavailable and a
/// credential-entry flow is presented instead. The first successful
/// [`set_credential`](Self::set_credential) opens the gate, and the value
/// persists across restarts through the backing store.
pub struct CredentialGate<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> CredentialGate<S> {
    /// Wraps `store` as the credential backing store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns true if a non-empty credential is stored.
    pub fn has_credential(&self) -> bool {
        self.store
            .get(CREDENTIAL_KEY)
            .is_some_and(|v| !v.is_empty())
    }

    /// Returns the stored credential, if any.
    pub fn credential(&self) -> Option<String> {
        self.store.get(CREDENTIAL_KEY).filter(|v| !v.is_empty())
    }

    /// Stores a newly submitted credential.
    ///
    /// Empty submissions are rejected with a logged warning; no other
    /// validation is performed.
    pub fn set_credential(&self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            tracing::warn!("submitted API key is empty, ignoring");
            return Err(PromptPixError::EmptyCredential);
        }
        self.store.set(CREDENTIAL_KEY, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(!store.contains("k"));
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert!(store.contains("k"));
    }

    #[test]
    fn test_gate_closed_without_credential() {
        let gate = CredentialGate::new(MemoryStore::new());
        assert!(!gate.has_credential());
        assert!(gate.credential().is_none());
    }

    #[test]
    fn test_gate_rejects_empty_submission() {
        let gate = CredentialGate::new(MemoryStore::new());
        assert!(matches!(
            gate.set_credential(""),
            Err(PromptPixError::EmptyCredential)
        ));
        assert!(matches!(
            gate.set_credential("   "),
            Err(PromptPixError::EmptyCredential)
        ));
        assert!(!gate.has_credential());
    }

    #[test]
    fn test_gate_opens_after_submission() {
        let gate = CredentialGate::new(MemoryStore::new());
        gate.set_credential("abc").unwrap();
        assert!(gate.has_credential());
        assert_eq!(gate.credential().as_deref(), Some("abc"));
    }

    #[test]
    fn test_json_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set(CREDENTIAL_KEY, "abc").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(CREDENTIAL_KEY).as_deref(), Some("abc"));
    }

    #[test]
    fn test_json_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }
}
