//! API key storage.
//!
//! The executor reads the API key through a [`CredentialProvider`] at the
//! start of every call and never caches it, so a key saved by a sign-in flow
//! is picked up by the very next request.
//!
//! Platform secure storage lives outside this crate; implement
//! [`CredentialProvider`] over it. [`MemoryCredentialStore`] is provided for
//! tests and for processes that receive the key at startup.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::ApiKey;

/// Storage key under which the API key is kept.
pub const API_KEY_STORAGE_KEY: &str = "x-api-key";

/// Reads and writes the stored API key.
pub trait CredentialProvider: Send + Sync {
    /// Returns the stored key, or `None` if nothing is stored.
    fn fetch(&self) -> Option<ApiKey>;

    /// Stores `key`. Saving `None` leaves the store untouched.
    fn save(&self, key: Option<ApiKey>);
}

/// An in-process credential store.
///
/// # Example
///
/// ```rust
/// use lyst_network::{ApiKey, CredentialProvider, MemoryCredentialStore};
///
/// let store = MemoryCredentialStore::new();
/// assert!(store.fetch().is_none());
///
/// store.save(Some(ApiKey::new("K1").unwrap()));
/// store.save(None);
/// assert_eq!(store.fetch().unwrap().as_ref(), "K1");
/// ```
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<&'static str, ApiKey>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `key`.
    #[must_use]
    pub fn with_key(key: ApiKey) -> Self {
        let store = Self::new();
        store.save(Some(key));
        store
    }

    /// Removes the stored key, e.g. on sign-out.
    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(API_KEY_STORAGE_KEY);
    }
}

impl CredentialProvider for MemoryCredentialStore {
    fn fetch(&self) -> Option<ApiKey> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(API_KEY_STORAGE_KEY).cloned()
    }

    fn save(&self, key: Option<ApiKey>) {
        let Some(key) = key else {
            return;
        };
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(API_KEY_STORAGE_KEY, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_store_fetches_none() {
        assert!(MemoryCredentialStore::new().fetch().is_none());
    }

    #[test]
    fn test_save_none_is_a_no_op() {
        let store = MemoryCredentialStore::with_key(ApiKey::new("K1").unwrap());
        store.save(None);
        assert_eq!(store.fetch(), Some(ApiKey::new("K1").unwrap()));
    }

    #[test]
    fn test_save_replaces_existing_key() {
        let store = MemoryCredentialStore::with_key(ApiKey::new("K1").unwrap());
        store.save(Some(ApiKey::new("K2").unwrap()));
        assert_eq!(store.fetch().unwrap().as_ref(), "K2");
    }

    #[test]
    fn test_clear_removes_key() {
        let store = MemoryCredentialStore::with_key(ApiKey::new("K1").unwrap());
        store.clear();
        assert!(store.fetch().is_none());
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let store = Arc::new(MemoryCredentialStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.save(Some(ApiKey::new(format!("K{i}")).unwrap()));
                    store.fetch().is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
