//! In-process [`Repository`] backed by a `HashMap`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::Repository;

/// A [`Repository`] that keeps everything in memory.
///
/// Cloning is cheap and clones share the same map, the way two tabs on
/// one origin share `localStorage`. Tests rely on this to simulate a page
/// reload: build a second session store over a clone of the repository
/// and check what it restores.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted snapshot of the stored keys, handy in assertions.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    // A panic while holding the lock cannot leave a HashMap half-written
    // in a way that matters here, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Repository for MemoryRepository {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key_returns_none() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.get("token"), None);
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let repo = MemoryRepository::new();
        repo.set("token", "abc");
        assert_eq!(repo.get("token").as_deref(), Some("abc"));
    }

    #[test]
    fn test_set_overwrites_previous_value() {
        let repo = MemoryRepository::new();
        repo.set("username", "alice");
        repo.set("username", "bob");
        assert_eq!(repo.get("username").as_deref(), Some("bob"));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let repo = MemoryRepository::new();
        repo.remove("token");
        repo.remove("token");
        assert!(repo.is_empty());
    }

    #[test]
    fn test_remove_deletes_only_that_key() {
        let repo = MemoryRepository::new();
        repo.set("token", "abc");
        repo.set("username", "alice");

        repo.remove("token");

        assert_eq!(repo.keys(), vec!["username".to_string()]);
    }

    #[test]
    fn test_clones_share_storage() {
        let repo = MemoryRepository::new();
        let reloaded = repo.clone();

        repo.set("justRegistered", "true");

        assert_eq!(reloaded.get("justRegistered").as_deref(), Some("true"));
    }
}
