//! Browser [`Repository`] backed by `window.localStorage`.

use web_sys::Storage;

use crate::Repository;

/// A [`Repository`] over the page's `localStorage`.
///
/// Holds no handle of its own: the storage object is looked up on every
/// call, so the type stays `Send + Sync` and works after the page swaps
/// documents. When storage is unavailable (private mode, sandboxed
/// iframe, non-browser host) reads return `None` and writes are dropped
/// with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStorageRepository;

impl WebStorageRepository {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl Repository for WebStorageRepository {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            tracing::warn!(key, "localStorage unavailable, write dropped");
            return;
        };
        if storage.set_item(key, value).is_err() {
            tracing::warn!(key, "localStorage rejected write");
        }
    }

    fn remove(&self, key: &str) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if storage.remove_item(key).is_err() {
            tracing::warn!(key, "localStorage rejected removal");
        }
    }
}
