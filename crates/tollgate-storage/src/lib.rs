//! Durable key-value persistence for Tollgate sessions.
//!
//! Provides the [`Repository`] trait that abstracts over where session
//! data survives a page reload (browser `localStorage`, an in-memory map
//! in tests, anything else a host provides).
//!
//! A repository stores strings under string keys and nothing more: it
//! never inspects or interprets values. Deciding what a missing token or
//! a stale flag *means* is the session layer's job.
//!
//! # Feature Flags
//!
//! - `web`: [`WebStorageRepository`] backed by `window.localStorage`
//!   via `web-sys`

mod memory;
#[cfg(feature = "web")]
mod web;

pub use memory::MemoryRepository;
#[cfg(feature = "web")]
pub use web::WebStorageRepository;

use std::fmt;

/// Names of the keys the session layer persists.
///
/// Kept here so every backend and every test agrees on the exact strings
/// (they are shared with whatever else runs on the same origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The raw bearer credential.
    Token,
    /// The username the credential belongs to.
    Username,
    /// Older clients stored the username under `user`. Read as a
    /// fallback, always cleared alongside [`Username`](Self::Username).
    LegacyUser,
    /// `"true"` between registration and first login.
    JustRegistered,
    /// The username chosen at registration.
    RegisteredUser,
    /// Epoch milliseconds of the moment registration succeeded.
    RegisteredAt,
}

impl StorageKey {
    /// The literal key string used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Username => "username",
            Self::LegacyUser => "user",
            Self::JustRegistered => "justRegistered",
            Self::RegisteredUser => "registeredUser",
            Self::RegisteredAt => "registeredAt",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous, idempotent key-value storage.
///
/// # Contract
///
/// - All operations complete before returning.
/// - Operations are infallible from the caller's point of view. A backend
///   that can fail (quota exceeded, storage disabled) logs and carries on.
/// - `remove` on an absent key is a no-op, and `set` to the current value
///   changes nothing.
///
/// Methods take `&self`: storage is shared, process-wide state, so
/// implementations use interior mutability.
pub trait Repository: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Deletes `key`. Absent keys are ignored.
    fn remove(&self, key: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_strings_match_persisted_schema() {
        assert_eq!(StorageKey::Token.as_str(), "token");
        assert_eq!(StorageKey::Username.as_str(), "username");
        assert_eq!(StorageKey::LegacyUser.as_str(), "user");
        assert_eq!(StorageKey::JustRegistered.as_str(), "justRegistered");
        assert_eq!(StorageKey::RegisteredUser.as_str(), "registeredUser");
        assert_eq!(StorageKey::RegisteredAt.as_str(), "registeredAt");
    }

    #[test]
    fn test_storage_key_display() {
        assert_eq!(StorageKey::JustRegistered.to_string(), "justRegistered");
    }
}
