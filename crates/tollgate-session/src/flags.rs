//! Typed view over the persisted session keys.

use tollgate_storage::{Repository, StorageKey};

/// Everything the session layer keeps in durable storage, read in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedFlags {
    pub token: Option<String>,
    /// `username`, falling back to the legacy `user` key.
    pub username: Option<String>,
    /// `justRegistered == "true"`. Any other value counts as unset.
    pub just_registered: bool,
    pub registered_user: Option<String>,
    /// Epoch millis; `None` when absent or not a number.
    pub registered_at: Option<i64>,
}

impl PersistedFlags {
    pub fn load(repo: &impl Repository) -> Self {
        let get = |key: StorageKey| repo.get(key.as_str()).filter(|v| !v.is_empty());

        Self {
            token: get(StorageKey::Token),
            username: get(StorageKey::Username).or_else(|| get(StorageKey::LegacyUser)),
            just_registered: get(StorageKey::JustRegistered).as_deref() == Some("true"),
            registered_user: get(StorageKey::RegisteredUser),
            registered_at: get(StorageKey::RegisteredAt).and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Whether any registration-related key is set.
    pub fn has_grace_flags(&self) -> bool {
        self.just_registered || self.registered_user.is_some() || self.registered_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use tollgate_storage::MemoryRepository;

    use super::*;

    #[test]
    fn test_load_empty_repository() {
        let flags = PersistedFlags::load(&MemoryRepository::new());
        assert_eq!(flags, PersistedFlags::default());
        assert!(!flags.has_grace_flags());
    }

    #[test]
    fn test_load_falls_back_to_legacy_user_key() {
        let repo = MemoryRepository::new();
        repo.set("user", "old-alice");
        assert_eq!(PersistedFlags::load(&repo).username.as_deref(), Some("old-alice"));

        repo.set("username", "alice");
        assert_eq!(PersistedFlags::load(&repo).username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_load_just_registered_requires_literal_true() {
        let repo = MemoryRepository::new();
        repo.set("justRegistered", "yes");
        assert!(!PersistedFlags::load(&repo).just_registered);

        repo.set("justRegistered", "true");
        assert!(PersistedFlags::load(&repo).just_registered);
    }

    #[test]
    fn test_load_ignores_unparseable_timestamp() {
        let repo = MemoryRepository::new();
        repo.set("registeredAt", "yesterday");
        assert_eq!(PersistedFlags::load(&repo).registered_at, None);

        repo.set("registeredAt", "1700000000000");
        assert_eq!(PersistedFlags::load(&repo).registered_at, Some(1_700_000_000_000));
    }

    #[test]
    fn test_load_treats_empty_strings_as_absent() {
        let repo = MemoryRepository::new();
        repo.set("token", "");
        assert_eq!(PersistedFlags::load(&repo).token, None);
    }
}
