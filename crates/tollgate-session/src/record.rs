//! Session types: the data a [`SessionStore`](crate::SessionStore) owns
//! and the classification it hands to the guard.
//!
//! - WHO is using the app (`username`, derived `role`)
//! - WHAT credential backs that claim (`token`)
//! - HOW the last mutating request went (`status`, `last_error`)
//! - WHETHER they are in the post-registration grace window

use std::fmt;
use std::time::Duration;

use tollgate_token::Credential;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long (in seconds) a freshly registered user is provisionally
    /// trusted before they must log in.
    ///
    /// Default: 30 minutes.
    pub grace_period_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 30 * 60,
        }
    }
}

impl SessionConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    pub(crate) fn grace_period_millis(&self) -> i64 {
        i64::try_from(self.grace_period_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle of the last mutating request (`register` / `login`).
///
/// This is about the *request*, not about trust: a user can be fully
/// authenticated while `status` is `Error` from a failed re-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// The in-memory session, owned exclusively by a `SessionStore`.
///
/// Fields are private: the only way to change a record is through a store
/// operation, which keeps two invariants:
///
/// - a token is present ⇒ a username is present;
/// - the role always comes from the token's claims (there is no role
///   field to get out of sync).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub(crate) status: RequestStatus,
    pub(crate) token: Option<Credential>,
    pub(crate) username: Option<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) is_registered: bool,
}

impl SessionRecord {
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn token(&self) -> Option<&Credential> {
        self.token.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Role from the current token's claims.
    pub fn role(&self) -> Option<&str> {
        self.token.as_ref().and_then(Credential::role)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `true` between a successful registration and the first login
    /// (or the end of the grace window).
    pub fn is_registered(&self) -> bool {
        self.is_registered
    }

    /// Forgets identity (token, username, grace) but keeps the request
    /// status, so an error message survives a navigation.
    pub(crate) fn clear_identity(&mut self) {
        self.token = None;
        self.username = None;
        self.is_registered = false;
    }
}

// ---------------------------------------------------------------------------
// TrustState
// ---------------------------------------------------------------------------

/// How far the current user is trusted, derived fresh for each decision.
///
/// ```text
///                 register()                 login()
///   Anonymous ─────────────────→ Grace ─────────────────→ Authenticated
///       ↑                          │                           │
///       └──── 30 min elapse ───────┘                    exp passes
///       ↑                                                      ▼
///       └───────────── guard clears token ─────────────── Expired
/// ```
///
/// Never stored: caching it would mean acting on a stale clock reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustState {
    /// No credential, no grace period.
    Anonymous,

    /// Registered but not logged in yet. Provisionally trusted until
    /// `deadline_ms` (epoch millis). `username` is the name chosen at
    /// registration, when it was persisted.
    Grace {
        username: Option<String>,
        deadline_ms: i64,
    },

    /// Holding an unexpired credential.
    Authenticated {
        username: String,
        role: Option<String>,
    },

    /// Holding a credential that has expired or does not decode.
    Expired,
}

impl TrustState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn is_grace(&self) -> bool {
        matches!(self, Self::Grace { .. })
    }

    /// Authenticated or in grace: allowed onto protected views.
    pub fn is_trusted(&self) -> bool {
        self.is_authenticated() || self.is_grace()
    }
}

impl fmt::Display for TrustState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::Grace { .. } => write!(f, "Grace"),
            Self::Authenticated { .. } => write!(f, "Authenticated"),
            Self::Expired => write!(f, "Expired"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Outcome of a successful `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    /// When the grace period ends, in epoch millis. `None` when the user
    /// was already logged in and no grace period opened.
    pub deadline_ms: Option<i64>,
}
