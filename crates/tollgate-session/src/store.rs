//! The session store: the single source of truth for session state.
//!
//! Responsibilities:
//! - Running `register` / `login` against the issuer and recording the
//!   outcome
//! - Writing (and only it writing) the persisted session keys
//! - Rebuilding the in-memory record from storage and classifying it
//!   into a [`TrustState`]
//!
//! # Write ordering
//!
//! Storage has no transactions. Each transition writes its keys in an
//! order chosen so that stopping after any single write still restores to
//! a sensible state:
//!
//! - `logout` removes `token` first: without it the session already
//!   classifies as anonymous.
//! - `register` writes `justRegistered` last and grace expiry removes it
//!   first: it is the key that turns a grace session on.
//! - `login` writes `username` before `token`, so a token is never
//!   persisted without its owner.

use tollgate_storage::{Repository, StorageKey};
use tollgate_token::Credential;
use tracing::{debug, info, warn};

use crate::{
    Clock, Issuer, LOGIN_FAILED_MESSAGE, LoginFailure, LoginPayload, PersistedFlags,
    REGISTRATION_FAILED_MESSAGE, RegisterPayload, Registration, RequestStatus,
    SessionConfig, SessionError, SessionRecord, SystemClock, TrustState,
};

/// Keys removed by `logout`, in order.
const LOGOUT_ORDER: [StorageKey; 6] = [
    StorageKey::Token,
    StorageKey::Username,
    StorageKey::LegacyUser,
    StorageKey::JustRegistered,
    StorageKey::RegisteredUser,
    StorageKey::RegisteredAt,
];

/// Keys removed when the grace period ends, in order.
const GRACE_ORDER: [StorageKey; 3] = [
    StorageKey::JustRegistered,
    StorageKey::RegisteredUser,
    StorageKey::RegisteredAt,
];

/// Owns the session record and mediates every change to it.
///
/// Every operation takes `&mut self`, so no caller can observe a record
/// halfway through a transition, even across the `await` inside
/// `register` and `login`.
///
/// ## Lifecycle
///
/// ```text
///  restore() on start
///       │
///       ▼
///  [Anonymous] ──register()──→ [Grace] ──login()──→ [Authenticated]
///       ↑                         │                       │
///       │◄──── clear_grace() ─────┘                       │
///       │◄──────────────────── logout() ──────────────────┘
///       │◄──── discard_credential() ◄── [Expired] ◄── exp passes
/// ```
pub struct SessionStore<I, R, C = SystemClock> {
    issuer: I,
    repo: R,
    clock: C,
    config: SessionConfig,
    record: SessionRecord,
}

impl<I, R, C> SessionStore<I, R, C>
where
    I: Issuer,
    R: Repository,
    C: Clock,
{
    /// Creates a store with an empty record.
    ///
    /// Nothing is read from storage until [`restore`](Self::restore) is
    /// called; the runtime does that once at startup and then before
    /// every navigation decision.
    pub fn new(issuer: I, repo: R, clock: C, config: SessionConfig) -> Self {
        Self {
            issuer,
            repo,
            clock,
            config,
            record: SessionRecord::default(),
        }
    }

    // =====================================================================
    // Mutating operations
    // =====================================================================

    /// Registers a new account and opens the grace period.
    ///
    /// No credential is issued at registration. On success the user is
    /// provisionally trusted for [`SessionConfig::grace_period_secs`].
    /// A user already holding a live credential stays logged in and no
    /// grace period opens; a stale credential is discarded first.
    ///
    /// # Errors
    /// [`SessionError::Registration`] carrying the issuer's message when
    /// it sent one, otherwise [`REGISTRATION_FAILED_MESSAGE`]. Persisted
    /// data is left untouched on failure.
    pub async fn register(
        &mut self,
        payload: RegisterPayload,
    ) -> Result<Registration, SessionError> {
        self.record.status = RequestStatus::Loading;
        self.record.last_error = None;

        if let Err(source) = self.issuer.register(&payload).await {
            let message = source
                .rejection_message()
                .unwrap_or(REGISTRATION_FAILED_MESSAGE)
                .to_string();
            warn!(username = %payload.username, error = %source, "registration failed");
            self.record.status = RequestStatus::Error;
            self.record.last_error = Some(message.clone());
            return Err(SessionError::Registration { message, source });
        }

        let username = payload.username;
        match self.restore() {
            TrustState::Authenticated { username: held, .. } => {
                info!(
                    username = %username,
                    held = %held,
                    "registered while logged in, keeping session"
                );
                self.record.status = RequestStatus::Success;
                return Ok(Registration {
                    username,
                    deadline_ms: None,
                });
            }
            TrustState::Expired => self.discard_credential(),
            TrustState::Anonymous | TrustState::Grace { .. } => {}
        }

        let now = self.clock.now_millis();
        self.set(StorageKey::RegisteredUser, &username);
        self.set(StorageKey::RegisteredAt, &now.to_string());
        self.set(StorageKey::JustRegistered, "true");

        self.record.status = RequestStatus::Success;
        self.record.is_registered = true;
        self.record.username = Some(username.clone());

        let deadline_ms = self.grace_deadline(now);
        info!(username = %username, deadline_ms, "registered, grace period started");
        Ok(Registration {
            username,
            deadline_ms: Some(deadline_ms),
        })
    }

    /// Logs in and stores the issued credential.
    ///
    /// The credential is decoded before anything is stored; a token that
    /// does not decode is a failed login, never a stored token.
    ///
    /// # Errors
    /// [`SessionError::Login`], whatever went wrong. Its text and the
    /// record's `last_error` are always [`LOGIN_FAILED_MESSAGE`].
    pub async fn login(&mut self, payload: LoginPayload) -> Result<Credential, SessionError> {
        self.record.status = RequestStatus::Loading;
        self.record.last_error = None;

        let credential = match self.request_credential(&payload).await {
            Ok(credential) => credential,
            Err(failure) => {
                warn!(username = %payload.username, error = %failure, "login failed");
                self.record.status = RequestStatus::Error;
                self.record.last_error = Some(LOGIN_FAILED_MESSAGE.to_string());
                return Err(SessionError::Login(failure));
            }
        };

        let username = payload.username;
        self.set(StorageKey::Username, &username);
        self.remove(StorageKey::LegacyUser);
        self.set(StorageKey::Token, credential.as_str());
        self.remove_all(&GRACE_ORDER);

        self.record.token = Some(credential.clone());
        self.record.username = Some(username.clone());
        self.record.is_registered = false;
        self.record.status = RequestStatus::Success;

        info!(username = %username, role = ?credential.role(), "logged in");
        Ok(credential)
    }

    async fn request_credential(&self, payload: &LoginPayload) -> Result<Credential, LoginFailure> {
        let response = self.issuer.login(payload).await?;
        let raw = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(LoginFailure::MissingToken)?;
        Credential::parse(raw).map_err(LoginFailure::Undecodable)
    }

    /// Forgets everything, in memory and in storage. Always succeeds.
    pub fn logout(&mut self) {
        self.remove_all(&LOGOUT_ORDER);
        self.record = SessionRecord::default();
        info!("logged out");
    }

    /// Rebuilds the record from storage and classifies it for *now*.
    ///
    /// Makes no network call and may be called as often as needed; every
    /// call re-reads storage and the clock. Classification order is
    /// token presence → decode → expiry → grace flag: any persisted token,
    /// even one that no longer decodes, outranks a grace flag.
    ///
    /// Repairs it may write:
    /// - grace keys persisted next to a token are stale and get removed;
    /// - a grace flag without `registeredAt` gets stamped with now;
    /// - a lapsed grace period gets cleared.
    pub fn restore(&mut self) -> TrustState {
        let flags = PersistedFlags::load(&self.repo);
        let now = self.clock.now_millis();

        if let Some(raw) = flags.token.as_deref() {
            if flags.has_grace_flags() {
                warn!("token persisted alongside registration flags, keeping token");
                self.remove_all(&GRACE_ORDER);
            }
            return self.restore_credential(raw, flags.username, now);
        }

        if flags.just_registered {
            return self.restore_grace(flags.registered_user, flags.registered_at, now);
        }

        self.record.clear_identity();
        TrustState::Anonymous
    }

    fn restore_credential(
        &mut self,
        raw: &str,
        username: Option<String>,
        now: i64,
    ) -> TrustState {
        let credential = match Credential::parse(raw) {
            Ok(credential) => credential,
            Err(err) => {
                debug!(error = %err, "persisted token does not decode");
                self.record.clear_identity();
                return TrustState::Expired;
            }
        };

        if credential.is_expired(now) {
            debug!(expired_at = credential.expires_at_millis(), now, "persisted token expired");
            self.record.clear_identity();
            return TrustState::Expired;
        }

        let Some(username) =
            username.or_else(|| credential.claims().subject().map(str::to_owned))
        else {
            warn!("persisted token has no username and no subject claim");
            self.record.clear_identity();
            return TrustState::Expired;
        };

        let role = credential.role().map(str::to_owned);
        self.record.token = Some(credential);
        self.record.username = Some(username.clone());
        self.record.is_registered = false;
        self.record.status = RequestStatus::Success;
        TrustState::Authenticated { username, role }
    }

    fn restore_grace(
        &mut self,
        username: Option<String>,
        registered_at: Option<i64>,
        now: i64,
    ) -> TrustState {
        let entered_at = match registered_at {
            // A timestamp in the future can only come from clock skew or
            // tampering; never let it extend the window.
            Some(at) => at.min(now),
            None => {
                debug!("grace flag without timestamp, starting a fresh window");
                self.set(StorageKey::RegisteredAt, &now.to_string());
                now
            }
        };

        let deadline_ms = self.grace_deadline(entered_at);
        if now >= deadline_ms {
            info!(deadline_ms, "grace period lapsed");
            self.clear_grace();
            return TrustState::Anonymous;
        }

        self.record.token = None;
        self.record.username = username.clone();
        self.record.is_registered = true;
        TrustState::Grace {
            username,
            deadline_ms,
        }
    }

    /// Drops the credential from storage and memory. Idempotent.
    ///
    /// The guard calls this on an expired or undecodable token, before
    /// redirecting, so the next evaluation does not find it again.
    pub fn discard_credential(&mut self) {
        self.remove(StorageKey::Token);
        self.remove(StorageKey::Username);
        self.remove(StorageKey::LegacyUser);
        self.record.token = None;
        self.record.username = None;
        debug!("credential discarded");
    }

    /// Ends the grace period: removes the registration keys and drops the
    /// provisional identity. Idempotent.
    pub fn clear_grace(&mut self) {
        self.remove_all(&GRACE_ORDER);
        self.record.is_registered = false;
        if self.record.token.is_none() {
            self.record.username = None;
        }
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn status(&self) -> RequestStatus {
        self.record.status
    }

    pub fn token(&self) -> Option<&Credential> {
        self.record.token()
    }

    pub fn username(&self) -> Option<&str> {
        self.record.username()
    }

    pub fn role(&self) -> Option<&str> {
        self.record.role()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.record.last_error()
    }

    pub fn is_registered(&self) -> bool {
        self.record.is_registered
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    // =====================================================================
    // Helpers
    // =====================================================================

    fn grace_deadline(&self, entered_at: i64) -> i64 {
        entered_at.saturating_add(self.config.grace_period_millis())
    }

    fn set(&self, key: StorageKey, value: &str) {
        self.repo.set(key.as_str(), value);
    }

    fn remove(&self, key: StorageKey) {
        self.repo.remove(key.as_str());
    }

    fn remove_all(&self, keys: &[StorageKey]) {
        for key in keys {
            self.remove(*key);
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
