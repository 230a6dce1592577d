//! The remote issuer seam.
//!
//! Tollgate doesn't register users or mint credentials itself. That is
//! the backend's job. Instead it defines the [`Issuer`] trait: two async
//! methods mirroring the backend's `/users/register` and `/users/login`
//! endpoints. The `tollgate` crate ships an HTTP implementation; tests
//! use scripted ones.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::IssuerError;

/// Body of a registration request.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterPayload {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

/// Body of a login request.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

impl LoginPayload {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Payloads end up in `tracing` fields and panic messages; keep the
// password out of both.

impl fmt::Debug for RegisterPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterPayload")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPayload")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A successful (2xx) login response.
///
/// `token` is optional on purpose: a 2xx without one is a protocol
/// failure the store must handle, not a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The remote service that registers users and issues credentials.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → the issuer is owned by the session runtime,
///   which lives in its own Tokio task for the life of the app.
/// - The returned futures are `Send` for the same reason.
///
/// # Example
///
/// ```rust
/// use tollgate_session::{Issuer, IssuerError, LoginPayload, LoginResponse, RegisterPayload};
///
/// /// Refuses everything. Useful for exercising error paths.
/// struct ClosedIssuer;
///
/// impl Issuer for ClosedIssuer {
///     async fn register(&self, _: &RegisterPayload) -> Result<(), IssuerError> {
///         Err(IssuerError::Rejected { status: 503, message: Some("Registrations closed".into()) })
///     }
///
///     async fn login(&self, _: &LoginPayload) -> Result<LoginResponse, IssuerError> {
///         Err(IssuerError::Unreachable("maintenance".into()))
///     }
/// }
/// ```
pub trait Issuer: Send + Sync + 'static {
    /// Creates an account. No credential is issued at this point.
    fn register(
        &self,
        payload: &RegisterPayload,
    ) -> impl std::future::Future<Output = Result<(), IssuerError>> + Send;

    /// Exchanges username and password for a signed credential.
    fn login(
        &self,
        payload: &LoginPayload,
    ) -> impl std::future::Future<Output = Result<LoginResponse, IssuerError>> + Send;
}
