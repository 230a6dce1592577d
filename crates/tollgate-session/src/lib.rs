//! Session state management for Tollgate.
//!
//! This crate owns everything about "who is using the app right now":
//!
//! 1. **Issuer seam**: talking to the remote service that registers
//!    users and hands out credentials ([`Issuer`] trait)
//! 2. **Session state**: the in-memory [`SessionRecord`] and the
//!    operations that change it ([`SessionStore`])
//! 3. **Trust classification**: deriving a [`TrustState`] from what is
//!    persisted, for the navigation guard to act on
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard / Runtime (above)  ← asks for a TrustState on every navigation
//!     ↕
//! Session Layer (this crate)  ← the only writer of persisted session data
//!     ↕
//! Token + Storage (below)  ← decode credentials, persist strings
//! ```
//!
//! Time never comes from the system clock directly: every store takes a
//! [`Clock`], so expiry and grace decisions are reproducible in tests.

#![allow(async_fn_in_trait)]

mod clock;
mod error;
mod flags;
mod issuer;
mod record;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{
    IssuerError, LOGIN_FAILED_MESSAGE, LoginFailure, REGISTRATION_FAILED_MESSAGE,
    SessionError,
};
pub use flags::PersistedFlags;
pub use issuer::{Issuer, LoginPayload, LoginResponse, RegisterPayload};
pub use record::{
    Registration, RequestStatus, SessionConfig, SessionRecord, TrustState,
};
pub use store::SessionStore;
