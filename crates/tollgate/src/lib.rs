//! # Tollgate
//!
//! Client-side session authentication core for single-page apps.
//!
//! Tollgate keeps track of who is using the app, lets users register and
//! log in against a remote issuer, remembers the session across reloads,
//! and decides on every navigation whether the user may proceed or must
//! be sent elsewhere. Freshly registered users get a short grace period
//! before they have to log in.
//!
//! ## Layers
//!
//! | Crate              | Role                                             |
//! |--------------------|--------------------------------------------------|
//! | `tollgate-token`   | decode credentials, check expiry                 |
//! | `tollgate-storage` | durable key/value storage                        |
//! | `tollgate-session` | the session store and the issuer seam            |
//! | `tollgate-guard`   | allow/redirect decisions                         |
//! | `tollgate-timer`   | the grace period countdown                       |
//! | `tollgate`         | wires them together in one runtime actor         |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tollgate::prelude::*;
//!
//! # async fn app() -> Result<(), TollgateError> {
//! let issuer = HttpIssuer::new(IssuerConfig::from_env()?);
//! let (session, mut forced) =
//!     SessionRuntime::builder().spawn(issuer, MemoryRepository::new(), SystemClock);
//!
//! session.login(LoginPayload::new("alice", "hunter2")).await?;
//! assert_eq!(session.navigate("/dashboard", "/login").await?, Navigation::Allow);
//!
//! // Follow navigations the runtime starts on its own.
//! while let Some(ForcedNavigation { to }) = forced.recv().await {
//!     println!("go to {to}");
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
#[cfg(feature = "http")]
mod http;
mod runtime;

pub use config::{BASE_URL_ENV, ConfigError, DEFAULT_BASE_URL, IssuerConfig};
pub use error::TollgateError;
#[cfg(feature = "http")]
pub use http::HttpIssuer;
pub use runtime::{ForcedNavigation, SessionHandle, SessionRuntime, SessionRuntimeBuilder};

pub use tollgate_guard as guard;
pub use tollgate_session as session;
pub use tollgate_storage as storage;
pub use tollgate_timer as timer;
pub use tollgate_token as token;

/// Everything an application needs to drive a session.
pub mod prelude {
    pub use crate::{
        ConfigError, ForcedNavigation, IssuerConfig, SessionHandle, SessionRuntime,
        TollgateError,
    };

    #[cfg(feature = "http")]
    pub use crate::HttpIssuer;

    pub use tollgate_guard::{GuardConfig, Navigation};
    pub use tollgate_session::{
        Clock, Issuer, IssuerError, LoginPayload, LoginResponse, ManualClock, RegisterPayload,
        Registration, RequestStatus, SessionConfig, SessionRecord, SystemClock, TrustState,
    };
    #[cfg(feature = "web")]
    pub use tollgate_storage::WebStorageRepository;
    pub use tollgate_storage::{MemoryRepository, Repository};
    pub use tollgate_token::{Claims, Credential};
}
