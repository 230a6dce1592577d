//! The navigation decision table.

use std::fmt;

use tollgate_session::TrustState;

/// What the guard concluded, before paths are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

/// What the router should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Proceed to the requested path.
    Allow,
    /// Go here instead.
    Redirect(String),
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The redirect target, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Redirect(path) => Some(path),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Redirect(path) => write!(f, "redirect to {path}"),
        }
    }
}

/// Maps a trust state and the target's visibility to a decision.
///
/// ```text
/// TrustState      public target      protected target
/// ─────────────   ────────────────   ─────────────────
/// Anonymous       allow              login
/// Expired         allow              login
/// Grace           home               allow
/// Authenticated   home               allow
/// ```
///
/// Pure: clearing an expired credential is the caller's job.
pub fn decide(trust: &TrustState, is_public: bool) -> Decision {
    match (trust, is_public) {
        (TrustState::Anonymous | TrustState::Expired, true) => Decision::Allow,
        (TrustState::Anonymous | TrustState::Expired, false) => Decision::RedirectToLogin,
        (TrustState::Grace { .. } | TrustState::Authenticated { .. }, true) => {
            Decision::RedirectToHome
        }
        (TrustState::Grace { .. } | TrustState::Authenticated { .. }, false) => Decision::Allow,
    }
}
