//! Error types for the session layer.

use tollgate_token::DecodeError;

/// Shown to the user for every failed login, whatever the cause.
///
/// Distinguishing "no such user" from "wrong password" (or even from
/// "server down") would let anyone probe which accounts exist.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password";

/// Shown for a failed registration when the issuer gave no message.
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed";

/// Failures reported by an [`Issuer`](crate::Issuer).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssuerError {
    /// The issuer answered, and said no (non-2xx status).
    /// `message` is the human-readable reason from the response body,
    /// when the issuer sent one.
    #[error("issuer rejected request with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The request never got an answer (DNS, connection refused, timeout).
    #[error("issuer unreachable: {0}")]
    Unreachable(String),

    /// The issuer answered 2xx with a body we could not make sense of.
    #[error("invalid issuer response: {0}")]
    InvalidResponse(String),
}

impl IssuerError {
    /// The issuer's own explanation, if it sent one.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            Self::Unreachable(_) | Self::InvalidResponse(_) => None,
        }
    }
}

/// Why a login attempt did not produce a stored credential.
///
/// Never shown to the user (see [`LOGIN_FAILED_MESSAGE`]); available to
/// logs and callers through [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
pub enum LoginFailure {
    #[error(transparent)]
    Issuer(#[from] IssuerError),

    /// The issuer said yes but sent no token.
    #[error("issuer response carried no token")]
    MissingToken,

    /// The issuer sent a token that does not decode. It is never stored.
    #[error("issued token could not be decoded: {0}")]
    Undecodable(#[source] DecodeError),
}

/// Errors returned by [`SessionStore`](crate::SessionStore) operations.
///
/// The `Display` text of each variant is safe to put in front of a user;
/// it is also what ends up in the record's `last_error`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Registration was refused or could not be sent.
    #[error("{message}")]
    Registration {
        message: String,
        #[source]
        source: IssuerError,
    },

    /// Login failed. Always displays [`LOGIN_FAILED_MESSAGE`].
    #[error("Invalid username or password")]
    Login(#[source] LoginFailure),
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_rejection_message_only_for_rejected() {
        let rejected = IssuerError::Rejected {
            status: 409,
            message: Some("Username already exists".into()),
        };
        assert_eq!(rejected.rejection_message(), Some("Username already exists"));

        let blank = IssuerError::Rejected {
            status: 500,
            message: Some("   ".into()),
        };
        assert_eq!(blank.rejection_message(), None);

        assert_eq!(IssuerError::Unreachable("refused".into()).rejection_message(), None);
    }

    #[test]
    fn test_login_error_display_is_generic() {
        let err = SessionError::Login(LoginFailure::Issuer(IssuerError::Rejected {
            status: 401,
            message: Some("no such user: alice".into()),
        }));
        assert_eq!(err.to_string(), LOGIN_FAILED_MESSAGE);
        assert!(!err.to_string().contains("alice"));
    }

    #[test]
    fn test_login_error_keeps_cause_as_source() {
        let err = SessionError::Login(LoginFailure::MissingToken);
        let source = err.source().expect("should carry a source");
        assert_eq!(source.to_string(), "issuer response carried no token");
    }

    #[test]
    fn test_registration_error_displays_message() {
        let err = SessionError::Registration {
            message: "Username already exists".into(),
            source: IssuerError::Rejected {
                status: 409,
                message: Some("Username already exists".into()),
            },
        };
        assert_eq!(err.to_string(), "Username already exists");
    }
}
