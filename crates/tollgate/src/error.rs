//! Unified error type for Tollgate.

use tollgate_session::{IssuerError, SessionError};
use tollgate_token::DecodeError;

use crate::ConfigError;

/// Top-level error that wraps every crate-specific error.
///
/// Users of the `tollgate` crate deal with this single type instead of
/// importing errors from each layer. `#[from]` on each variant lets `?`
/// convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TollgateError {
    /// A credential did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A register or login attempt failed. Display text is user-safe.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The issuer could not be reached or refused a request.
    #[error(transparent)]
    Issuer(#[from] IssuerError),

    /// Startup configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The session runtime task is gone (shut down or panicked).
    #[error("session runtime is not running")]
    RuntimeClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decode_error() {
        let err: TollgateError = DecodeError::Empty.into();
        assert!(matches!(err, TollgateError::Decode(_)));
    }

    #[test]
    fn test_from_session_error_keeps_user_text() {
        let err: TollgateError = SessionError::Registration {
            message: "Username already exists".into(),
            source: IssuerError::Rejected {
                status: 409,
                message: Some("Username already exists".into()),
            },
        }
        .into();
        assert!(matches!(err, TollgateError::Session(_)));
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[test]
    fn test_from_issuer_error() {
        let err: TollgateError = IssuerError::Unreachable("refused".into()).into();
        assert!(matches!(err, TollgateError::Issuer(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_from_config_error() {
        let err: TollgateError = ConfigError::EmptyBaseUrl.into();
        assert!(matches!(err, TollgateError::Config(_)));
    }
}
