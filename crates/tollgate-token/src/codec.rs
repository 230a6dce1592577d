//! Decoding credential strings into [`Claims`].
//!
//! Credentials use the compact JWT layout: three base64url segments joined
//! by dots. Only the middle one (the payload) matters here:
//!
//! ```text
//! header.payload.signature
//!        ^^^^^^^
//!        base64url(JSON claims)
//! ```
//!
//! Both functions are pure. They take no locks, do no I/O, and never read
//! the system clock: the caller passes the current time in, which keeps
//! the expiry check deterministic under test.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::{Claims, DecodeError};

/// Decodes a credential string into its claims **without verifying the
/// signature**.
///
/// Accepts any `&str`; malformed input produces a [`DecodeError`], never
/// a panic. Surrounding whitespace is ignored, as are `=` padding and
/// standard-alphabet (`+`, `/`) characters in the payload.
///
/// # Errors
/// - [`DecodeError::Empty`]: nothing to decode
/// - [`DecodeError::Segments`]: not exactly three segments
/// - [`DecodeError::Base64`]: payload is not base64url
/// - [`DecodeError::NotAnObject`] / [`DecodeError::Json`]: payload is not
///   a claims object with a numeric `exp`
pub fn decode(credential: &str) -> Result<Claims, DecodeError> {
    let credential = credential.trim();
    if credential.is_empty() {
        return Err(DecodeError::Empty);
    }

    let segments: Vec<&str> = credential.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(DecodeError::Segments(segments.len()));
    };

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(DecodeError::Base64)?;

    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(DecodeError::Json)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    serde_json::from_value(value).map_err(DecodeError::Json)
}

/// Returns `true` once the credential's expiry lies strictly in the past.
///
/// The comparison is `exp * 1000 < now`: a credential whose expiry equals
/// `now_millis` exactly is still valid for that instant.
pub fn is_expired(claims: &Claims, now_millis: i64) -> bool {
    claims.expires_at_millis() < now_millis
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a three-segment token around the given JSON payload.
    pub(crate) fn token_with(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    fn claims(exp: i64) -> Claims {
        Claims {
            exp,
            role: None,
            sub: None,
            iat: None,
        }
    }

    // =====================================================================
    // decode()
    // =====================================================================

    #[test]
    fn test_decode_valid_token_returns_claims() {
        let token = token_with(r#"{"sub":"alice","exp":1700000000,"role":"admin"}"#);

        let claims = decode(&token).expect("should decode");

        assert_eq!(claims.exp, 1_700_000_000);
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.sub.as_deref(), Some("alice"));
    }

    #[test]
    fn test_decode_without_role_leaves_it_absent() {
        let claims = decode(&token_with(r#"{"sub":"bob","exp":5}"#)).unwrap();
        assert_eq!(claims.role, None);
    }

    #[test]
    fn test_decode_ignores_unknown_claims() {
        let claims =
            decode(&token_with(r#"{"exp":5,"aud":"chat","scopes":[1,2]}"#)).unwrap();
        assert_eq!(claims.exp, 5);
    }

    #[test]
    fn test_decode_tolerates_padding_and_whitespace() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        // 11 bytes → base64 needs one '=' of padding.
        let body = base64::engine::general_purpose::STANDARD.encode(br#"{"exp":123}"#);
        assert!(body.ends_with('='));
        let token = format!("  {header}.{body}.sig\n");

        assert_eq!(decode(&token).unwrap().exp, 123);
    }

    #[test]
    fn test_decode_empty_returns_empty() {
        assert!(matches!(decode(""), Err(DecodeError::Empty)));
        assert!(matches!(decode("   "), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_decode_wrong_segment_count_returns_segments() {
        assert!(matches!(decode("abc"), Err(DecodeError::Segments(1))));
        assert!(matches!(decode("a.b"), Err(DecodeError::Segments(2))));
        assert!(matches!(decode("a.b.c.d"), Err(DecodeError::Segments(4))));
    }

    #[test]
    fn test_decode_bad_base64_returns_base64() {
        assert!(matches!(decode("a.!!!!.c"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_decode_non_json_payload_returns_json() {
        let body = URL_SAFE_NO_PAD.encode(b"not json at all");
        let token = format!("h.{body}.s");
        assert!(matches!(decode(&token), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_json_array_returns_not_an_object() {
        assert!(matches!(
            decode(&token_with("[1,2,3]")),
            Err(DecodeError::NotAnObject)
        ));
    }

    #[test]
    fn test_decode_missing_exp_returns_json() {
        assert!(matches!(
            decode(&token_with(r#"{"sub":"alice"}"#)),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_string_exp_returns_json() {
        assert!(matches!(
            decode(&token_with(r#"{"exp":"tomorrow"}"#)),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_arbitrary_input_never_panics() {
        let inputs = [
            "..",
            "...",
            ".",
            "\u{0}.\u{0}.\u{0}",
            "ünïcödé.🦀.x",
            "eyJ.eyJ.eyJ",
            "a..c",
            "Bearer abc.def.ghi",
        ];
        for input in inputs {
            assert!(decode(input).is_err(), "{input:?} should not decode");
        }
    }

    // =====================================================================
    // is_expired()
    // =====================================================================

    #[test]
    fn test_is_expired_at_exact_expiry_is_false() {
        assert!(!is_expired(&claims(1_000), 1_000_000));
    }

    #[test]
    fn test_is_expired_one_milli_after_is_true() {
        assert!(is_expired(&claims(1_000), 1_000_001));
    }

    #[test]
    fn test_is_expired_before_expiry_is_false() {
        assert!(!is_expired(&claims(1_000), 999_999));
    }

    #[test]
    fn test_is_expired_huge_exp_saturates_instead_of_overflowing() {
        assert!(!is_expired(&claims(i64::MAX), i64::MAX - 1));
    }
}
