//! Error types for the token layer.

/// Everything that can be wrong with a credential string.
///
/// Decoding is total: any input, however mangled, ends up as either
/// [`Claims`](crate::Claims) or one of these variants. Callers above this
/// layer treat every variant the same way ("no usable token"), but the
/// distinction is useful in logs.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The credential was empty or only whitespace.
    #[error("credential is empty")]
    Empty,

    /// The credential did not have the `header.payload.signature` shape.
    /// Carries the number of dot-separated segments actually found.
    #[error("expected 3 credential segments, found {0}")]
    Segments(usize),

    /// The payload segment was not valid base64url.
    #[error("payload is not valid base64url: {0}")]
    Base64(#[source] base64::DecodeError),

    /// The payload decoded to bytes that are not the expected JSON
    /// (malformed JSON, missing `exp`, wrong field types).
    #[error("payload is not valid claims JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// The payload is valid JSON but not an object (e.g. `[]` or `42`).
    #[error("payload is not a JSON object")]
    NotAnObject,
}
