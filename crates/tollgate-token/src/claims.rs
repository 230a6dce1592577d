//! Claims and the immutable credential wrapper.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::{DecodeError, codec};

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// The subset of token claims Tollgate cares about.
///
/// Any other claim in the payload is ignored. Only `exp` is required:
/// a token that never expires is not something the guard can reason
/// about, so it fails to decode instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, in whole seconds since the Unix epoch.
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,

    /// Role granted to the holder. Absent in some claim schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Subject, usually the username the token was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued-at, in seconds since the Unix epoch.
    #[serde(
        default,
        deserialize_with = "optional_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,
}

impl Claims {
    /// The subject claim, if the issuer set one.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// Expiry converted to epoch milliseconds (saturating).
    pub fn expires_at_millis(&self) -> i64 {
        self.exp.saturating_mul(1000)
    }
}

/// JWT "NumericDate" values may legally carry a fractional part.
/// Fractions are floored; values outside `i64` saturate.
fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.floor() as i64)
        })
        .ok_or_else(|| de::Error::custom("numeric date out of range"))
}

fn optional_numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "numeric_date")] i64);

    Option::<Wrapped>::deserialize(deserializer).map(|w| w.map(|Wrapped(v)| v))
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// A decoded bearer credential: the raw string plus its claims.
///
/// A `Credential` can only be built through [`Credential::parse`], so
/// holding one proves the string decoded. It has no mutating methods:
/// expiry is computed against a clock reading, never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    raw: String,
    claims: Claims,
}

impl Credential {
    /// Decodes `raw` and wraps it.
    ///
    /// # Errors
    /// Returns the [`DecodeError`] from [`decode`](crate::decode).
    pub fn parse(raw: impl Into<String>) -> Result<Self, DecodeError> {
        let raw = raw.into();
        let claims = codec::decode(&raw)?;
        Ok(Self { raw, claims })
    }

    /// The credential exactly as the issuer sent it (for `Authorization`
    /// headers and persistence).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The role claim, if present.
    pub fn role(&self) -> Option<&str> {
        self.claims.role.as_deref()
    }

    pub fn expires_at_millis(&self) -> i64 {
        self.claims.expires_at_millis()
    }

    /// See [`is_expired`](crate::is_expired).
    pub fn is_expired(&self, now_millis: i64) -> bool {
        codec::is_expired(&self.claims, now_millis)
    }

    /// Time left before expiry, or zero once expired.
    pub fn remaining(&self, now_millis: i64) -> Duration {
        let left = self.expires_at_millis().saturating_sub(now_millis);
        Duration::from_millis(u64::try_from(left).unwrap_or(0))
    }
}

/// The raw token is a bearer secret, so `Debug` shows only the claims.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("raw", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}
