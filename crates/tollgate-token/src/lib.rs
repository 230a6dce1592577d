//! Bearer credential handling for Tollgate.
//!
//! This crate knows how to read the signed token a remote issuer hands
//! out after login:
//!
//! - **Types** ([`Claims`], [`Credential`]): what a token asserts about
//!   its holder (expiry, role, subject).
//! - **Codec** ([`decode`], [`is_expired`]): turning the raw string into
//!   claims, and comparing the expiry against a clock reading.
//! - **Errors** ([`DecodeError`]): everything that can be wrong with a
//!   token string.
//!
//! # What this crate does NOT do
//!
//! It never verifies signatures. The issuer signs, the issuer verifies;
//! the client only needs the claims to decide whether a navigation is
//! worth attempting. A forged token gets the user past the client-side
//! guard and nothing more: every API call is still checked server-side.
//!
//! ```text
//! "eyJ...header.eyJ...payload.sig" → decode() → Claims { exp, role, sub }
//! ```

mod claims;
mod codec;
mod error;

pub use claims::{Claims, Credential};
pub use codec::{decode, is_expired};
pub use error::DecodeError;
