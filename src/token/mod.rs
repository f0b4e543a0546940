//! Sealed token issue and verify
//!
//! A token is four dot-separated segments:
//!
//! ```text
//! v1.<claims>.<payload>.<signature>
//! ```
//!
//! Segment 0 is the version tag. The rest are base64url (no padding)
//! encodings of the serialized claims, the encrypted payload, and the
//! signature. The signature covers the ASCII bytes of
//! `v1.<claims>.<payload>`, so a flipped byte anywhere in the token
//! fails the signature check before any decryption work happens.
//! Tokens contain only URL-safe characters and travel unescaped in
//! HTTP headers.

mod issuer;
mod verifier;

pub use issuer::{TokenIssuer, TokenIssuerBuilder};
pub use verifier::{TokenVerifier, TokenVerifierBuilder};

use crate::error::{Error, Result};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_EXPIRE_AFTER: Duration = Duration::from_secs(30 * 60); // 30 minutes
pub const DEFAULT_LEEWAY: Duration = Duration::ZERO; // no clock allowance

/// Version tag of the only supported token layout
pub(crate) const TOKEN_VERSION: &str = "v1";

/// Number of dot-separated segments in a token
pub(crate) const SEGMENT_COUNT: usize = 4;

/// Timing rules applied when issuing and verifying tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// How long issued tokens stay valid
    pub expire_after: Duration,

    /// Clock skew tolerated when checking expiry
    pub leeway: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            expire_after: DEFAULT_EXPIRE_AFTER,
            leeway: DEFAULT_LEEWAY,
        }
    }
}

impl TokenPolicy {
    /// Creates a policy with the default timing rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how long issued tokens stay valid
    pub fn with_expire_after(mut self, expire_after: Duration) -> Self {
        self.expire_after = expire_after;
        self
    }

    /// Sets the clock skew tolerated when checking expiry
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

/// The signed claims segment of a token
///
/// The subject travels as opaque serialized bytes so the claims stay
/// decodable regardless of the subject type in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Serialized subject
    #[serde(rename = "sub", with = "base64_bytes")]
    pub subject: Vec<u8>,

    /// Issue time in epoch milliseconds
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiry time in epoch milliseconds
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// The decoded contents of a token that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified<T, P> {
    /// The subject the token was issued to
    pub subject: T,

    /// The sealed payload
    pub payload: P,

    /// When the token was issued
    pub issued_at: DateTime<Utc>,

    /// When the token expires
    pub expires_at: DateTime<Utc>,
}

/// Serde adapter carrying byte fields as base64url text
mod base64_bytes {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;

        URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

pub(crate) fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| Error::TokenFormat("segment is not base64url".to_string()))
}

pub(crate) fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| Error::TokenFormat(format!("timestamp {} out of range", millis)))
}
