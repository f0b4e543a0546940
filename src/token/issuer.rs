//! Token issuing

use crate::crypto::{self, SignatureScheme};
use crate::error::{Error, Result};
use crate::keys::{AsymmetricPrivateKey, AsymmetricPublicKey};
use crate::serialize::JsonSerializer;
use crate::token::{encode_segment, TokenClaims, TokenPolicy, TOKEN_VERSION};
use crate::Serializer;

use chrono::Utc;
use metrics::{counter, histogram};
use serde::Serialize;
use std::time::Instant;

/// Builder for [`TokenIssuer`]
#[derive(Default)]
pub struct TokenIssuerBuilder<S = JsonSerializer> {
    signing_key: Option<AsymmetricPrivateKey>,
    encryption_key: Option<AsymmetricPublicKey>,
    policy: Option<TokenPolicy>,
    serializer: S,
}

impl TokenIssuerBuilder<JsonSerializer> {
    /// Creates a builder using the JSON serializer
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> TokenIssuerBuilder<S> {
    /// Sets the private key tokens are signed with
    pub fn with_signing_key(mut self, key: AsymmetricPrivateKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Sets the public key payloads are encrypted to
    pub fn with_encryption_key(mut self, key: AsymmetricPublicKey) -> Self {
        self.encryption_key = Some(key);
        self
    }

    /// Sets the timing policy
    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Replaces the serializer used for claims and payloads
    pub fn with_serializer<S2>(self, serializer: S2) -> TokenIssuerBuilder<S2> {
        TokenIssuerBuilder {
            signing_key: self.signing_key,
            encryption_key: self.encryption_key,
            policy: self.policy,
            serializer,
        }
    }

    /// Builds the issuer, validating the whole configuration
    pub fn build(self) -> Result<TokenIssuer<S>>
    where
        S: Serializer,
    {
        let signing_key = self
            .signing_key
            .ok_or_else(|| Error::IssuanceConfig("signing key is required".to_string()))?;
        let encryption_key = self
            .encryption_key
            .ok_or_else(|| Error::IssuanceConfig("encryption key is required".to_string()))?;
        let policy = self.policy.unwrap_or_default();

        if policy.expire_after.is_zero() {
            return Err(Error::IssuanceConfig(
                "expiry duration must be positive".to_string(),
            ));
        }

        // A token must not be decryptable by whoever can mint it alone.
        if signing_key.public_key() == encryption_key {
            return Err(Error::IssuanceConfig(
                "signing and encryption keys must come from different pairs".to_string(),
            ));
        }

        let scheme = SignatureScheme::for_algorithm(signing_key.algorithm())?;

        Ok(TokenIssuer {
            signing_key,
            encryption_key,
            scheme,
            policy,
            serializer: self.serializer,
        })
    }
}

/// Issues signed tokens carrying an encrypted payload
///
/// The signing scheme follows the signing key's algorithm; the payload
/// is encrypted to the recipient's public key, so possession of the
/// issuing credentials alone never exposes payloads.
pub struct TokenIssuer<S = JsonSerializer> {
    signing_key: AsymmetricPrivateKey,
    encryption_key: AsymmetricPublicKey,
    scheme: SignatureScheme,
    policy: TokenPolicy,
    serializer: S,
}

impl TokenIssuer<JsonSerializer> {
    /// Returns a builder for configuring an issuer
    pub fn builder() -> TokenIssuerBuilder<JsonSerializer> {
        TokenIssuerBuilder::new()
    }
}

impl<S: Serializer> TokenIssuer<S> {
    /// Issues a token for the subject carrying the sealed payload
    pub fn issue<T: Serialize, P: Serialize>(&self, subject: &T, payload: &P) -> Result<String> {
        let start = Instant::now();

        counter!("keyseal.token.issue", 1);

        let result = self.issue_token(subject, payload);
        histogram!("keyseal.token.issue.time", start.elapsed());
        result
    }

    fn issue_token<T: Serialize, P: Serialize>(&self, subject: &T, payload: &P) -> Result<String> {
        let subject_bytes = self.serializer.to_bytes(subject)?;

        let issued_at = Utc::now().timestamp_millis();
        let expires_at = issued_at + self.policy.expire_after.as_millis() as i64;
        let claims = TokenClaims {
            subject: subject_bytes,
            issued_at,
            expires_at,
        };
        let claims_bytes = self.serializer.to_bytes(&claims)?;

        let payload_bytes = self.serializer.to_bytes(payload)?;
        let sealed = crypto::encrypt_with_public_key(&self.encryption_key, &payload_bytes)?;

        let signing_input = format!(
            "{}.{}.{}",
            TOKEN_VERSION,
            encode_segment(&claims_bytes),
            encode_segment(&sealed)
        );
        let signature = crypto::sign(&self.signing_key, signing_input.as_bytes(), self.scheme)?;

        Ok(format!("{}.{}", signing_input, encode_segment(&signature)))
    }
}
