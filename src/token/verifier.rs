//! Token verification

use crate::crypto::{self, SignatureScheme};
use crate::error::{Error, Result};
use crate::keys::{AsymmetricPrivateKey, AsymmetricPublicKey};
use crate::serialize::JsonSerializer;
use crate::token::{
    decode_segment, timestamp_from_millis, TokenClaims, TokenPolicy, Verified, SEGMENT_COUNT,
    TOKEN_VERSION,
};
use crate::Serializer;

use chrono::Utc;
use metrics::{counter, histogram};
use serde::de::DeserializeOwned;
use std::time::Instant;

/// Builder for [`TokenVerifier`]
#[derive(Default)]
pub struct TokenVerifierBuilder<S = JsonSerializer> {
    verifying_key: Option<AsymmetricPublicKey>,
    decryption_key: Option<AsymmetricPrivateKey>,
    policy: Option<TokenPolicy>,
    serializer: S,
}

impl TokenVerifierBuilder<JsonSerializer> {
    /// Creates a builder using the JSON serializer
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> TokenVerifierBuilder<S> {
    /// Sets the public key signatures are checked against
    pub fn with_verifying_key(mut self, key: AsymmetricPublicKey) -> Self {
        self.verifying_key = Some(key);
        self
    }

    /// Sets the private key payloads are decrypted with
    pub fn with_decryption_key(mut self, key: AsymmetricPrivateKey) -> Self {
        self.decryption_key = Some(key);
        self
    }

    /// Sets the timing policy
    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Replaces the serializer used for claims and payloads
    pub fn with_serializer<S2>(self, serializer: S2) -> TokenVerifierBuilder<S2> {
        TokenVerifierBuilder {
            verifying_key: self.verifying_key,
            decryption_key: self.decryption_key,
            policy: self.policy,
            serializer,
        }
    }

    /// Builds the verifier, validating the whole configuration
    pub fn build(self) -> Result<TokenVerifier<S>>
    where
        S: Serializer,
    {
        let verifying_key = self
            .verifying_key
            .ok_or_else(|| Error::IssuanceConfig("verifying key is required".to_string()))?;
        let decryption_key = self
            .decryption_key
            .ok_or_else(|| Error::IssuanceConfig("decryption key is required".to_string()))?;
        let policy = self.policy.unwrap_or_default();

        if decryption_key.public_key() == verifying_key {
            return Err(Error::IssuanceConfig(
                "verifying and decryption keys must come from different pairs".to_string(),
            ));
        }

        let scheme = SignatureScheme::for_algorithm(verifying_key.algorithm())?;

        Ok(TokenVerifier {
            verifying_key,
            decryption_key,
            scheme,
            policy,
            serializer: self.serializer,
        })
    }
}

/// Checks tokens and unseals their payloads
///
/// Checks run from cheapest to most expensive: shape, then signature,
/// then expiry, and only then payload decryption. Every failure is an
/// ordinary error value keyed to what went wrong, so callers can log
/// tampering and key mismatches differently while returning the same
/// denial to end users.
pub struct TokenVerifier<S = JsonSerializer> {
    verifying_key: AsymmetricPublicKey,
    decryption_key: AsymmetricPrivateKey,
    scheme: SignatureScheme,
    policy: TokenPolicy,
    serializer: S,
}

impl TokenVerifier<JsonSerializer> {
    /// Returns a builder for configuring a verifier
    pub fn builder() -> TokenVerifierBuilder<JsonSerializer> {
        TokenVerifierBuilder::new()
    }
}

impl<S: Serializer> TokenVerifier<S> {
    /// Verifies a token and returns its decoded contents
    pub fn verify<T, P>(&self, token: &str) -> Result<Verified<T, P>>
    where
        T: DeserializeOwned,
        P: DeserializeOwned,
    {
        let start = Instant::now();

        counter!("keyseal.token.verify", 1);

        let result = self.verify_token(token);
        histogram!("keyseal.token.verify.time", start.elapsed());
        result
    }

    fn verify_token<T, P>(&self, token: &str) -> Result<Verified<T, P>>
    where
        T: DeserializeOwned,
        P: DeserializeOwned,
    {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(Error::TokenFormat(format!(
                "expected {} segments, found {}",
                SEGMENT_COUNT,
                segments.len()
            )));
        }
        if segments[0] != TOKEN_VERSION {
            return Err(Error::TokenFormat(format!(
                "unsupported version tag {:?}",
                segments[0]
            )));
        }

        let signature = decode_segment(segments[3])?;

        // Nothing else is decoded until the signature passes.
        let signing_input = format!("{}.{}.{}", segments[0], segments[1], segments[2]);
        let valid = crypto::verify(
            &self.verifying_key,
            signing_input.as_bytes(),
            &signature,
            self.scheme,
        )?;
        if !valid {
            return Err(Error::SignatureVerification);
        }

        // Past the signature, damage means a broken issuer, not tampering.
        let claims_bytes = decode_segment(segments[1])?;
        let claims: TokenClaims = self
            .serializer
            .from_bytes(&claims_bytes)
            .map_err(|_| Error::TokenFormat("claims do not deserialize".to_string()))?;

        let now = Utc::now().timestamp_millis();
        let leeway = self.policy.leeway.as_millis() as i64;
        if now > claims.expires_at + leeway {
            return Err(Error::TokenExpired {
                expires_at: claims.expires_at,
            });
        }

        let sealed = decode_segment(segments[2])?;
        let payload_bytes = crypto::decrypt_with_private_key(&self.decryption_key, &sealed)?;

        let subject = self.serializer.from_bytes(&claims.subject)?;
        let payload = self.serializer.from_bytes(&payload_bytes)?;

        Ok(Verified {
            subject,
            payload,
            issued_at: timestamp_from_millis(claims.issued_at)?,
            expires_at: timestamp_from_millis(claims.expires_at)?,
        })
    }
}
