//! Key repository
//!
//! A [`KeyRing`] resolves named PEM resources from a [`KeySource`]
//! into typed key pairs. Sources only move text; all parsing and
//! validation happens here, so a missing resource and a corrupt
//! resource are distinct outcomes. Missing is `Ok(None)` because a
//! first run legitimately starts with an empty source.

mod file;
mod memory;

pub use file::FileKeySource;
pub use memory::MemoryKeySource;

use crate::error::Result;
use crate::keys::codec;
use crate::keys::{KeyAlgorithm, KeyMaterial, KeyPairMaterial, KeyRole};
use crate::KeySource;

pub const DEFAULT_SIGN_PUBLIC: &str = "sign_public.pem"; // signature pair, public half
pub const DEFAULT_SIGN_PRIVATE: &str = "sign_private.pem"; // signature pair, private half
pub const DEFAULT_CONTENT_PUBLIC: &str = "content_public.pem"; // content pair, public half
pub const DEFAULT_CONTENT_PRIVATE: &str = "content_private.pem"; // content pair, private half

/// The four roles a key pair plays in token handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// Signing issued tokens
    SignatureIssuer,

    /// Verifying token signatures
    SignatureVerifier,

    /// Encrypting token payloads
    ContentEncrypt,

    /// Decrypting token payloads
    ContentDecrypt,
}

/// Names and algorithm of one key pair in a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairNames {
    /// Resource name of the public half
    pub public_name: String,

    /// Resource name of the private half
    pub private_name: String,

    /// Algorithm both halves must decode as
    pub algorithm: KeyAlgorithm,
}

impl KeyPairNames {
    /// Creates names for a key pair
    pub fn new(
        public_name: impl Into<String>,
        private_name: impl Into<String>,
        algorithm: KeyAlgorithm,
    ) -> Self {
        Self {
            public_name: public_name.into(),
            private_name: private_name.into(),
            algorithm,
        }
    }
}

/// Maps each [`KeyPurpose`] to the pair backing it
///
/// The defaults describe the common single-source layout: one RSA pair
/// for signatures and one EC pair for content, with issuer/verifier
/// and encrypt/decrypt sharing their pair. Split deployments override
/// individual purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRingConfig {
    /// Pair backing [`KeyPurpose::SignatureIssuer`]
    pub signature_issuer: KeyPairNames,

    /// Pair backing [`KeyPurpose::SignatureVerifier`]
    pub signature_verifier: KeyPairNames,

    /// Pair backing [`KeyPurpose::ContentEncrypt`]
    pub content_encrypt: KeyPairNames,

    /// Pair backing [`KeyPurpose::ContentDecrypt`]
    pub content_decrypt: KeyPairNames,
}

impl Default for KeyRingConfig {
    fn default() -> Self {
        let signature =
            KeyPairNames::new(DEFAULT_SIGN_PUBLIC, DEFAULT_SIGN_PRIVATE, KeyAlgorithm::Rsa);
        let content =
            KeyPairNames::new(DEFAULT_CONTENT_PUBLIC, DEFAULT_CONTENT_PRIVATE, KeyAlgorithm::Ecc);

        Self {
            signature_issuer: signature.clone(),
            signature_verifier: signature,
            content_encrypt: content.clone(),
            content_decrypt: content,
        }
    }
}

impl KeyRingConfig {
    /// Creates a config with the default layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pair backing token signing
    pub fn with_signature_issuer(mut self, names: KeyPairNames) -> Self {
        self.signature_issuer = names;
        self
    }

    /// Sets the pair backing signature verification
    pub fn with_signature_verifier(mut self, names: KeyPairNames) -> Self {
        self.signature_verifier = names;
        self
    }

    /// Sets the pair backing payload encryption
    pub fn with_content_encrypt(mut self, names: KeyPairNames) -> Self {
        self.content_encrypt = names;
        self
    }

    /// Sets the pair backing payload decryption
    pub fn with_content_decrypt(mut self, names: KeyPairNames) -> Self {
        self.content_decrypt = names;
        self
    }

    /// Returns the pair names backing a purpose
    pub fn names_for(&self, purpose: KeyPurpose) -> &KeyPairNames {
        match purpose {
            KeyPurpose::SignatureIssuer => &self.signature_issuer,
            KeyPurpose::SignatureVerifier => &self.signature_verifier,
            KeyPurpose::ContentEncrypt => &self.content_encrypt,
            KeyPurpose::ContentDecrypt => &self.content_decrypt,
        }
    }
}

/// Typed key pair lookup over a [`KeySource`]
pub struct KeyRing<S> {
    source: S,
    config: KeyRingConfig,
}

impl<S: KeySource> KeyRing<S> {
    /// Creates a key ring with the default purpose layout
    pub fn new(source: S) -> Self {
        Self::with_config(source, KeyRingConfig::default())
    }

    /// Creates a key ring with an explicit purpose layout
    pub fn with_config(source: S, config: KeyRingConfig) -> Self {
        Self { source, config }
    }

    /// Loads a key pair by resource names
    ///
    /// Returns `Ok(None)` if either half is absent. A present resource
    /// that fails to decode is an error.
    pub fn find_key_pair(
        &self,
        public_name: &str,
        private_name: &str,
        algorithm: KeyAlgorithm,
    ) -> Result<Option<KeyPairMaterial>> {
        let public_pem = match self.source.read(public_name)? {
            Some(pem) => pem,
            None => {
                log::debug!("public key {} not present in source", public_name);
                return Ok(None);
            }
        };

        let private_pem = match self.source.read(private_name)? {
            Some(pem) => pem,
            None => {
                log::debug!("private key {} not present in source", private_name);
                return Ok(None);
            }
        };

        let public = codec::decode_pem(&public_pem, algorithm, KeyRole::Public)?.into_public()?;
        let private =
            codec::decode_pem(&private_pem, algorithm, KeyRole::Private)?.into_private()?;

        KeyPairMaterial::from_parts(public, private).map(Some)
    }

    /// Loads the key pair backing a purpose
    pub fn find_role_key_pair(&self, purpose: KeyPurpose) -> Result<Option<KeyPairMaterial>> {
        let names = self.config.names_for(purpose);

        self.find_key_pair(&names.public_name, &names.private_name, names.algorithm)
    }

    /// Writes both halves of a key pair under the given names
    pub fn store_key_pair(
        &self,
        public_name: &str,
        private_name: &str,
        pair: &KeyPairMaterial,
    ) -> Result<()> {
        let public_pem = codec::encode_pem(&KeyMaterial::Public(pair.public().clone()))?;
        let private_pem = codec::encode_pem(&KeyMaterial::Private(pair.private().clone()))?;

        self.source.write(public_name, &public_pem)?;
        self.source.write(private_name, &private_pem)
    }

    /// Writes a key pair under the names backing a purpose
    pub fn store_role_key_pair(&self, purpose: KeyPurpose, pair: &KeyPairMaterial) -> Result<()> {
        let names = self.config.names_for(purpose);

        self.store_key_pair(&names.public_name, &names.private_name, pair)
    }
}
