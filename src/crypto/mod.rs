//! Cryptographic primitives for key material and tokens
//!
//! Encryption and signing dispatch on the algorithm of the supplied
//! key: RSA keys use PKCS#1 v1.5 encryption and SHA256withRSA
//! signatures, EC keys use ECIES encryption and SHA256withECDSA
//! signatures. Passing a key of the wrong family to a primitive is an
//! `InvalidKey` error.

pub mod aesgcm;
pub mod digest;
pub mod ecc;
pub mod rsa;

use crate::error::{Error, Result};
use crate::keys::{
    AsymmetricPrivateKey, AsymmetricPublicKey, KeyAlgorithm, PrivateKeyInner, PublicKeyInner,
};
use rand::{rngs::OsRng, RngCore};

/// Signature algorithms tied to the asymmetric key families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// SHA-256 digest signed with PKCS#1 v1.5 RSA
    Sha256WithRsa,
    /// SHA-256 digest signed with ECDSA over P-256
    Sha256WithEcdsa,
}

impl SignatureScheme {
    /// Returns the scheme keys of the given algorithm sign with
    pub fn for_algorithm(algorithm: KeyAlgorithm) -> Result<Self> {
        match algorithm {
            KeyAlgorithm::Rsa => Ok(Self::Sha256WithRsa),
            KeyAlgorithm::Ecc => Ok(Self::Sha256WithEcdsa),
            KeyAlgorithm::Aes => Err(Error::InvalidKey(
                "AES keys cannot produce signatures".to_string(),
            )),
        }
    }

    fn key_algorithm(self) -> KeyAlgorithm {
        match self {
            Self::Sha256WithRsa => KeyAlgorithm::Rsa,
            Self::Sha256WithEcdsa => KeyAlgorithm::Ecc,
        }
    }
}

/// Encrypts a plaintext for the holder of the matching private key
pub fn encrypt_with_public_key(
    public: &AsymmetricPublicKey,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    match public.inner {
        PublicKeyInner::Rsa(_) => rsa::encrypt(public, plaintext),
        PublicKeyInner::Ecc(_) => ecc::encrypt(public, plaintext),
    }
}

/// Decrypts a ciphertext produced by `encrypt_with_public_key`
pub fn decrypt_with_private_key(
    private: &AsymmetricPrivateKey,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    match private.inner {
        PrivateKeyInner::Rsa(_) => rsa::decrypt(private, ciphertext),
        PrivateKeyInner::Ecc(_) => ecc::decrypt(private, ciphertext),
    }
}

/// Signs a message under the given scheme
///
/// The key's algorithm must match the scheme.
pub fn sign(
    private: &AsymmetricPrivateKey,
    message: &[u8],
    scheme: SignatureScheme,
) -> Result<Vec<u8>> {
    if private.algorithm() != scheme.key_algorithm() {
        return Err(Error::InvalidKey(format!(
            "{:?} key cannot sign under {:?}",
            private.algorithm(),
            scheme
        )));
    }

    match scheme {
        SignatureScheme::Sha256WithRsa => rsa::sign(private, message),
        SignatureScheme::Sha256WithEcdsa => ecc::sign(private, message),
    }
}

/// Verifies a signature under the given scheme
///
/// A signature that does not match is `Ok(false)`, never an error, so
/// callers can branch without inspecting error kinds.
pub fn verify(
    public: &AsymmetricPublicKey,
    message: &[u8],
    signature: &[u8],
    scheme: SignatureScheme,
) -> Result<bool> {
    if public.algorithm() != scheme.key_algorithm() {
        return Err(Error::InvalidKey(format!(
            "{:?} key cannot verify a {:?} signature",
            public.algorithm(),
            scheme
        )));
    }

    match scheme {
        SignatureScheme::Sha256WithRsa => rsa::verify(public, message, signature),
        SignatureScheme::Sha256WithEcdsa => ecc::verify(public, message, signature),
    }
}

/// Fills a buffer with random bytes using a cryptographically secure RNG
pub(crate) fn fill_random(buffer: &mut [u8]) {
    OsRng.fill_bytes(buffer);
}
