//! RSA encryption and signing
//!
//! Encryption uses PKCS#1 v1.5 padding, which caps the plaintext at
//! the modulus size minus the padding overhead. Larger payloads belong
//! on the EC path, which has no such ceiling.

use crate::error::{Error, Result};
use crate::keys::{AsymmetricPrivateKey, AsymmetricPublicKey};
use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Encrypt;

/// Padding overhead of PKCS#1 v1.5 encryption in bytes
const PKCS1_PADDING_OVERHEAD: usize = 11;

/// Returns the largest plaintext the key can encrypt
pub fn max_plaintext_len(public: &AsymmetricPublicKey) -> Result<usize> {
    Ok(public.as_rsa()?.size() - PKCS1_PADDING_OVERHEAD)
}

/// Encrypts a plaintext with the public key using PKCS#1 v1.5 padding
pub fn encrypt(public: &AsymmetricPublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let key = public.as_rsa()?;

    let limit = key.size() - PKCS1_PADDING_OVERHEAD;
    if plaintext.len() > limit {
        return Err(Error::CiphertextTooLarge {
            size: plaintext.len(),
            limit,
        });
    }

    key.encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
        .map_err(|e| Error::InvalidKey(format!("RSA encryption failed: {}", e)))
}

/// Decrypts a ciphertext with the private key
pub fn decrypt(private: &AsymmetricPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let key = private.as_rsa()?;

    key.decrypt(Pkcs1v15Encrypt, ciphertext)
        .map_err(|e| Error::Decryption(format!("RSA decryption failed: {}", e)))
}

/// Signs a message with SHA256withRSA
pub fn sign(private: &AsymmetricPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    let key = private.as_rsa()?;

    let signing_key = SigningKey::<Sha256>::new(key.clone());
    let signature = signing_key.sign(message);

    Ok(signature.to_bytes().as_ref().to_vec())
}

/// Verifies a SHA256withRSA signature
///
/// A signature that does not match the message is `Ok(false)`.
pub fn verify(public: &AsymmetricPublicKey, message: &[u8], signature: &[u8]) -> Result<bool> {
    let key = public.as_rsa()?;

    let verifying_key = VerifyingKey::<Sha256>::new(key.clone());
    let signature = match Signature::try_from(signature) {
        Ok(signature) => signature,
        Err(_) => return Ok(false),
    };

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
