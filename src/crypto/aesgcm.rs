//! AES-GCM symmetric encryption
//!
//! Ciphertexts are laid out as `nonce || ciphertext || tag` with a
//! random 96-bit nonce, so encrypting the same plaintext twice yields
//! different bytes. AES-128 and AES-256 are selected by the key length.

use crate::crypto::fill_random;
use crate::error::{Error, Result};
use crate::keys::SymmetricKey;
use crate::{AES128_KEY_SIZE, AES256_KEY_SIZE};
use aes_gcm::{
    aead::{Aead as AeadTrait, KeyInit},
    Aes128Gcm, Aes256Gcm, Key as AesKey, Nonce,
};

// Constants for GCM mode
const GCM_BLOCK_SIZE: usize = 16; // AES block size
pub(crate) const GCM_NONCE_SIZE: usize = 12;
pub(crate) const GCM_TAG_SIZE: usize = 16;

// Maximum message size supported by GCM
// ((1 << 32) - 2) * GCM_BLOCK_SIZE
const GCM_MAX_DATA_SIZE: usize = ((1 << 32) - 2) * GCM_BLOCK_SIZE;

/// Encrypts a plaintext under the given AES key
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() > GCM_MAX_DATA_SIZE {
        return Err(Error::CiphertextTooLarge {
            size: plaintext.len(),
            limit: GCM_MAX_DATA_SIZE,
        });
    }

    // Create buffer for nonce + encrypted data
    let size = GCM_NONCE_SIZE + plaintext.len() + GCM_TAG_SIZE;
    let mut nonce_and_cipher = vec![0_u8; size];

    // Fill the nonce area with random bytes
    fill_random(&mut nonce_and_cipher[..GCM_NONCE_SIZE]);
    let nonce = Nonce::from_slice(&nonce_and_cipher[..GCM_NONCE_SIZE]);

    let ciphertext = match key.bytes().len() {
        AES128_KEY_SIZE => {
            let cipher = Aes128Gcm::new(AesKey::<Aes128Gcm>::from_slice(key.bytes()));
            cipher.encrypt(nonce, plaintext)
        }
        AES256_KEY_SIZE => {
            let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key.bytes()));
            cipher.encrypt(nonce, plaintext)
        }
        n => {
            return Err(Error::InvalidKey(format!(
                "unsupported AES key length: {} bytes",
                n
            )))
        }
    }
    .map_err(|e| Error::InvalidKey(format!("GCM encryption failed: {}", e)))?;

    // Copy the ciphertext (which includes the tag) after the nonce
    nonce_and_cipher[GCM_NONCE_SIZE..].copy_from_slice(&ciphertext);

    Ok(nonce_and_cipher)
}

/// Decrypts a `nonce || ciphertext || tag` buffer under the given AES key
///
/// Any modification of the buffer, truncation included, fails the
/// authentication check and is reported as a `Decryption` error.
pub fn decrypt(key: &SymmetricKey, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < GCM_NONCE_SIZE + GCM_TAG_SIZE {
        // Must have at least nonce and tag
        return Err(Error::Decryption(
            "data is too short for GCM (nonce + tag)".to_string(),
        ));
    }

    let nonce = Nonce::from_slice(&data[..GCM_NONCE_SIZE]);

    match key.bytes().len() {
        AES128_KEY_SIZE => {
            let cipher = Aes128Gcm::new(AesKey::<Aes128Gcm>::from_slice(key.bytes()));
            cipher.decrypt(nonce, &data[GCM_NONCE_SIZE..])
        }
        AES256_KEY_SIZE => {
            let cipher = Aes256Gcm::new(AesKey::<Aes256Gcm>::from_slice(key.bytes()));
            cipher.decrypt(nonce, &data[GCM_NONCE_SIZE..])
        }
        n => {
            return Err(Error::InvalidKey(format!(
                "unsupported AES key length: {} bytes",
                n
            )))
        }
    }
    .map_err(|_| Error::Decryption("authentication failed".to_string()))
}
