//! Elliptic-curve encryption and signing on P-256
//!
//! Encryption is an integrated scheme: an ephemeral key pair is
//! generated per message, ECDH against the recipient key feeds
//! HKDF-SHA256, and the derived AES-256 key seals the plaintext with
//! GCM. The output is the compressed ephemeral point followed by the
//! sealed record, so there is no plaintext size ceiling.
//!
//! Signing is ECDSA with SHA-256, signatures in DER form.

use crate::crypto::aesgcm::{self, GCM_NONCE_SIZE, GCM_TAG_SIZE};
use crate::error::{Error, Result};
use crate::keys::{AsymmetricPrivateKey, AsymmetricPublicKey, SymmetricKey};
use crate::AES256_KEY_SIZE;
use hkdf::Hkdf;
use p256::ecdh::{EphemeralSecret, SharedSecret};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand::rngs::OsRng;
use sha2::Sha256;

/// Length of a compressed SEC1 point on P-256 in bytes
const COMPRESSED_POINT_SIZE: usize = 33;

/// Derives the AES-256 message key from an ECDH shared secret
///
/// Both compressed public points are bound into the HKDF info so the
/// key is specific to this ephemeral/recipient pairing.
fn derive_key(
    shared: &SharedSecret,
    ephemeral: &PublicKey,
    recipient: &PublicKey,
) -> Result<SymmetricKey> {
    let mut info = Vec::with_capacity(2 * COMPRESSED_POINT_SIZE);
    info.extend_from_slice(ephemeral.to_encoded_point(true).as_bytes());
    info.extend_from_slice(recipient.to_encoded_point(true).as_bytes());

    let hkdf = Hkdf::<Sha256>::new(None, shared.raw_secret_bytes().as_slice());
    let mut okm = vec![0_u8; AES256_KEY_SIZE];
    hkdf.expand(&info, &mut okm)
        .map_err(|_| Error::KeyGeneration("HKDF expansion failed".to_string()))?;

    SymmetricKey::new(okm)
}

/// Encrypts a plaintext to the recipient's public key
///
/// The result is the compressed ephemeral point followed by the
/// GCM-sealed plaintext.
pub fn encrypt(public: &AsymmetricPublicKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let recipient = public.as_ecc()?;

    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let ephemeral_public = ephemeral.public_key();
    let shared = ephemeral.diffie_hellman(recipient);

    let key = derive_key(&shared, &ephemeral_public, recipient)?;
    let sealed = aesgcm::encrypt(&key, plaintext)?;

    let point = ephemeral_public.to_encoded_point(true);
    let mut data = Vec::with_capacity(COMPRESSED_POINT_SIZE + sealed.len());
    data.extend_from_slice(point.as_bytes());
    data.extend_from_slice(&sealed);

    Ok(data)
}

/// Decrypts a message encrypted to this private key
pub fn decrypt(private: &AsymmetricPrivateKey, data: &[u8]) -> Result<Vec<u8>> {
    let secret = private.as_ecc()?;

    if data.len() < COMPRESSED_POINT_SIZE + GCM_NONCE_SIZE + GCM_TAG_SIZE {
        return Err(Error::Decryption(
            "data is too short for an EC-sealed message".to_string(),
        ));
    }

    let ephemeral_public = PublicKey::from_sec1_bytes(&data[..COMPRESSED_POINT_SIZE])
        .map_err(|_| Error::Decryption("invalid ephemeral point".to_string()))?;

    let shared = p256::ecdh::diffie_hellman(
        secret.to_nonzero_scalar(),
        ephemeral_public.as_affine(),
    );

    let key = derive_key(&shared, &ephemeral_public, &secret.public_key())?;
    aesgcm::decrypt(&key, &data[COMPRESSED_POINT_SIZE..])
}

/// Signs a message with SHA256withECDSA
pub fn sign(private: &AsymmetricPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    let secret = private.as_ecc()?;

    let signing_key = SigningKey::from(secret);
    let signature: Signature = signing_key.sign(message);

    Ok(signature.to_der().as_bytes().to_vec())
}

/// Verifies a SHA256withECDSA signature in DER form
///
/// A signature that does not parse or does not match is `Ok(false)`.
pub fn verify(public: &AsymmetricPublicKey, message: &[u8], signature: &[u8]) -> Result<bool> {
    let key = public.as_ecc()?;

    let verifying_key = VerifyingKey::from(key);
    let signature = match Signature::from_der(signature) {
        Ok(signature) => signature,
        Err(_) => return Ok(false),
    };

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
