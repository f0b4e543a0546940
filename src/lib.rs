//! # Key Seal
//!
//! A library for asymmetric key management and sealed session tokens.
//!
//! `keyseal` generates, encodes, and stores RSA and elliptic-curve key
//! pairs, and uses them to issue and verify dual-layer tokens: a
//! signature proves who minted a token, and payload encryption keeps
//! its contents readable only by the intended recipient. The two
//! layers use separate key pairs, so the ability to mint tokens and
//! the ability to read them can be held by different parties.
//!
//! Key pairs travel as PKCS#8 PEM text and are resolved by name
//! through a [`KeySource`], so deployments can keep them in files, in
//! memory, or behind a custom store.
//!
//! ## Issuing and verifying tokens
//!
//! ```rust,no_run
//! use keyseal::keys::{KeyAlgorithm, KeyPairMaterial};
//! use keyseal::token::{TokenIssuer, TokenVerifier, Verified};
//!
//! # fn example() -> keyseal::Result<()> {
//! // One pair signs tokens, the other receives their payloads
//! let signing = KeyPairMaterial::generate(KeyAlgorithm::Rsa)?;
//! let content = KeyPairMaterial::generate(KeyAlgorithm::Ecc)?;
//!
//! let issuer = TokenIssuer::builder()
//!     .with_signing_key(signing.private().clone())
//!     .with_encryption_key(content.public().clone())
//!     .build()?;
//!
//! let token = issuer.issue(&"account-7", &"session payload")?;
//!
//! let verifier = TokenVerifier::builder()
//!     .with_verifying_key(signing.public().clone())
//!     .with_decryption_key(content.private().clone())
//!     .build()?;
//!
//! let verified: Verified<String, String> = verifier.verify(&token)?;
//! assert_eq!(verified.subject, "account-7");
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading keys from files
//!
//! ```rust,no_run
//! use keyseal::keyring::{FileKeySource, KeyPurpose, KeyRing};
//!
//! # fn example() -> keyseal::Result<()> {
//! let ring = KeyRing::new(FileKeySource::new("/etc/keyseal/keys"));
//!
//! if let Some(signing) = ring.find_role_key_pair(KeyPurpose::SignatureIssuer)? {
//!     println!("signing with a {:?} pair", signing.algorithm());
//! }
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod error;
pub mod keyring;
pub mod keys;
pub mod serialize;
pub mod token;

// Re-export key types
pub use crate::error::{Error, Result};
pub use crate::keyring::{FileKeySource, KeyPurpose, KeyRing, KeyRingConfig, MemoryKeySource};
pub use crate::keys::{
    AsymmetricPrivateKey, AsymmetricPublicKey, KeyAlgorithm, KeyPairMaterial, KeyRole,
    SymmetricKey,
};
pub use crate::serialize::JsonSerializer;
pub use crate::token::{TokenIssuer, TokenPolicy, TokenVerifier, Verified};

/// Size of AES-128 key in bytes
pub const AES128_KEY_SIZE: usize = 16;

/// Size of AES-256 key in bytes
pub const AES256_KEY_SIZE: usize = 32;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialization seam for subjects, claims, and payloads
pub trait Serializer: Send + Sync {
    /// Serializes a value to bytes
    fn to_bytes<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserializes a value from bytes
    fn from_bytes<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Named PEM storage behind the key ring
pub trait KeySource: Send + Sync {
    /// Reads a PEM resource; absence is `Ok(None)`, not an error
    fn read(&self, name: &str) -> Result<Option<String>>;

    /// Writes a PEM resource, replacing any existing content
    fn write(&self, name: &str, pem: &str) -> Result<()>;
}
