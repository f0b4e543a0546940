//! Key material types and generation

pub mod codec;

use crate::error::{Error, Result};
use crate::{AES128_KEY_SIZE, AES256_KEY_SIZE};
use rand::{rngs::OsRng, Rng, RngCore};
use zeroize::Zeroize;

/// Default RSA modulus size in bits
pub const DEFAULT_RSA_KEY_BITS: usize = 2048;

/// Smallest RSA modulus size accepted for generation
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// Algorithm tag of a piece of key material, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// RSA with PKCS#1 v1.5 padding
    Rsa,
    /// Elliptic-curve cryptography over P-256
    Ecc,
    /// AES symmetric keys
    Aes,
}

/// Role of a piece of key material within its algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// Public half of an asymmetric pair
    Public,
    /// Private half of an asymmetric pair
    Private,
    /// Symmetric key shared by both directions
    Secret,
}

/// A raw AES key
///
/// Key bytes are wiped when the value is dropped.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"<hidden>")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SymmetricKey {
    /// Wraps existing key bytes, validating the length
    pub fn new(mut bytes: Vec<u8>) -> Result<Self> {
        match bytes.len() {
            AES128_KEY_SIZE | AES256_KEY_SIZE => Ok(Self { bytes }),
            n => {
                bytes.zeroize();
                Err(Error::KeyGeneration(format!(
                    "unsupported AES key length: {} bytes",
                    n
                )))
            }
        }
    }

    /// Generates a fresh random key of the given size in bits
    ///
    /// Supported sizes are 128 and 256.
    pub fn generate(size_bits: usize) -> Result<Self> {
        let len = match size_bits {
            128 => AES128_KEY_SIZE,
            256 => AES256_KEY_SIZE,
            n => {
                return Err(Error::KeyGeneration(format!(
                    "unsupported AES key size: {} bits",
                    n
                )))
            }
        };

        let mut bytes = vec![0_u8; len];
        OsRng.fill_bytes(&mut bytes);

        Ok(Self { bytes })
    }

    /// Returns the raw key bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Clone, PartialEq)]
pub(crate) enum PublicKeyInner {
    Rsa(rsa::RsaPublicKey),
    Ecc(p256::PublicKey),
}

#[derive(Clone)]
pub(crate) enum PrivateKeyInner {
    Rsa(rsa::RsaPrivateKey),
    Ecc(p256::SecretKey),
}

/// Public half of an asymmetric key pair
#[derive(Clone, PartialEq)]
pub struct AsymmetricPublicKey {
    pub(crate) inner: PublicKeyInner,
}

impl std::fmt::Debug for AsymmetricPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsymmetricPublicKey")
            .field("algorithm", &self.algorithm())
            .finish()
    }
}

impl AsymmetricPublicKey {
    pub(crate) fn from_rsa(key: rsa::RsaPublicKey) -> Self {
        Self {
            inner: PublicKeyInner::Rsa(key),
        }
    }

    pub(crate) fn from_ecc(key: p256::PublicKey) -> Self {
        Self {
            inner: PublicKeyInner::Ecc(key),
        }
    }

    /// Returns the algorithm this key belongs to
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self.inner {
            PublicKeyInner::Rsa(_) => KeyAlgorithm::Rsa,
            PublicKeyInner::Ecc(_) => KeyAlgorithm::Ecc,
        }
    }

    pub(crate) fn as_rsa(&self) -> Result<&rsa::RsaPublicKey> {
        match &self.inner {
            PublicKeyInner::Rsa(key) => Ok(key),
            PublicKeyInner::Ecc(_) => Err(Error::InvalidKey(
                "expected an RSA public key, got an EC key".to_string(),
            )),
        }
    }

    pub(crate) fn as_ecc(&self) -> Result<&p256::PublicKey> {
        match &self.inner {
            PublicKeyInner::Ecc(key) => Ok(key),
            PublicKeyInner::Rsa(_) => Err(Error::InvalidKey(
                "expected an EC public key, got an RSA key".to_string(),
            )),
        }
    }
}

/// Private half of an asymmetric key pair
#[derive(Clone)]
pub struct AsymmetricPrivateKey {
    pub(crate) inner: PrivateKeyInner,
}

impl std::fmt::Debug for AsymmetricPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsymmetricPrivateKey")
            .field("algorithm", &self.algorithm())
            .field("key", &"<hidden>")
            .finish()
    }
}

impl AsymmetricPrivateKey {
    pub(crate) fn from_rsa(key: rsa::RsaPrivateKey) -> Self {
        Self {
            inner: PrivateKeyInner::Rsa(key),
        }
    }

    pub(crate) fn from_ecc(key: p256::SecretKey) -> Self {
        Self {
            inner: PrivateKeyInner::Ecc(key),
        }
    }

    /// Returns the algorithm this key belongs to
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self.inner {
            PrivateKeyInner::Rsa(_) => KeyAlgorithm::Rsa,
            PrivateKeyInner::Ecc(_) => KeyAlgorithm::Ecc,
        }
    }

    /// Derives the public half matching this private key
    pub fn public_key(&self) -> AsymmetricPublicKey {
        match &self.inner {
            PrivateKeyInner::Rsa(key) => AsymmetricPublicKey::from_rsa(key.to_public_key()),
            PrivateKeyInner::Ecc(key) => AsymmetricPublicKey::from_ecc(key.public_key()),
        }
    }

    pub(crate) fn as_rsa(&self) -> Result<&rsa::RsaPrivateKey> {
        match &self.inner {
            PrivateKeyInner::Rsa(key) => Ok(key),
            PrivateKeyInner::Ecc(_) => Err(Error::InvalidKey(
                "expected an RSA private key, got an EC key".to_string(),
            )),
        }
    }

    pub(crate) fn as_ecc(&self) -> Result<&p256::SecretKey> {
        match &self.inner {
            PrivateKeyInner::Ecc(key) => Ok(key),
            PrivateKeyInner::Rsa(_) => Err(Error::InvalidKey(
                "expected an EC private key, got an RSA key".to_string(),
            )),
        }
    }
}

/// An asymmetric key pair sharing one algorithm
#[derive(Debug, Clone)]
pub struct KeyPairMaterial {
    public: AsymmetricPublicKey,
    private: AsymmetricPrivateKey,
}

impl KeyPairMaterial {
    /// Pairs up separately obtained halves, validating their algorithms match
    pub fn from_parts(public: AsymmetricPublicKey, private: AsymmetricPrivateKey) -> Result<Self> {
        if public.algorithm() != private.algorithm() {
            return Err(Error::InvalidKey(format!(
                "key pair algorithm mismatch: public is {:?}, private is {:?}",
                public.algorithm(),
                private.algorithm()
            )));
        }

        Ok(Self { public, private })
    }

    /// Generates a fresh key pair for the given algorithm
    ///
    /// RSA pairs use a 2048-bit modulus; EC pairs use curve P-256.
    pub fn generate(algorithm: KeyAlgorithm) -> Result<Self> {
        match algorithm {
            KeyAlgorithm::Rsa => Self::generate_rsa(DEFAULT_RSA_KEY_BITS),
            KeyAlgorithm::Ecc => {
                let secret = p256::SecretKey::random(&mut OsRng);
                let public = secret.public_key();

                Ok(Self {
                    public: AsymmetricPublicKey::from_ecc(public),
                    private: AsymmetricPrivateKey::from_ecc(secret),
                })
            }
            KeyAlgorithm::Aes => Err(Error::KeyGeneration(
                "AES is not an asymmetric algorithm".to_string(),
            )),
        }
    }

    /// Generates an RSA key pair with the given modulus size in bits
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        if bits < MIN_RSA_KEY_BITS {
            return Err(Error::KeyGeneration(format!(
                "RSA modulus of {} bits is below the {} bit minimum",
                bits, MIN_RSA_KEY_BITS
            )));
        }

        let private = rsa::RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| Error::KeyGeneration(format!("RSA generation failed: {}", e)))?;
        let public = private.to_public_key();

        Ok(Self {
            public: AsymmetricPublicKey::from_rsa(public),
            private: AsymmetricPrivateKey::from_rsa(private),
        })
    }

    /// Returns the shared algorithm of the pair
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.public.algorithm()
    }

    /// Returns the public half
    pub fn public(&self) -> &AsymmetricPublicKey {
        &self.public
    }

    /// Returns the private half
    pub fn private(&self) -> &AsymmetricPrivateKey {
        &self.private
    }

}

/// Any piece of key material the codec can encode or decode
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// A raw AES key
    Symmetric(SymmetricKey),
    /// Public half of an asymmetric pair
    Public(AsymmetricPublicKey),
    /// Private half of an asymmetric pair
    Private(AsymmetricPrivateKey),
}

impl KeyMaterial {
    /// Returns the algorithm tag of the material
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            KeyMaterial::Symmetric(_) => KeyAlgorithm::Aes,
            KeyMaterial::Public(key) => key.algorithm(),
            KeyMaterial::Private(key) => key.algorithm(),
        }
    }

    /// Returns the role of the material
    pub fn role(&self) -> KeyRole {
        match self {
            KeyMaterial::Symmetric(_) => KeyRole::Secret,
            KeyMaterial::Public(_) => KeyRole::Public,
            KeyMaterial::Private(_) => KeyRole::Private,
        }
    }

    /// Unwraps a symmetric key
    pub fn into_symmetric(self) -> Result<SymmetricKey> {
        match self {
            KeyMaterial::Symmetric(key) => Ok(key),
            other => Err(Error::InvalidKey(format!(
                "expected a symmetric key, got {:?} material",
                other.role()
            ))),
        }
    }

    /// Unwraps an asymmetric public key
    pub fn into_public(self) -> Result<AsymmetricPublicKey> {
        match self {
            KeyMaterial::Public(key) => Ok(key),
            other => Err(Error::InvalidKey(format!(
                "expected a public key, got {:?} material",
                other.role()
            ))),
        }
    }

    /// Unwraps an asymmetric private key
    pub fn into_private(self) -> Result<AsymmetricPrivateKey> {
        match self {
            KeyMaterial::Private(key) => Ok(key),
            other => Err(Error::InvalidKey(format!(
                "expected a private key, got {:?} material",
                other.role()
            ))),
        }
    }
}

/// Generates a uniform random string of printable ASCII characters
///
/// Characters are drawn from `!` through `~`. The result is not itself
/// a cryptographic key; it is kept here for key-derivation and test use.
pub fn generate_random_ascii(length: usize) -> String {
    let mut rng = OsRng;
    (0..length).map(|_| rng.gen_range(b'!'..=b'~') as char).collect()
}
