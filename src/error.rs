use thiserror::Error;

/// Result type for keyseal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the keyseal library
#[derive(Error, Debug)]
pub enum Error {
    /// Errors related to key generation
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Errors related to decoding key material from Base64/PEM/DER
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// Errors related to using a key with the wrong primitive
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// RSA plaintext exceeds the modulus-derived ceiling
    #[error("Ciphertext too large: {size} bytes exceeds limit of {limit}")]
    CiphertextTooLarge { size: usize, limit: usize },

    /// Errors related to decryption failures
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Signature did not verify against the expected key
    #[error("Signature verification failed")]
    SignatureVerification,

    /// Token string does not parse as a well-formed token
    #[error("Token format error: {0}")]
    TokenFormat(String),

    /// Token is past its expiration timestamp
    #[error("Token expired at {expires_at}")]
    TokenExpired { expires_at: i64 },

    /// Errors related to issuer/verifier construction
    #[error("Issuance configuration error: {0}")]
    IssuanceConfig(String),

    /// Errors related to subject/payload serialization
    #[error("Payload encoding error: {0}")]
    PayloadEncoding(String),

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
