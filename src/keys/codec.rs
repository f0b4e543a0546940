//! Base64 and PEM serialization for key material
//!
//! Canonical byte encodings are SPKI DER for public keys, PKCS#8 DER
//! for private keys, and the raw bytes for AES keys. PEM wraps the
//! standard-Base64 body in an algorithm-labeled header and footer:
//!
//! ```text
//! -----BEGIN EC PKCS#8-----
//! MIGHAgEAMBMGByqGSM49AgEG...
//! -----END EC PKCS#8-----
//! ```

use crate::error::{Error, Result};
use crate::keys::{
    AsymmetricPrivateKey, AsymmetricPublicKey, KeyAlgorithm, KeyMaterial, KeyRole,
    PrivateKeyInner, PublicKeyInner, SymmetricKey,
};
use base64::{engine::general_purpose, Engine as _};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};

/// Column width of the Base64 body inside PEM text
const PEM_LINE_WIDTH: usize = 64;

/// A key in both of its text representations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedKey {
    /// Standard Base64 of the canonical key bytes
    pub base64: String,
    /// PEM text with the algorithm-labeled header and footer
    pub pem: String,
}

impl EncodedKey {
    /// Produces both representations of the given material
    pub fn of(key: &KeyMaterial) -> Result<Self> {
        Ok(Self {
            base64: encode_base64(key)?,
            pem: encode_pem(key)?,
        })
    }
}

fn pem_label(algorithm: KeyAlgorithm) -> &'static str {
    match algorithm {
        KeyAlgorithm::Rsa => "RSA",
        KeyAlgorithm::Ecc => "EC",
        KeyAlgorithm::Aes => "AES",
    }
}

/// Returns the canonical byte encoding of the material
pub fn canonical_bytes(key: &KeyMaterial) -> Result<Vec<u8>> {
    match key {
        KeyMaterial::Symmetric(k) => Ok(k.bytes().to_vec()),
        KeyMaterial::Public(k) => match &k.inner {
            PublicKeyInner::Rsa(key) => Ok(key
                .to_public_key_der()
                .map_err(|e| Error::InvalidKey(format!("RSA SPKI encoding failed: {}", e)))?
                .into_vec()),
            PublicKeyInner::Ecc(key) => Ok(key
                .to_public_key_der()
                .map_err(|e| Error::InvalidKey(format!("EC SPKI encoding failed: {}", e)))?
                .into_vec()),
        },
        KeyMaterial::Private(k) => match &k.inner {
            PrivateKeyInner::Rsa(key) => Ok(key
                .to_pkcs8_der()
                .map_err(|e| Error::InvalidKey(format!("RSA PKCS#8 encoding failed: {}", e)))?
                .as_bytes()
                .to_vec()),
            PrivateKeyInner::Ecc(key) => Ok(key
                .to_pkcs8_der()
                .map_err(|e| Error::InvalidKey(format!("EC PKCS#8 encoding failed: {}", e)))?
                .as_bytes()
                .to_vec()),
        },
    }
}

/// Encodes key material as standard Base64 of its canonical bytes
pub fn encode_base64(key: &KeyMaterial) -> Result<String> {
    Ok(general_purpose::STANDARD.encode(canonical_bytes(key)?))
}

/// Decodes key material from standard Base64
///
/// The expected algorithm and role select the byte layout to parse;
/// anything that fails to parse as that layout is a malformed key.
pub fn decode_base64(encoded: &str, algorithm: KeyAlgorithm, role: KeyRole) -> Result<KeyMaterial> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::MalformedKey(format!("invalid Base64: {}", e)))?;

    decode_bytes(&bytes, algorithm, role)
}

/// Encodes key material as labeled PEM text
pub fn encode_pem(key: &KeyMaterial) -> Result<String> {
    let label = pem_label(key.algorithm());
    let body = encode_base64(key)?;

    let mut pem = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);
    pem.push_str("-----BEGIN ");
    pem.push_str(label);
    pem.push_str(" PKCS#8-----\n");

    // Base64 is ASCII, so slicing at fixed widths is safe
    let mut start = 0;
    while start < body.len() {
        let end = usize::min(start + PEM_LINE_WIDTH, body.len());
        pem.push_str(&body[start..end]);
        pem.push('\n');
        start = end;
    }

    pem.push_str("-----END ");
    pem.push_str(label);
    pem.push_str(" PKCS#8-----\n");

    Ok(pem)
}

/// Decodes key material from labeled PEM text
///
/// The header and footer labels must match the expected algorithm.
pub fn decode_pem(pem: &str, algorithm: KeyAlgorithm, role: KeyRole) -> Result<KeyMaterial> {
    let label = pem_label(algorithm);
    let header = format!("-----BEGIN {} PKCS#8-----", label);
    let footer = format!("-----END {} PKCS#8-----", label);

    let text = pem.trim();
    let body = text
        .strip_prefix(header.as_str())
        .and_then(|t| t.strip_suffix(footer.as_str()))
        .ok_or_else(|| {
            Error::MalformedKey(format!("PEM header/footer does not match {} PKCS#8", label))
        })?;

    let compact: String = body.split_whitespace().collect();
    decode_base64(&compact, algorithm, role)
}

fn decode_bytes(bytes: &[u8], algorithm: KeyAlgorithm, role: KeyRole) -> Result<KeyMaterial> {
    match (algorithm, role) {
        (KeyAlgorithm::Aes, KeyRole::Secret) => SymmetricKey::new(bytes.to_vec())
            .map(KeyMaterial::Symmetric)
            .map_err(|_| {
                Error::MalformedKey(format!("invalid AES key length: {} bytes", bytes.len()))
            }),
        (KeyAlgorithm::Rsa, KeyRole::Public) => rsa::RsaPublicKey::from_public_key_der(bytes)
            .map(|k| KeyMaterial::Public(AsymmetricPublicKey::from_rsa(k)))
            .map_err(|e| Error::MalformedKey(format!("invalid RSA public key: {}", e))),
        (KeyAlgorithm::Rsa, KeyRole::Private) => rsa::RsaPrivateKey::from_pkcs8_der(bytes)
            .map(|k| KeyMaterial::Private(AsymmetricPrivateKey::from_rsa(k)))
            .map_err(|e| Error::MalformedKey(format!("invalid RSA private key: {}", e))),
        (KeyAlgorithm::Ecc, KeyRole::Public) => p256::PublicKey::from_public_key_der(bytes)
            .map(|k| KeyMaterial::Public(AsymmetricPublicKey::from_ecc(k)))
            .map_err(|e| Error::MalformedKey(format!("invalid EC public key: {}", e))),
        (KeyAlgorithm::Ecc, KeyRole::Private) => p256::SecretKey::from_pkcs8_der(bytes)
            .map(|k| KeyMaterial::Private(AsymmetricPrivateKey::from_ecc(k)))
            .map_err(|e| Error::MalformedKey(format!("invalid EC private key: {}", e))),
        (algorithm, role) => Err(Error::MalformedKey(format!(
            "{:?} key material has no {:?} role",
            algorithm, role
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPairMaterial;

    const RSA_PUBLIC_PEM: &str = "-----BEGIN RSA PKCS#8-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAkLV2yem6nRvQHpIfh7lH
lkx3HBvSW6qYQP3XYozPVczWdDlkHPhmqv/hpLor4jbxy7V+Nj+UrnJGcyVBwX3g
xwG7yBfi7FwW0YLCfoZDhKmYuPHyEMzijEaqBDy00X6oEDUJv2kLyvI3W45u9Q2Z
z76n7cYSI9/2FwDeoS6wTlMVrXOPh3Q/V9xc3DOshX3aiI3eg1KYLHkHoBGa3UKg
dhSKrCdKPOKCTiyWZaRRiD/bctUjY9ccMBnHqPe1kygyxlEq+jPvTf0G7ujo276h
/VzelIibcZpcL1aXGl8C/xqICTet3ZRjOi29624Zr+5m60sEsws27d2EEpVe6pJg
WwIDAQAB
-----END RSA PKCS#8-----
";

    const RSA_PRIVATE_PEM: &str = "-----BEGIN RSA PKCS#8-----
MIIEvAIBADANBgkqhkiG9w0BAQEFAASCBKYwggSiAgEAAoIBAQCQtXbJ6bqdG9Ae
kh+HuUeWTHccG9JbqphA/ddijM9VzNZ0OWQc+Gaq/+GkuiviNvHLtX42P5SuckZz
JUHBfeDHAbvIF+LsXBbRgsJ+hkOEqZi48fIQzOKMRqoEPLTRfqgQNQm/aQvK8jdb
jm71DZnPvqftxhIj3/YXAN6hLrBOUxWtc4+HdD9X3FzcM6yFfdqIjd6DUpgseQeg
EZrdQqB2FIqsJ0o84oJOLJZlpFGIP9ty1SNj1xwwGceo97WTKDLGUSr6M+9N/Qbu
6OjbvqH9XN6UiJtxmlwvVpcaXwL/GogJN63dlGM6Lb3rbhmv7mbrSwSzCzbt3YQS
lV7qkmBbAgMBAAECggEADOL43iHgI+ErMN3AZkMvFDv6mD7ROXQnga1ZT4X/z/TU
dp5gKcUXl38yZlhlIHMJW1buE2fcFlQU4M74XE7/NzNFuE7wPvsAb5q4AuTZms6W
zB/q3gLw4p8UWuY93MrtR1Kba9FJL8LpAFB4O+Uz+L0fK6lQFwosJxl4hsNBB7VA
f4QclsP79yviYAXvcIYGPrXM5tVMK65kk4FXhuNR2lFd63tWoYE51VDrqVFYODby
kwGCxtbxYobWoDYpVgbGoDuxGfM3ivUHsB1vWugNVU157KSjIC82ORmHOKROm1XW
nLF5hum49fZeXYjkPd3yhcyCHDTvbBKOJd0B3vWVIQKBgQDLEeFB+0ARlPTFGWEw
yQRQYzs1bXeTrdzNCD03sobcMzynC7NAmuk6AGvkcZDtdaq4X85CAnWN4ZaMBEsx
au7stzrkoxlNYlA5fpHJ2GcRAuT3wRxnEAQFgCfGmXVOqya0+SuFjo0TL+HPtXMD
y9TE+4MIvCz7Ym2XgP+UqL/e0QKBgQC2bV1T9QySi6sxuDGGg/UWu7jqhTxF42Bp
xyCoLnW6GbujlT0xl0/xdIoYEUe9u5M3W/FjQWzYbx7HAZrk19DZLc3m2tul9Q3q
b3ml3yCjTE0JUv13blZAtBbKBZHuGpx5xps3Eux5LBw1oD5dimGAA7Pzedgv1SXE
Nn1wh7IPawKBgGEA14O3S3GaoBoO95hgTclAvaXV9sr6wIDIsMWMaFODvjNlqWjx
Fvv3+5ISldJ45OZSDasGlbUCz/Fuk6S1mhBFrsJNDuciUYRFa8rprsI3iby36KNq
ySD/iQCbiafcpg7I//s6jzVdKBcabCiiE69NHdjsWuhyqjs3Cd+vhIghAoGAcJLI
dtjPK1eZCxN5LGMdySuKjt4tNYt8oYnJ8z7IU1Ex415i5slTAdNCrFttg/3OeOj5
6qAjBOR9f5zT8sfjD0Iev4jq5lx0e+jSjrNENsENAOX/l8W04DTBo2UQinhNezA9
9BxvZM79kXITSjHsvMyMLYFRESNdLNnbSqfSD4UCgYAMRtFnu7aprp4uW9nvgx0d
2roZiasHs0DpImE6Anh0s6AHEKZwsr/AFs2u45GrTHG55vT4Xl68NCUHT1j1b/JN
PJNtzi4BBdzuCSxxbXGdyMSGNKDG6YQnIP5WUmMyAS7u1cTgmRb1GKF53mGU3dfk
Lo9rNUvDiygNb8gaXagddA==
-----END RSA PKCS#8-----
";

    #[test]
    fn test_aes_pem_round_trip() {
        let key = SymmetricKey::generate(128).expect("Failed to generate key");
        let original = key.bytes().to_vec();
        let material = KeyMaterial::Symmetric(key);

        let pem = encode_pem(&material).expect("Failed to encode");
        assert!(pem.starts_with("-----BEGIN AES PKCS#8-----\n"));
        assert!(pem.ends_with("-----END AES PKCS#8-----\n"));

        let decoded = decode_pem(&pem, KeyAlgorithm::Aes, KeyRole::Secret)
            .expect("Failed to decode")
            .into_symmetric()
            .expect("Expected a symmetric key");

        assert_eq!(decoded.bytes(), original.as_slice());
    }

    #[test]
    fn test_ecc_pair_round_trip() {
        let pair = KeyPairMaterial::generate(KeyAlgorithm::Ecc).expect("Failed to generate pair");

        let public = KeyMaterial::Public(pair.public().clone());
        let private = KeyMaterial::Private(pair.private().clone());

        let public_pem = encode_pem(&public).expect("Failed to encode public");
        let private_pem = encode_pem(&private).expect("Failed to encode private");
        assert!(public_pem.starts_with("-----BEGIN EC PKCS#8-----\n"));
        assert!(private_pem.starts_with("-----BEGIN EC PKCS#8-----\n"));

        let decoded_public = decode_pem(&public_pem, KeyAlgorithm::Ecc, KeyRole::Public)
            .expect("Failed to decode public");
        let decoded_private = decode_pem(&private_pem, KeyAlgorithm::Ecc, KeyRole::Private)
            .expect("Failed to decode private");

        assert_eq!(
            canonical_bytes(&decoded_public).expect("Failed to re-encode"),
            canonical_bytes(&public).expect("Failed to encode")
        );
        assert_eq!(
            canonical_bytes(&decoded_private).expect("Failed to re-encode"),
            canonical_bytes(&private).expect("Failed to encode")
        );
    }

    #[test]
    fn test_rsa_public_pem_round_trip() {
        let decoded = decode_pem(RSA_PUBLIC_PEM, KeyAlgorithm::Rsa, KeyRole::Public)
            .expect("Failed to decode RSA public key");
        assert_eq!(decoded.algorithm(), KeyAlgorithm::Rsa);
        assert_eq!(decoded.role(), KeyRole::Public);

        let pem = encode_pem(&decoded).expect("Failed to re-encode");
        assert_eq!(pem, RSA_PUBLIC_PEM);
    }

    #[test]
    fn test_rsa_private_pem_round_trip() {
        let decoded = decode_pem(RSA_PRIVATE_PEM, KeyAlgorithm::Rsa, KeyRole::Private)
            .expect("Failed to decode RSA private key");
        assert_eq!(decoded.algorithm(), KeyAlgorithm::Rsa);
        assert_eq!(decoded.role(), KeyRole::Private);

        let pem = encode_pem(&decoded).expect("Failed to re-encode");
        let again = decode_pem(&pem, KeyAlgorithm::Rsa, KeyRole::Private)
            .expect("Failed to decode re-encoded key");

        assert_eq!(
            canonical_bytes(&again).expect("Failed to encode"),
            canonical_bytes(&decoded).expect("Failed to encode")
        );
    }

    #[test]
    fn test_decode_private_as_public_fails() {
        let result = decode_pem(RSA_PRIVATE_PEM, KeyAlgorithm::Rsa, KeyRole::Public);
        assert!(matches!(result, Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_pem_header_mismatch() {
        let result = decode_pem(RSA_PUBLIC_PEM, KeyAlgorithm::Ecc, KeyRole::Public);
        assert!(matches!(result, Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let result = decode_base64("not valid base64!!!", KeyAlgorithm::Aes, KeyRole::Secret);
        assert!(matches!(result, Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_decode_wrong_layout() {
        // A valid AES key is not a valid DER-encoded RSA key
        let key = SymmetricKey::generate(256).expect("Failed to generate key");
        let encoded = encode_base64(&KeyMaterial::Symmetric(key)).expect("Failed to encode");

        let result = decode_base64(&encoded, KeyAlgorithm::Rsa, KeyRole::Public);
        assert!(matches!(result, Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_decode_impossible_role() {
        let result = decode_base64("AAAA", KeyAlgorithm::Aes, KeyRole::Public);
        assert!(matches!(result, Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_encoded_key_has_matching_body() {
        let pair = KeyPairMaterial::generate(KeyAlgorithm::Ecc).expect("Failed to generate pair");
        let material = KeyMaterial::Public(pair.public().clone());

        let encoded = EncodedKey::of(&material).expect("Failed to encode");
        let compact: String = encoded
            .pem
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect();

        assert_eq!(compact, encoded.base64);
    }
}
