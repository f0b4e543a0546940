use keyseal::crypto::{self, SignatureScheme};
use keyseal::keyring::{FileKeySource, KeyPairNames, KeyPurpose, KeyRing, KeyRingConfig};
use keyseal::keys::{KeyAlgorithm, KeyPairMaterial};
use keyseal::token::{TokenIssuer, TokenVerifier, Verified};
use keyseal::{Error, KeySource};

fn fixture_ring() -> KeyRing<FileKeySource> {
    KeyRing::new(FileKeySource::new("tests/keys"))
}

#[test]
fn test_default_layout_resolves_fixture_directory() {
    let ring = fixture_ring();

    let signing = ring
        .find_role_key_pair(KeyPurpose::SignatureIssuer)
        .expect("Failed to look up signing pair")
        .expect("Expected the checked-in signing pair");
    let content = ring
        .find_role_key_pair(KeyPurpose::ContentEncrypt)
        .expect("Failed to look up content pair")
        .expect("Expected the checked-in content pair");

    assert_eq!(signing.algorithm(), KeyAlgorithm::Rsa);
    assert_eq!(content.algorithm(), KeyAlgorithm::Ecc);
}

#[test]
fn test_empty_directory_is_a_bootstrap_state() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let ring = KeyRing::new(FileKeySource::new(dir.path()));

    let pair = ring
        .find_role_key_pair(KeyPurpose::ContentEncrypt)
        .expect("Failed to look up pair");

    assert!(pair.is_none());
}

// First run: nothing on disk, generate, persist, and a fresh ring
// sees the same pair.
#[test]
fn test_bootstrap_generate_store_reload() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let ring = KeyRing::new(FileKeySource::new(dir.path()));
    assert!(ring
        .find_role_key_pair(KeyPurpose::ContentEncrypt)
        .expect("Failed to look up pair")
        .is_none());

    let pair = KeyPairMaterial::generate(KeyAlgorithm::Ecc).expect("Failed to generate pair");
    ring.store_role_key_pair(KeyPurpose::ContentEncrypt, &pair)
        .expect("Failed to store pair");

    let reloaded_ring = KeyRing::new(FileKeySource::new(dir.path()));
    let found = reloaded_ring
        .find_role_key_pair(KeyPurpose::ContentDecrypt)
        .expect("Failed to look up pair")
        .expect("Expected the stored pair");

    assert_eq!(found.public(), pair.public());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let source = FileKeySource::new(dir.path());
    source
        .write("content_public.pem", "not pem at all")
        .expect("Failed to write file");
    source
        .write("content_private.pem", "not pem either")
        .expect("Failed to write file");

    let ring = KeyRing::new(source);
    let result = ring.find_role_key_pair(KeyPurpose::ContentEncrypt);

    assert!(matches!(result, Err(Error::MalformedKey(_))));
}

#[test]
fn test_purpose_override_points_at_other_files() {
    let config = KeyRingConfig::new().with_signature_verifier(KeyPairNames::new(
        "other_sign_public.pem",
        "other_sign_private.pem",
        KeyAlgorithm::Rsa,
    ));
    let ring = KeyRing::with_config(FileKeySource::new("tests/keys"), config);

    let standard = ring
        .find_role_key_pair(KeyPurpose::SignatureIssuer)
        .expect("Failed to look up pair")
        .expect("Expected the checked-in pair");
    let other = ring
        .find_role_key_pair(KeyPurpose::SignatureVerifier)
        .expect("Failed to look up pair")
        .expect("Expected the alternate pair");

    assert_ne!(standard.public(), other.public());
}

// The checked-in pairs must each be internally consistent: the halves
// sign and seal together no matter which purpose points at them.
#[test]
fn test_fixture_pairs_sign_and_seal() {
    let config = KeyRingConfig::new()
        .with_signature_issuer(KeyPairNames::new(
            "sign_public.pem",
            "sign_private.pem",
            KeyAlgorithm::Rsa,
        ))
        .with_signature_verifier(KeyPairNames::new(
            "other_sign_public.pem",
            "other_sign_private.pem",
            KeyAlgorithm::Rsa,
        ))
        .with_content_encrypt(KeyPairNames::new(
            "content_public.pem",
            "content_private.pem",
            KeyAlgorithm::Ecc,
        ))
        .with_content_decrypt(KeyPairNames::new(
            "other_content_public.pem",
            "other_content_private.pem",
            KeyAlgorithm::Ecc,
        ));
    let ring = KeyRing::with_config(FileKeySource::new("tests/keys"), config);

    let purposes = [
        KeyPurpose::SignatureIssuer,
        KeyPurpose::SignatureVerifier,
        KeyPurpose::ContentEncrypt,
        KeyPurpose::ContentDecrypt,
    ];
    let message = b"halves must belong to the same pair";

    for purpose in purposes {
        let pair = ring
            .find_role_key_pair(purpose)
            .expect("Failed to look up pair")
            .expect("Expected a checked-in pair");

        let scheme =
            SignatureScheme::for_algorithm(pair.algorithm()).expect("Failed to map scheme");
        let signature = crypto::sign(pair.private(), message, scheme).expect("Failed to sign");
        let valid = crypto::verify(pair.public(), message, &signature, scheme)
            .expect("Failed to verify");
        assert!(valid);

        let ciphertext =
            crypto::encrypt_with_public_key(pair.public(), message).expect("Failed to encrypt");
        let decrypted = crypto::decrypt_with_private_key(pair.private(), &ciphertext)
            .expect("Failed to decrypt");
        assert_eq!(decrypted.as_slice(), message);
    }
}

// Keys resolved through the ring drive the token path end to end.
#[test]
fn test_ring_keys_issue_and_verify() {
    let ring = fixture_ring();

    let signing = ring
        .find_role_key_pair(KeyPurpose::SignatureIssuer)
        .expect("Failed to look up signing pair")
        .expect("Expected the checked-in signing pair");
    let content = ring
        .find_role_key_pair(KeyPurpose::ContentEncrypt)
        .expect("Failed to look up content pair")
        .expect("Expected the checked-in content pair");

    let issuer = TokenIssuer::builder()
        .with_signing_key(signing.private().clone())
        .with_encryption_key(content.public().clone())
        .build()
        .expect("Failed to build issuer");
    let verifier = TokenVerifier::builder()
        .with_verifying_key(signing.public().clone())
        .with_decryption_key(content.private().clone())
        .build()
        .expect("Failed to build verifier");

    let token = issuer
        .issue(&"account-7", &"state")
        .expect("Failed to issue token");
    let verified: Verified<String, String> = verifier
        .verify(&token)
        .expect("Failed to verify token");

    assert_eq!(verified.subject, "account-7");
}
