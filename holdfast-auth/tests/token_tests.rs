use std::time::Duration;

use holdfast_auth::{AuthError, TokenService, TEMPORARY_SUBJECT};
use holdfast_store::{FileStore, KeyPair, KeyPairStore, PRIVATE_KEY_BLOB, PUBLIC_KEY_BLOB};
use tempfile::TempDir;

const FIXTURE1_KEY: &str = include_str!("fixtures/fixture1.key");
const FIXTURE1_PUB: &str = include_str!("fixtures/fixture1.pem");
const FIXTURE2_KEY: &str = include_str!("fixtures/fixture2.key");
const FIXTURE2_PUB: &str = include_str!("fixtures/fixture2.pem");

/// Token service preloaded with a fixture key pair, so tests exercise
/// issue/verify without paying for RSA generation.
fn fixture_service(private_pem: &str, public_pem: &str) -> (TempDir, TokenService) {
    let dir = TempDir::new().unwrap();
    let files = FileStore::open(dir.path()).unwrap();
    let store = KeyPairStore::new(files);
    store
        .save(&KeyPair {
            private_pem: private_pem.to_string(),
            public_pem: public_pem.to_string(),
        })
        .unwrap();

    let service = TokenService::new(store);
    service.ensure_key_pair().unwrap();
    (dir, service)
}

#[test]
fn issue_and_verify_round_trip() {
    let (_dir, service) = fixture_service(FIXTURE1_KEY, FIXTURE1_PUB);
    let token = service.issue("admin").unwrap();
    assert_eq!(service.verify(&token).unwrap(), "admin");
    assert_eq!(service.verify_privileged(&token).unwrap(), "admin");
}

#[test]
fn short_lived_token_expires() {
    let (_dir, service) = fixture_service(FIXTURE1_KEY, FIXTURE1_PUB);
    let token = service.issue_with_ttl("admin", 1).unwrap();

    // Valid immediately
    assert_eq!(service.verify(&token).unwrap(), "admin");

    // Expired after the ttl has passed — zero leeway
    std::thread::sleep(Duration::from_secs(2));
    assert!(matches!(
        service.verify(&token),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn foreign_key_pair_rejected() {
    let (_dir, issuer) = fixture_service(FIXTURE1_KEY, FIXTURE1_PUB);
    let (_dir2, verifier) = fixture_service(FIXTURE2_KEY, FIXTURE2_PUB);

    let token = issuer.issue("admin").unwrap();
    assert!(matches!(
        verifier.verify(&token),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn malformed_tokens_fail_closed() {
    let (_dir, service) = fixture_service(FIXTURE1_KEY, FIXTURE1_PUB);
    for garbage in ["", "not-a-jwt", "a.b.c", "eyJhbGciOiJSUzI1NiJ9..sig"] {
        assert!(
            matches!(service.verify(garbage), Err(AuthError::InvalidCredentials)),
            "token {garbage:?} must be rejected, not error out"
        );
    }
}

#[test]
fn temporary_subject_is_not_privileged() {
    let (_dir, service) = fixture_service(FIXTURE1_KEY, FIXTURE1_PUB);
    let token = service.issue_temporary().unwrap();

    // Verifiable as the temporary subject...
    assert_eq!(service.verify(&token).unwrap(), TEMPORARY_SUBJECT);
    // ...but never accepted for privileged operations
    assert!(matches!(
        service.verify_privileged(&token),
        Err(AuthError::InvalidCredentials)
    ));
}

#[test]
fn issue_before_startup_initialization_fails() {
    let dir = TempDir::new().unwrap();
    let files = FileStore::open(dir.path()).unwrap();
    let service = TokenService::new(KeyPairStore::new(files));

    assert!(matches!(
        service.issue("admin"),
        Err(AuthError::KeyGeneration(_))
    ));
}

#[test]
fn first_boot_generates_and_persists_a_pair() {
    let dir = TempDir::new().unwrap();
    let files = FileStore::open(dir.path()).unwrap();
    let store = KeyPairStore::new(files.clone());

    // 2048 bits keeps this test reasonable; the default stays 3072.
    let service =
        TokenService::with_config(store, 3600, 2048, Duration::from_secs(300));
    service.ensure_key_pair().unwrap();

    let private = files.read_text(PRIVATE_KEY_BLOB).unwrap();
    let public = files.read_text(PUBLIC_KEY_BLOB).unwrap();
    assert!(private.contains("BEGIN PRIVATE KEY"));
    assert!(public.contains("BEGIN PUBLIC KEY"));

    // Tokens issued with the fresh pair verify
    let token = service.issue("admin").unwrap();
    assert_eq!(service.verify(&token).unwrap(), "admin");

    // A second call loads rather than regenerates
    service.ensure_key_pair().unwrap();
    assert_eq!(files.read_text(PRIVATE_KEY_BLOB).unwrap(), private);
    assert_eq!(files.read_text(PUBLIC_KEY_BLOB).unwrap(), public);
}
