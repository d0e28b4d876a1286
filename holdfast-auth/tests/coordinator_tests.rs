use std::sync::Arc;
use std::time::Duration;

use holdfast_auth::{AuthError, ChangePasswordStatus, PasswordChangeCoordinator};
use holdfast_crypto::{
    generate_mnemonic, hash_password, open_seed, seal_seed_with_params, KdfParams,
};
use holdfast_store::{
    ControlSocket, CredentialRecord, CredentialStore, FileStore, StatusDir,
};
use tempfile::TempDir;

fn cheap_kdf() -> KdfParams {
    KdfParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

struct Fixture {
    _dir: TempDir,
    creds: CredentialStore,
    statuses: FileStore,
    coordinator: Arc<PasswordChangeCoordinator>,
    mnemonic: Vec<String>,
}

/// A registered installation with the seed sealed under "password1234".
fn registered() -> Fixture {
    let dir = TempDir::new().unwrap();
    let files = FileStore::open(dir.path().join("data")).unwrap();
    let statuses = FileStore::open(dir.path().join("statuses")).unwrap();

    let creds = CredentialStore::new(files);
    let mnemonic = generate_mnemonic().unwrap();
    let sealed = seal_seed_with_params(&mnemonic, "password1234", &cheap_kdf()).unwrap();
    creds
        .write(&CredentialRecord {
            name: "Operator".into(),
            password: Some(hash_password("password1234").unwrap()),
            seed: Some(sealed),
            ..Default::default()
        })
        .unwrap();

    let coordinator = Arc::new(PasswordChangeCoordinator::new(
        creds.clone(),
        StatusDir::new(statuses.clone()),
        ControlSocket::new(dir.path().join("no-socket")),
    ));

    Fixture {
        _dir: dir,
        creds,
        statuses,
        coordinator,
        mnemonic,
    }
}

#[test]
fn rotation_reseals_the_seed() {
    let fx = registered();
    fx.coordinator
        .change_password("password1234", "password12345")
        .unwrap();

    assert_eq!(
        fx.coordinator.status(),
        ChangePasswordStatus {
            percent: 100,
            error: None
        }
    );

    // The seed now opens only under the new password
    let record = fx.creds.read().unwrap();
    let sealed = record.seed.unwrap();
    assert_eq!(open_seed(&sealed, "password12345").unwrap(), fx.mnemonic);
    assert!(open_seed(&sealed, "password1234").is_err());

    // The host system got the new password (best-effort hand-off)
    assert_eq!(fx.statuses.read_text("password").unwrap(), "password12345");
}

#[test]
fn wrong_current_password_fails_distinctly() {
    let fx = registered();
    let before = fx.creds.read().unwrap();

    let result = fx.coordinator.change_password("password9999", "password12345");
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    assert_eq!(
        fx.coordinator.status(),
        ChangePasswordStatus {
            percent: 100,
            error: Some(true)
        }
    );

    // The stored record is untouched
    let after = fx.creds.read().unwrap();
    assert_eq!(before.password, after.password);
}

#[test]
fn status_is_stable_after_completion() {
    let fx = registered();
    fx.coordinator
        .change_password("password1234", "password12345")
        .unwrap();

    let first = fx.coordinator.status();
    let second = fx.coordinator.status();
    assert_eq!(first.percent, 100);
    assert_eq!(first, second);
}

#[test]
fn status_serializes_without_error_field_on_success() {
    let fx = registered();
    fx.coordinator
        .change_password("password1234", "password12345")
        .unwrap();

    let json = serde_json::to_value(fx.coordinator.status()).unwrap();
    assert_eq!(json["percent"], 100);
    assert!(json.get("error").is_none());
}

#[test]
fn concurrent_rotation_conflicts() {
    let fx = registered();
    let coordinator = fx.coordinator.clone();

    // The first rotation spends noticeable time in Argon2 verification,
    // leaving the status at InProgress long enough to observe.
    let handle = std::thread::spawn(move || {
        coordinator.change_password("password1234", "password12345")
    });

    while fx.coordinator.status().percent == 0 {
        std::thread::sleep(Duration::from_millis(5));
    }

    if fx.coordinator.status().percent == 1 {
        assert!(matches!(
            fx.coordinator.change_password("password1234", "password123456"),
            Err(AuthError::Conflict)
        ));
    }

    handle.join().unwrap().unwrap();
    assert_eq!(fx.coordinator.status().percent, 100);
}

#[test]
fn a_completed_rotation_allows_the_next() {
    let fx = registered();
    fx.coordinator
        .change_password("password1234", "password12345")
        .unwrap();
    fx.coordinator
        .change_password("password12345", "password123456")
        .unwrap();

    let record = fx.creds.read().unwrap();
    let sealed = record.seed.unwrap();
    assert_eq!(open_seed(&sealed, "password123456").unwrap(), fx.mnemonic);
}

#[test]
fn unregistered_rotation_fails() {
    let dir = TempDir::new().unwrap();
    let files = FileStore::open(dir.path().join("data")).unwrap();
    let statuses = FileStore::open(dir.path().join("statuses")).unwrap();

    let coordinator = PasswordChangeCoordinator::new(
        CredentialStore::new(files),
        StatusDir::new(statuses),
        ControlSocket::new(dir.path().join("no-socket")),
    );

    assert!(matches!(
        coordinator.change_password("password1234", "password12345"),
        Err(AuthError::NotRegistered)
    ));
    assert_eq!(coordinator.status().error, Some(true));
}
