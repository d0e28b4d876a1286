use holdfast_store::{
    ControlSocket, CredentialRecord, CredentialStore, FileStore, KeyPair, KeyPairStore,
    SeedFileStore, StoreError, TotpSettings, PRIVATE_KEY_BLOB, PUBLIC_KEY_BLOB,
};
use tempfile::TempDir;

fn store() -> (TempDir, FileStore) {
    let dir = TempDir::new().unwrap();
    let files = FileStore::open(dir.path()).unwrap();
    (dir, files)
}

#[test]
fn text_blob_round_trip() {
    let (_dir, files) = store();
    files.write_text("greeting", "hello").unwrap();
    assert_eq!(files.read_text("greeting").unwrap(), "hello");
}

#[test]
fn overwrite_replaces_contents() {
    let (_dir, files) = store();
    files.write_text("blob", "one").unwrap();
    files.write_text("blob", "two").unwrap();
    assert_eq!(files.read_text("blob").unwrap(), "two");
}

#[test]
fn missing_blob_is_not_found() {
    let (_dir, files) = store();
    assert!(matches!(
        files.read_text("nope"),
        Err(StoreError::NotFound(_))
    ));
    assert!(!files.exists("nope"));
}

#[test]
fn path_traversal_names_rejected() {
    let (_dir, files) = store();
    for name in ["../escape", "a/b", "", ".hidden", "a\\b"] {
        assert!(
            matches!(files.write_text(name, "x"), Err(StoreError::InvalidName(_))),
            "name {name:?} should be rejected"
        );
    }
}

#[test]
fn no_temp_file_left_behind() {
    let (dir, files) = store();
    files.write_text("blob", "contents").unwrap();
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn credential_record_uses_camel_case() {
    let (_dir, files) = store();
    let creds = CredentialStore::new(files.clone());

    let record = CredentialRecord {
        name: "Operator".into(),
        password: Some("$argon2id$stub".into()),
        installed_apps: vec!["example-app".into()],
        ..Default::default()
    };
    creds.write(&record).unwrap();

    let raw = files.read_text("user.json").unwrap();
    assert!(raw.contains("\"installedApps\""));
    assert!(raw.contains("\"twoFactor\""));
    assert!(!raw.contains("installed_apps"));

    let read = creds.read().unwrap();
    assert_eq!(read.name, "Operator");
    assert_eq!(read.installed_apps, vec!["example-app".to_string()]);
}

#[test]
fn credential_record_defaults_missing_fields() {
    let (_dir, files) = store();
    // A minimal legacy record without settings or apps
    files
        .write_text("user.json", r#"{"name":"Operator"}"#)
        .unwrap();

    let creds = CredentialStore::new(files);
    let record = creds.read().unwrap();
    assert_eq!(record.name, "Operator");
    assert!(record.password.is_none());
    assert!(record.installed_apps.is_empty());
    assert_eq!(record.settings.two_factor, TotpSettings::default());
}

#[test]
fn credential_delete_supports_rollback() {
    let (_dir, files) = store();
    let creds = CredentialStore::new(files);
    creds.write(&CredentialRecord::default()).unwrap();
    assert!(creds.exists());
    creds.delete().unwrap();
    assert!(!creds.exists());
}

#[test]
fn key_pair_round_trip() {
    let (_dir, files) = store();
    let keys = KeyPairStore::new(files);
    assert!(keys.load().unwrap().is_none());

    keys.save(&KeyPair {
        private_pem: "PRIVATE".into(),
        public_pem: "PUBLIC".into(),
    })
    .unwrap();

    let pair = keys.load().unwrap().unwrap();
    assert_eq!(pair.private_pem, "PRIVATE");
    assert_eq!(pair.public_pem, "PUBLIC");
}

#[test]
fn orphaned_key_half_is_fatal() {
    let (_dir, files) = store();
    files.write_text(PRIVATE_KEY_BLOB, "PRIVATE").unwrap();

    let keys = KeyPairStore::new(files.clone());
    assert!(matches!(
        keys.load(),
        Err(StoreError::KeyPairCorrupt("public"))
    ));

    files.delete(PRIVATE_KEY_BLOB).unwrap();
    files.write_text(PUBLIC_KEY_BLOB, "PUBLIC").unwrap();
    assert!(matches!(
        keys.load(),
        Err(StoreError::KeyPairCorrupt("private"))
    ));
}

#[test]
fn seed_file_writes_only_once() {
    let (_dir, files) = store();
    let seeds = SeedFileStore::new(files);

    assert!(!seeds.exists());
    seeds.write_once("aaaa").unwrap();
    assert_eq!(seeds.read().unwrap(), "aaaa");

    // Second write is a silent no-op — downstream key material must
    // never rotate.
    seeds.write_once("bbbb").unwrap();
    assert_eq!(seeds.read().unwrap(), "aaaa");
}

#[cfg(unix)]
#[test]
fn control_socket_delivers_trigger() {
    use std::io::Read;
    use std::os::unix::net::UnixListener;

    let dir = TempDir::new().unwrap();
    let socket_path = dir.path().join("control");
    let listener = UnixListener::bind(&socket_path).unwrap();

    let socket = ControlSocket::new(&socket_path);
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).unwrap();
        buf
    });

    socket.notify("change-password");
    assert_eq!(handle.join().unwrap(), "trigger change-password");
}

#[test]
fn control_socket_failure_is_swallowed() {
    let socket = ControlSocket::new("/nonexistent/socket/path");
    // Must not panic or error — signaling is fire-and-forget.
    socket.notify("change-password");
}
