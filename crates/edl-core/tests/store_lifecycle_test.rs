//! Store lifecycle tests
//!
//! Sequence numbers and the shared secret must survive a restart, whichever
//! bucket backs the store. Each "restart" builds a fresh `Store` over the
//! same durable state.

use std::fs;

use edl_core::{
    BootstrapPolicy, Bucket, MemoryBucket, RedbBucket, Store, StoreConfig, StoreError,
    StoreState,
    store::{PLACEHOLDER_SECRET, SECRET_KEY, SEQUENCE_KEY},
};
use tempfile::TempDir;

fn file_config(dir: &TempDir) -> StoreConfig {
    StoreConfig::new("oresat0", dir.path())
}

fn write_secret(dir: &TempDir, contents: &str) {
    fs::write(dir.path().join("hmac.key"), contents).expect("write secret file");
}

fn take_three<B: Bucket>(store: &Store<B>) -> Vec<u32> {
    (0..3).map(|_| store.next_sequence_number().expect("store is ready")).collect()
}

#[test]
fn sequence_survives_restart_in_memory() {
    let dir = TempDir::new().unwrap();
    write_secret(&dir, "topsecret\n");
    let bucket = MemoryBucket::new();

    let store = Store::new(bucket.clone(), file_config(&dir));
    store.start().unwrap();
    assert_eq!(take_three(&store), vec![1, 2, 3]);
    store.stop().unwrap();

    let store = Store::new(bucket, file_config(&dir));
    store.start().unwrap();
    assert_eq!(store.next_sequence_number(), Ok(4));
}

#[test]
fn sequence_survives_restart_on_disk() {
    let dir = TempDir::new().unwrap();
    write_secret(&dir, "topsecret\n");
    let config = file_config(&dir);

    {
        let bucket = RedbBucket::open(config.database_path(), &config.instance).unwrap();
        let store = Store::new(bucket, config.clone());
        store.start().unwrap();
        assert_eq!(take_three(&store), vec![1, 2, 3]);
        store.stop().unwrap();
    }

    // Remove the file: a restarted store must use the stored secret, not
    // re-read the bootstrap source.
    fs::remove_file(config.secret_path()).unwrap();

    let bucket = RedbBucket::open(config.database_path(), &config.instance).unwrap();
    let store = Store::new(bucket, config);
    store.start().unwrap();
    assert_eq!(store.next_sequence_number(), Ok(4));
    assert_eq!(store.current_secret().unwrap().as_bytes(), b"topsecret");
}

#[test]
fn crash_without_stop_loses_advances() {
    let dir = TempDir::new().unwrap();
    write_secret(&dir, "topsecret");
    let bucket = MemoryBucket::new();

    let store = Store::new(bucket.clone(), file_config(&dir));
    store.start().unwrap();
    assert_eq!(take_three(&store), vec![1, 2, 3]);
    drop(store);

    let store = Store::new(bucket, file_config(&dir));
    store.start().unwrap();
    assert_eq!(store.next_sequence_number(), Ok(1));
}

#[test]
fn bootstrap_reads_first_line_and_persists_it() {
    let dir = TempDir::new().unwrap();
    write_secret(&dir, "topsecret\nignored second line\n");
    let bucket = MemoryBucket::new();

    let store = Store::new(bucket.clone(), file_config(&dir));
    store.start().unwrap();

    assert_eq!(store.current_secret().unwrap().as_bytes(), b"topsecret");
    assert_eq!(bucket.peek(SECRET_KEY), Some(b"topsecret".to_vec()));
    assert_eq!(bucket.peek(SEQUENCE_KEY), Some(vec![0, 0, 0, 1]));
}

#[test]
fn missing_secret_file_fails_start() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(MemoryBucket::new(), file_config(&dir));

    match store.start() {
        Err(StoreError::BootstrapSecretMissing { path, .. }) => {
            assert_eq!(path, dir.path().join("hmac.key"));
        },
        other => panic!("expected BootstrapSecretMissing, got {other:?}"),
    }
    assert_eq!(store.state(), Ok(StoreState::Uninitialized));
}

#[test]
fn placeholder_policy_needs_no_file() {
    let dir = TempDir::new().unwrap();
    let mut config = file_config(&dir);
    config.bootstrap = BootstrapPolicy::Placeholder;

    let store = Store::new(MemoryBucket::new(), config);
    store.start().unwrap();

    assert_eq!(store.current_secret().unwrap().as_bytes(), &PLACEHOLDER_SECRET);
}

#[test]
fn config_file_drives_the_store() {
    let dir = TempDir::new().unwrap();
    write_secret(&dir, "from-config\n");

    let config_path = dir.path().join("uplink.toml");
    fs::write(
        &config_path,
        format!(
            "instance = \"oresat0\"\ndata_dir = \"{}\"\npersistence = \"every_advance\"\n",
            dir.path().display()
        ),
    )
    .unwrap();

    let config = StoreConfig::from_file(&config_path).unwrap();
    let bucket = MemoryBucket::new();
    let store = Store::new(bucket.clone(), config);
    store.start().unwrap();

    assert_eq!(store.next_sequence_number(), Ok(1));
    assert_eq!(bucket.peek(SEQUENCE_KEY), Some(vec![0, 0, 0, 2]));
    assert_eq!(store.current_secret().unwrap().as_bytes(), b"from-config");
}

#[test]
fn unreadable_bucket_reaches_ready_without_values() {
    let dir = TempDir::new().unwrap();
    write_secret(&dir, "topsecret");
    let bucket = MemoryBucket::new();
    bucket.fail_reads(true);

    let store = Store::new(bucket, file_config(&dir));
    store.start().unwrap();

    assert_eq!(store.state(), Ok(StoreState::Ready));
    assert!(!store.is_ready());
    assert_eq!(store.next_sequence_number(), Err(StoreError::SequenceUnavailable));
    assert_eq!(store.current_secret(), Err(StoreError::SecretUnavailable));

    // Nothing loaded, nothing saved.
    store.stop().unwrap();
    assert_eq!(store.state(), Ok(StoreState::Stopped));
}
