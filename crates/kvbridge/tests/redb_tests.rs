//! Redb store compliance tests.
//!
//! Runs the store test suite against the redb backend, plus tests for
//! behaviour only the file-backed B-tree has.


use std::time::Duration;

use engine_tests::{load_numbered, read, run_test_suite, TestHarness};
use kvbridge::backends::{RedbConfig, RedbStore};
use kvbridge::dump::restore;
use kvbridge::{Db, StorageError, StorageResult, Txn};
use tempfile::TempDir;

/// Test harness for the file-backed redb store.
struct RedbHarness;

impl TestHarness for RedbHarness {
    type Store = RedbStore;

    fn create_store() -> StorageResult<(TempDir, Self::Store)> {
        let dir = tempfile::tempdir()?;
        let store = RedbStore::open(dir.path().join("test.redb"))?;
        Ok((dir, store))
    }
}

/// Test harness for the in-memory redb store, with a small cursor batch.
struct RedbMemoryHarness;

impl TestHarness for RedbMemoryHarness {
    type Store = RedbStore;

    fn create_store() -> StorageResult<(TempDir, Self::Store)> {
        let dir = tempfile::tempdir()?;
        let store = RedbStore::in_memory_with_config(RedbConfig::new().cursor_batch_size(7))?;
        Ok((dir, store))
    }
}

#[test]
fn test_redb_compliance() {
    run_test_suite::<RedbHarness>();
}

#[test]
fn test_redb_in_memory_compliance() {
    run_test_suite::<RedbMemoryHarness>();
}

#[test]
fn test_redb_name() {
    let store = RedbStore::in_memory().expect("failed to create store");
    assert_eq!(store.name(), "redb");
}

#[test]
fn test_redb_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("persist.redb");

    {
        let store = RedbStore::open(&path).expect("failed to open store");
        load_numbered(&store, 10);
        store.close().expect("failed to close");
    }

    let store = RedbStore::open(&path).expect("failed to reopen store");
    assert_eq!(read(&store, b"key007"), Some(b"val007".to_vec()));
}

#[test]
fn test_redb_dump_and_restore() {
    let source = RedbStore::in_memory().expect("failed to create store");
    load_numbered(&source, 250);

    let mut dump = Vec::new();
    let bytes = source.write_to(&mut dump).expect("failed to write dump");
    assert_eq!(bytes, dump.len() as u64);

    let target = RedbStore::in_memory().expect("failed to create store");
    let loaded = restore(&target, dump.as_slice()).expect("failed to restore");
    assert_eq!(loaded, 250);
    assert_eq!(read(&target, b"key249"), Some(b"val249".to_vec()));
}

#[test]
fn test_redb_restore_of_corrupt_dump_commits_nothing() {
    let source = RedbStore::in_memory().expect("failed to create store");
    load_numbered(&source, 20);

    let mut dump = Vec::new();
    source.write_to(&mut dump).expect("failed to write dump");
    let last = dump.len() - 1;
    dump[last] ^= 0xFF;

    let target = RedbStore::in_memory().expect("failed to create store");
    let err = restore(&target, dump.as_slice()).expect_err("restore should fail");
    assert!(matches!(err, StorageError::Dump(ref e) if e.is_corruption()));
    assert_eq!(read(&target, b"key000"), None);
}

#[test]
fn test_redb_lock_timeout() {
    let config = RedbConfig::new().lock_timeout(Duration::from_millis(50));
    let store = RedbStore::in_memory_with_config(config).expect("failed to create store");

    let mut held = store.txn().expect("failed to begin txn");
    let err = store.txn().expect_err("second writer should time out");
    assert!(matches!(err, StorageError::LockTimeout(_)));
    assert!(err.is_recoverable());

    held.rollback().expect("failed to rollback");
    let mut next = store.txn().expect("failed to begin txn after release");
    next.commit().expect("failed to commit");
}
