//! Cross-engine tests through the runtime-selected store.
//!
//! The same scenario runs against both engines via [`StoreConfig`], and the
//! results must be identical.


use std::time::Duration;

use engine_tests::{all_keys, load_numbered, read};
use kvbridge::dump::restore;
use kvbridge::{open, AnyStore, Cursor, Db, EngineKind, StorageError, StoreConfig, Txn};
use tempfile::TempDir;

fn open_store(engine: EngineKind) -> (TempDir, AnyStore) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let config = StoreConfig::new(dir.path().join("store"), engine);
    let store = open(&config).expect("failed to open store");
    assert_eq!(store.kind(), engine);
    (dir, store)
}

fn run_scenario(engine: EngineKind) {
    let (_dir, store) = open_store(engine);
    assert_eq!(store.name(), engine.as_str());
    load_numbered(&store, 100);

    assert_eq!(read(&store, b"key042"), Some(b"val042".to_vec()));

    let mut batch = Vec::new();
    store
        .batch_get(["key042", "key079"], |key, value| {
            batch.push((key.to_vec(), value.map(<[u8]>::to_vec)));
            Ok::<_, StorageError>(())
        })
        .expect("failed to batch_get");
    assert_eq!(
        batch,
        vec![
            (b"key042".to_vec(), Some(b"val042".to_vec())),
            (b"key079".to_vec(), Some(b"val079".to_vec())),
        ]
    );

    let keys = all_keys(&store);
    assert_eq!(keys.len(), 100);
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(keys[0], b"key000".to_vec());
    assert_eq!(keys[99], b"key099".to_vec());

    let mut cursor = store.iterator().expect("failed to open cursor");
    assert_eq!(cursor.seek(b"key500").expect("failed to seek"), None);
    cursor.close();

    // Uncommitted writes are invisible to readers and gone after rollback.
    let mut txn = store.txn().expect("failed to begin txn");
    txn.put(b"key042", b"abc").expect("failed to put");
    let mut cursor = store.iterator().expect("failed to open cursor");
    assert_eq!(
        cursor.seek(b"key042").expect("failed to seek"),
        Some((b"key042".to_vec(), b"val042".to_vec()))
    );
    cursor.close();
    txn.rollback().expect("failed to rollback");
    assert!(!txn.is_open());
    assert_eq!(read(&store, b"key042"), Some(b"val042".to_vec()));

    let mut txn = store.txn().expect("failed to begin txn");
    txn.put(b"key042", b"abc").expect("failed to put");
    assert_eq!(txn.get(b"key042").expect("failed to get"), Some(b"abc".to_vec()));
    assert_eq!(txn.get(b"key500").expect("failed to get"), None);
    txn.commit().expect("failed to commit");

    assert_eq!(read(&store, b"key042"), Some(b"abc".to_vec()));
    store.close().expect("failed to close");
}

#[test]
fn test_scenario_on_redb() {
    run_scenario(EngineKind::Redb);
}

#[test]
fn test_scenario_on_lsm() {
    run_scenario(EngineKind::Lsm);
}

#[test]
fn test_engines_agree_on_traversal() {
    let (_redb_dir, redb) = open_store(EngineKind::Redb);
    let (_lsm_dir, lsm) = open_store(EngineKind::Lsm);

    for store in [&redb, &lsm] {
        let mut txn = store.txn().expect("failed to begin txn");
        for key in [&b"\x00"[..], b"a", b"ab", b"b", b"\xff", b"\xff\x00"] {
            txn.put(key, key).expect("failed to put");
        }
        txn.delete(b"ab").expect("failed to delete");
        txn.commit().expect("failed to commit");
    }

    assert_eq!(all_keys(&redb), all_keys(&lsm));
    assert_eq!(
        all_keys(&lsm),
        vec![b"\x00".to_vec(), b"a".to_vec(), b"b".to_vec(), b"\xff".to_vec(), b"\xff\x00".to_vec()]
    );
}

#[test]
fn test_migrate_redb_dump_into_lsm() {
    let (_redb_dir, redb) = open_store(EngineKind::Redb);
    let (_lsm_dir, lsm) = open_store(EngineKind::Lsm);
    load_numbered(&redb, 100);

    let mut dump = Vec::new();
    redb.write_to(&mut dump).expect("failed to write dump");
    let loaded = restore(&lsm, dump.as_slice()).expect("failed to restore");

    assert_eq!(loaded, 100);
    assert_eq!(all_keys(&lsm), all_keys(&redb));
    assert_eq!(read(&lsm, b"key099"), Some(b"val099".to_vec()));
}

#[test]
fn test_lock_timeout_from_config() {
    for engine in [EngineKind::Redb, EngineKind::Lsm] {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = StoreConfig::new(dir.path().join("store"), engine)
            .lock_timeout(Duration::from_millis(20))
            .sync_on_commit(true);
        let store = config.open().expect("failed to open store");

        let _held = store.txn().expect("failed to begin txn");
        let err = store.txn().expect_err("second writer should time out");
        assert!(matches!(err, StorageError::LockTimeout(_)), "{engine}: {err}");
    }
}

#[test]
fn test_engine_from_string() {
    let engine: EngineKind = "btree".parse().expect("failed to parse engine");
    let (_dir, store) = open_store(engine);
    assert_eq!(store.name(), "redb");
}
