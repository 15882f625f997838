//! Property tests for cursor ordering and seek semantics.
//!
//! Each engine is checked against a `BTreeMap` model after an arbitrary
//! sequence of committed puts and deletes.

use std::collections::BTreeMap;

use kvbridge::backends::{LsmConfig, LsmStore, RedbConfig, RedbStore};
use kvbridge::{Cursor, Db, Txn};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

fn key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..6)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (key(), prop::collection::vec(any::<u8>(), 0..8)).prop_map(|(k, v)| Op::Put(k, v)),
        1 => key().prop_map(Op::Delete),
    ]
}

/// Apply `ops` in one transaction and mirror them in the model.
fn apply<D: Db>(store: &D, ops: &[Op]) -> BTreeMap<Vec<u8>, Vec<u8>> {
    let mut model = BTreeMap::new();
    let mut txn = store.txn().expect("failed to begin txn");
    for op in ops {
        match op {
            Op::Put(k, v) => {
                txn.put(k, v).expect("failed to put");
                model.insert(k.clone(), v.clone());
            }
            Op::Delete(k) => {
                txn.delete(k).expect("failed to delete");
                model.remove(k);
            }
        }
    }
    txn.commit().expect("failed to commit");
    model
}

fn check_against_model<D: Db>(store: &D, model: &BTreeMap<Vec<u8>, Vec<u8>>, target: &[u8]) {
    let mut cursor = store.iterator().expect("failed to open cursor");

    let mut forward = Vec::new();
    let mut entry = cursor.seek_first().expect("failed to seek_first");
    while let Some(kv) = entry {
        forward.push(kv);
        entry = cursor.next().expect("failed to next");
    }
    let expected: Vec<_> = model.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    assert_eq!(forward, expected);

    let mut backward = Vec::new();
    let mut entry = cursor.seek_last().expect("failed to seek_last");
    while let Some(kv) = entry {
        backward.push(kv);
        entry = cursor.prev().expect("failed to prev");
    }
    backward.reverse();
    assert_eq!(backward, expected);

    // Seek lands on the least key >= target.
    let ceiling = model.range(target.to_vec()..).next().map(|(k, v)| (k.clone(), v.clone()));
    assert_eq!(cursor.seek(target).expect("failed to seek"), ceiling);

    // Prev after seek is the greatest key < target.
    if ceiling.is_some() {
        let floor = model.range(..target.to_vec()).next_back().map(|(k, v)| (k.clone(), v.clone()));
        assert_eq!(cursor.prev().expect("failed to prev"), floor);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_redb_cursor_matches_model(
        ops in prop::collection::vec(op(), 0..60),
        target in key(),
    ) {
        let store = RedbStore::in_memory_with_config(RedbConfig::new().cursor_batch_size(3))
            .expect("failed to create store");
        let model = apply(&store, &ops);
        check_against_model(&store, &model, &target);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_lsm_cursor_matches_model(
        ops in prop::collection::vec(op(), 0..60),
        target in key(),
    ) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = LsmStore::open_with_config(
            dir.path().join("store"),
            LsmConfig::new().cursor_batch_size(3),
        )
        .expect("failed to open store");
        let model = apply(&store, &ops);
        check_against_model(&store, &model, &target);
    }
}
