//! Runtime engine selection.
//!
//! [`AnyStore`] wraps either engine behind one concrete type, for callers
//! that pick the engine from configuration instead of at compile time.
//! Its transactions and cursors are the matching enums below.

use std::io::Write;

use crate::backends::{
    LsmCursor, LsmReadTxn, LsmStore, LsmTxn, RedbCursor, RedbReadTxn, RedbStore, RedbTxn,
};
use crate::config::{EngineKind, StoreConfig};
use crate::engine::{Cursor, CursorResult, Db, ReadTxn, StorageError, StorageResult, Txn};

/// A store on either engine.
pub enum AnyStore {
    /// The B-tree engine.
    Redb(RedbStore),
    /// The LSM engine.
    Lsm(LsmStore),
}

impl AnyStore {
    /// Open the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the engine cannot open the path.
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        config.open()
    }

    /// The engine backing this store.
    #[must_use]
    pub const fn kind(&self) -> EngineKind {
        match self {
            Self::Redb(_) => EngineKind::Redb,
            Self::Lsm(_) => EngineKind::Lsm,
        }
    }
}

impl From<RedbStore> for AnyStore {
    fn from(store: RedbStore) -> Self {
        Self::Redb(store)
    }
}

impl From<LsmStore> for AnyStore {
    fn from(store: LsmStore) -> Self {
        Self::Lsm(store)
    }
}

/// A writable transaction on either engine.
#[derive(Debug)]
#[allow(clippy::large_enum_variant)]
pub enum AnyTxn {
    /// On the B-tree engine.
    Redb(RedbTxn),
    /// On the LSM engine.
    Lsm(LsmTxn),
}

/// A read-only transaction on either engine.
pub enum AnyReadTxn {
    /// On the B-tree engine.
    Redb(RedbReadTxn),
    /// On the LSM engine.
    Lsm(LsmReadTxn),
}

/// A cursor on either engine.
pub enum AnyCursor {
    /// On the B-tree engine.
    Redb(RedbCursor),
    /// On the LSM engine.
    Lsm(LsmCursor),
}

impl Db for AnyStore {
    type Txn = AnyTxn;
    type ReadTxn = AnyReadTxn;
    type Cursor = AnyCursor;

    fn batch_get<I, F, E>(&self, keys: I, f: F) -> Result<(), E>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
        F: FnMut(&[u8], Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>,
    {
        match self {
            Self::Redb(store) => store.batch_get(keys, f),
            Self::Lsm(store) => store.batch_get(keys, f),
        }
    }

    fn get<F, E>(&self, key: &[u8], f: F) -> Result<bool, E>
    where
        F: FnOnce(Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>,
    {
        match self {
            Self::Redb(store) => store.get(key, f),
            Self::Lsm(store) => store.get(key, f),
        }
    }

    fn iterator(&self) -> StorageResult<Self::Cursor> {
        match self {
            Self::Redb(store) => store.iterator().map(AnyCursor::Redb),
            Self::Lsm(store) => store.iterator().map(AnyCursor::Lsm),
        }
    }

    fn read_txn(&self) -> StorageResult<Self::ReadTxn> {
        match self {
            Self::Redb(store) => store.read_txn().map(AnyReadTxn::Redb),
            Self::Lsm(store) => store.read_txn().map(AnyReadTxn::Lsm),
        }
    }

    fn txn(&self) -> StorageResult<Self::Txn> {
        match self {
            Self::Redb(store) => store.txn().map(AnyTxn::Redb),
            Self::Lsm(store) => store.txn().map(AnyTxn::Lsm),
        }
    }

    fn write_to(&self, sink: &mut dyn Write) -> StorageResult<u64> {
        match self {
            Self::Redb(store) => store.write_to(sink),
            Self::Lsm(store) => store.write_to(sink),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Redb(store) => store.name(),
            Self::Lsm(store) => store.name(),
        }
    }

    fn close(&self) -> StorageResult<()> {
        match self {
            Self::Redb(store) => store.close(),
            Self::Lsm(store) => store.close(),
        }
    }
}

impl Txn for AnyTxn {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        match self {
            Self::Redb(txn) => txn.get(key),
            Self::Lsm(txn) => txn.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        match self {
            Self::Redb(txn) => txn.put(key, value),
            Self::Lsm(txn) => txn.put(key, value),
        }
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        match self {
            Self::Redb(txn) => txn.delete(key),
            Self::Lsm(txn) => txn.delete(key),
        }
    }

    fn commit(&mut self) -> StorageResult<()> {
        match self {
            Self::Redb(txn) => txn.commit(),
            Self::Lsm(txn) => txn.commit(),
        }
    }

    fn rollback(&mut self) -> StorageResult<()> {
        match self {
            Self::Redb(txn) => txn.rollback(),
            Self::Lsm(txn) => txn.rollback(),
        }
    }

    fn is_open(&self) -> bool {
        match self {
            Self::Redb(txn) => txn.is_open(),
            Self::Lsm(txn) => txn.is_open(),
        }
    }
}

impl ReadTxn for AnyReadTxn {
    type Cursor = AnyCursor;

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        match self {
            Self::Redb(txn) => txn.get(key),
            Self::Lsm(txn) => txn.get(key),
        }
    }

    fn iterator(&self) -> StorageResult<Self::Cursor> {
        match self {
            Self::Redb(txn) => txn.iterator().map(AnyCursor::Redb),
            Self::Lsm(txn) => txn.iterator().map(AnyCursor::Lsm),
        }
    }

    fn rollback(&mut self) -> StorageResult<()> {
        match self {
            Self::Redb(txn) => txn.rollback(),
            Self::Lsm(txn) => txn.rollback(),
        }
    }
}

impl Cursor for AnyCursor {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        match self {
            Self::Redb(cursor) => cursor.seek(key),
            Self::Lsm(cursor) => cursor.seek(key),
        }
    }

    fn seek_first(&mut self) -> CursorResult {
        match self {
            Self::Redb(cursor) => cursor.seek_first(),
            Self::Lsm(cursor) => cursor.seek_first(),
        }
    }

    fn seek_last(&mut self) -> CursorResult {
        match self {
            Self::Redb(cursor) => cursor.seek_last(),
            Self::Lsm(cursor) => cursor.seek_last(),
        }
    }

    fn next(&mut self) -> CursorResult {
        match self {
            Self::Redb(cursor) => cursor.next(),
            Self::Lsm(cursor) => cursor.next(),
        }
    }

    fn prev(&mut self) -> CursorResult {
        match self {
            Self::Redb(cursor) => cursor.prev(),
            Self::Lsm(cursor) => cursor.prev(),
        }
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        match self {
            Self::Redb(cursor) => cursor.current(),
            Self::Lsm(cursor) => cursor.current(),
        }
    }

    fn close(&mut self) {
        match self {
            Self::Redb(cursor) => cursor.close(),
            Self::Lsm(cursor) => cursor.close(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::Redb(cursor) => cursor.is_closed(),
            Self::Lsm(cursor) => cursor.is_closed(),
        }
    }
}
