//! Redb write transactions.
//!
//! Redb has native write transactions with read-your-own-writes and atomic
//! commit, so [`RedbTxn`] delegates straight to one. It still holds the
//! store's writer permit, which gives both engines the same blocking and
//! timeout behaviour in `txn()`.

use redb::{ReadableTable, WriteTransaction};
use tracing::debug;

use super::tables::DATA_TABLE;
use crate::engine::{validate_key, StorageError, StorageResult, Txn};
use crate::lifecycle::HandleGuard;
use crate::txn::{TxnState, WriterPermit};

/// A writable transaction on a redb store.
pub struct RedbTxn {
    /// The native transaction, `None` once terminated.
    tx: Option<WriteTransaction>,
    state: TxnState,
    /// Number of puts and deletes made, for logging.
    ops: usize,
    permit: Option<WriterPermit>,
    handle: Option<HandleGuard>,
}

impl std::fmt::Debug for RedbTxn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbTxn").finish_non_exhaustive()
    }
}

impl RedbTxn {
    pub(crate) fn new(tx: WriteTransaction, permit: WriterPermit, handle: HandleGuard) -> Self {
        Self {
            tx: Some(tx),
            state: TxnState::Open,
            ops: 0,
            permit: Some(permit),
            handle: Some(handle),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TxnState {
        self.state
    }

    fn tx(&self) -> StorageResult<&WriteTransaction> {
        self.tx.as_ref().ok_or(StorageError::TransactionClosed)
    }

    /// Take the native transaction out, ending this handle's lifecycle.
    fn take(&mut self, state: TxnState) -> StorageResult<WriteTransaction> {
        let tx = self.tx.take().ok_or(StorageError::TransactionClosed)?;
        self.state = state;
        Ok(tx)
    }

    fn release(&mut self) {
        self.permit = None;
        self.handle = None;
    }
}

impl Txn for RedbTxn {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let tx = self.tx()?;
        match tx.open_table(DATA_TABLE) {
            Ok(t) => match t.get(key) {
                Ok(Some(value)) => Ok(Some(value.value().to_vec())),
                Ok(None) => Ok(None),
                Err(e) => Err(StorageError::storage(e)),
            },
            Err(e) => Err(StorageError::storage(e)),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        {
            let tx = self.tx()?;
            validate_key(key)?;
            let mut t = tx.open_table(DATA_TABLE).map_err(StorageError::storage)?;
            t.insert(key, value).map_err(StorageError::storage)?;
        }
        self.ops += 1;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        {
            let tx = self.tx()?;
            validate_key(key)?;
            let mut t = tx.open_table(DATA_TABLE).map_err(StorageError::storage)?;
            t.remove(key).map_err(StorageError::storage)?;
        }
        self.ops += 1;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        let tx = self.take(TxnState::Committed)?;
        let result = tx.commit().map_err(StorageError::storage);
        if result.is_err() {
            self.state = TxnState::RolledBack;
        }
        self.release();
        debug!(engine = "redb", ops = self.ops, ok = result.is_ok(), "transaction committed");
        result
    }

    fn rollback(&mut self) -> StorageResult<()> {
        let tx = self.take(TxnState::RolledBack)?;
        // Ignore abort result - we're rolling back anyway
        drop(tx.abort());
        self.release();
        debug!(engine = "redb", ops = self.ops, "transaction rolled back");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state == TxnState::Open
    }
}

impl Drop for RedbTxn {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            self.state = TxnState::RolledBack;
            drop(tx.abort());
            debug!(engine = "redb", ops = self.ops, "open transaction dropped, rolled back");
        }
    }
}
