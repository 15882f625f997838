//! Transactions emulated over an engine that only offers snapshots and
//! atomic batches.
//!
//! An [`EmulatedTxn`] combines three resources:
//!
//! 1. A [`WriterPermit`] so that only one writable transaction is open per store
//! 2. A snapshot that answers every read the overlay cannot
//! 3. A [`WriteBuffer`] that is applied as one atomic batch on commit
//!
//! Commit and rollback release the snapshot and the permit on every path,
//! including a failed apply. Dropping an open transaction rolls it back.

use std::sync::Arc;

use tracing::{debug, warn};

use super::buffer::{Overlay, WriteBuffer, WriteOp};
use super::lock::WriterPermit;
use crate::engine::{validate_key, StorageError, StorageResult, Txn};
use crate::lifecycle::HandleGuard;
use crate::snapshot::SnapshotSource;

/// Applies a transaction's writes to the native engine as one atomic batch.
pub trait BatchApply {
    /// Engine name, for logging.
    fn engine(&self) -> &'static str;

    /// Apply `ops` in order, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine rejects the batch.
    fn apply(&self, ops: Vec<WriteOp>) -> StorageResult<()>;
}

/// Lifecycle of a writable transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Accepting reads and writes.
    Open,
    /// Writes were applied.
    Committed,
    /// Writes were discarded, explicitly or by a failed commit.
    RolledBack,
}

/// A writable transaction built from a snapshot, a write buffer and the
/// store's writer lock.
pub struct EmulatedTxn<S, A> {
    state: TxnState,
    snapshot: Option<Arc<S>>,
    buffer: WriteBuffer,
    applier: A,
    permit: Option<WriterPermit>,
    handle: Option<HandleGuard>,
}

impl<S, A> std::fmt::Debug for EmulatedTxn<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulatedTxn").finish_non_exhaustive()
    }
}

impl<S: SnapshotSource, A: BatchApply> EmulatedTxn<S, A> {
    /// Begin a transaction. The caller has already acquired `permit` and
    /// taken `snapshot` while holding it.
    pub fn begin(snapshot: Arc<S>, applier: A, permit: WriterPermit, handle: HandleGuard) -> Self {
        debug!(engine = applier.engine(), "transaction started");
        Self {
            state: TxnState::Open,
            snapshot: Some(snapshot),
            buffer: WriteBuffer::new(),
            applier,
            permit: Some(permit),
            handle: Some(handle),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TxnState {
        self.state
    }

    /// Number of buffered writes.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.buffer.len()
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.state == TxnState::Open {
            Ok(())
        } else {
            Err(StorageError::TransactionClosed)
        }
    }

    /// Release the snapshot, the writer permit and the store handle.
    fn finish(&mut self, state: TxnState) {
        self.state = state;
        self.buffer.clear();
        self.snapshot = None;
        self.permit = None;
        self.handle = None;
    }
}

impl<S: SnapshotSource, A: BatchApply> Txn for EmulatedTxn<S, A> {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.ensure_open()?;

        match self.buffer.get(key) {
            Overlay::Value(value) => Ok(Some(value.to_vec())),
            Overlay::Tombstone => Ok(None),
            Overlay::Untouched => match &self.snapshot {
                Some(snapshot) => snapshot.get(key),
                None => Err(StorageError::TransactionClosed),
            },
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.ensure_open()?;
        validate_key(key)?;
        self.buffer.put(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        self.ensure_open()?;
        validate_key(key)?;
        self.buffer.delete(key);
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.ensure_open()?;

        let ops = std::mem::take(&mut self.buffer).into_ops();
        let count = ops.len();
        let result = if ops.is_empty() { Ok(()) } else { self.applier.apply(ops) };

        match &result {
            Ok(()) => {
                self.finish(TxnState::Committed);
                debug!(engine = self.applier.engine(), ops = count, "transaction committed");
            }
            Err(e) => {
                self.finish(TxnState::RolledBack);
                warn!(engine = self.applier.engine(), ops = count, error = %e, "commit failed");
            }
        }
        result
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.ensure_open()?;
        let count = self.buffer.len();
        self.finish(TxnState::RolledBack);
        debug!(engine = self.applier.engine(), ops = count, "transaction rolled back");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state == TxnState::Open
    }
}

impl<S, A> Drop for EmulatedTxn<S, A> {
    fn drop(&mut self) {
        if self.state == TxnState::Open {
            // Implicit rollback: nothing was applied, so releasing the
            // resources is all that is left to do.
            self.state = TxnState::RolledBack;
            self.snapshot = None;
            self.permit = None;
            self.handle = None;
            debug!(pending = self.buffer.len(), "open transaction dropped, rolled back");
        }
    }
}
