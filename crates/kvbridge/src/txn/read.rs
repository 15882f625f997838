//! Read-only transactions.

use std::sync::Arc;

use crate::engine::{ReadTxn, StorageError, StorageResult};
use crate::lifecycle::{HandleGuard, HandleTracker};
use crate::snapshot::{SnapshotCursor, SnapshotSource};

/// A read-only transaction over one snapshot.
///
/// Cursors opened from it share the snapshot, which stays alive until the
/// transaction and every such cursor are gone. Never takes the writer lock.
pub struct SnapshotTxn<S> {
    snapshot: Option<Arc<S>>,
    tracker: HandleTracker,
    handle: Option<HandleGuard>,
    batch_size: usize,
}

impl<S: SnapshotSource> SnapshotTxn<S> {
    /// Wrap `snapshot`, registering cursors with `tracker`.
    pub fn new(snapshot: Arc<S>, tracker: HandleTracker, batch_size: usize) -> Self {
        let handle = tracker.register();
        Self { snapshot: Some(snapshot), tracker, handle: Some(handle), batch_size }
    }

    fn snapshot(&self) -> StorageResult<&Arc<S>> {
        self.snapshot.as_ref().ok_or(StorageError::TransactionClosed)
    }
}

impl<S: SnapshotSource> ReadTxn for SnapshotTxn<S> {
    type Cursor = SnapshotCursor<S>;

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.snapshot()?.get(key)
    }

    fn iterator(&self) -> StorageResult<Self::Cursor> {
        let snapshot = Arc::clone(self.snapshot()?);
        Ok(SnapshotCursor::new(snapshot, self.tracker.register(), self.batch_size))
    }

    fn rollback(&mut self) -> StorageResult<()> {
        if self.snapshot.take().is_none() {
            return Err(StorageError::TransactionClosed);
        }
        self.handle = None;
        Ok(())
    }
}
