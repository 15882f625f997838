//! Batched bidirectional cursor over a snapshot.
//!
//! The cursor never materializes the whole snapshot. It holds at most one
//! batch of entries (default 1000) and fetches the neighbouring batch on
//! demand as it moves past either end of the current one.

use std::ops::Bound;
use std::sync::Arc;

use super::SnapshotSource;
use crate::engine::{Cursor, CursorResult, KeyValue, StorageError, StorageResult};
use crate::lifecycle::HandleGuard;

/// Default batch size for cursor operations.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Unpositioned,
    At(usize),
    Exhausted,
}

/// A cursor over an `Arc`-shared snapshot.
///
/// The cursor keeps its snapshot alive until it is closed or dropped, and
/// counts as a live handle of its store for the same span.
pub struct SnapshotCursor<S> {
    /// The snapshot, `None` once closed.
    snapshot: Option<Arc<S>>,
    /// Store handle registration, released on close.
    handle: Option<HandleGuard>,
    /// Current batch of entries, ascending.
    batch: Vec<KeyValue>,
    /// Position within the current batch.
    position: Position,
    /// Maximum entries per batch.
    batch_size: usize,
    /// Whether there may be entries after the current batch.
    has_more_forward: bool,
    /// Whether there may be entries before the current batch.
    has_more_backward: bool,
}

impl<S: SnapshotSource> SnapshotCursor<S> {
    /// Create an unpositioned cursor over `snapshot`.
    pub fn new(snapshot: Arc<S>, handle: HandleGuard, batch_size: usize) -> Self {
        Self {
            snapshot: Some(snapshot),
            handle: Some(handle),
            batch: Vec::new(),
            position: Position::Unpositioned,
            batch_size: batch_size.max(1),
            has_more_forward: false,
            has_more_backward: false,
        }
    }

    fn source(&self) -> StorageResult<&S> {
        self.snapshot.as_deref().ok_or(StorageError::CursorClosed)
    }

    /// Point at `pos` in the current batch, or become exhausted if the batch
    /// has no such entry.
    fn settle(&mut self, pos: usize) -> Option<KeyValue> {
        match self.batch.get(pos) {
            Some(entry) => {
                self.position = Position::At(pos);
                Some(entry.clone())
            }
            None => {
                self.position = Position::Exhausted;
                None
            }
        }
    }

    /// Load the batch following the current one.
    fn load_next_batch(&mut self) -> StorageResult<bool> {
        if !self.has_more_forward {
            return Ok(false);
        }

        let new_batch = match self.batch.last() {
            Some((after, _)) => {
                self.source()?.scan_forward(Bound::Excluded(after.as_slice()), self.batch_size)?
            }
            None => Vec::new(),
        };

        if new_batch.is_empty() {
            self.has_more_forward = false;
            return Ok(false);
        }

        self.has_more_forward = new_batch.len() >= self.batch_size;
        self.has_more_backward = true;
        self.batch = new_batch;
        Ok(true)
    }

    /// Load the batch preceding the current one.
    fn load_prev_batch(&mut self) -> StorageResult<bool> {
        if !self.has_more_backward {
            return Ok(false);
        }

        let new_batch = match self.batch.first() {
            Some((before, _)) => {
                self.source()?.scan_backward(Bound::Excluded(before.as_slice()), self.batch_size)?
            }
            None => Vec::new(),
        };

        if new_batch.is_empty() {
            self.has_more_backward = false;
            return Ok(false);
        }

        self.has_more_backward = new_batch.len() >= self.batch_size;
        self.has_more_forward = true;
        self.batch = new_batch;
        Ok(true)
    }
}

impl<S: SnapshotSource> Cursor for SnapshotCursor<S> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        let batch = self.source()?.scan_forward(Bound::Included(key), self.batch_size)?;
        self.has_more_forward = batch.len() >= self.batch_size;
        // Entries before the seek key are unknown until fetched.
        self.has_more_backward = true;
        self.batch = batch;
        Ok(self.settle(0))
    }

    fn seek_first(&mut self) -> CursorResult {
        let batch = self.source()?.scan_forward(Bound::Unbounded, self.batch_size)?;
        self.has_more_forward = batch.len() >= self.batch_size;
        self.has_more_backward = false;
        self.batch = batch;
        Ok(self.settle(0))
    }

    fn seek_last(&mut self) -> CursorResult {
        let batch = self.source()?.scan_backward(Bound::Unbounded, self.batch_size)?;
        self.has_more_backward = batch.len() >= self.batch_size;
        self.has_more_forward = false;
        self.batch = batch;

        match self.batch.len().checked_sub(1) {
            Some(last) => Ok(self.settle(last)),
            None => {
                self.position = Position::Exhausted;
                Ok(None)
            }
        }
    }

    fn next(&mut self) -> CursorResult {
        self.source()?;

        match self.position {
            Position::Unpositioned => self.seek_first(),
            Position::Exhausted => Ok(None),
            Position::At(pos) => {
                if pos + 1 < self.batch.len() {
                    Ok(self.settle(pos + 1))
                } else if self.load_next_batch()? {
                    Ok(self.settle(0))
                } else {
                    self.position = Position::Exhausted;
                    Ok(None)
                }
            }
        }
    }

    fn prev(&mut self) -> CursorResult {
        self.source()?;

        match self.position {
            Position::Unpositioned => self.seek_last(),
            Position::Exhausted => Ok(None),
            Position::At(0) => {
                if self.load_prev_batch()? {
                    let last = self.batch.len() - 1;
                    Ok(self.settle(last))
                } else {
                    self.position = Position::Exhausted;
                    Ok(None)
                }
            }
            Position::At(pos) => Ok(self.settle(pos - 1)),
        }
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        match self.position {
            Position::At(pos) if self.snapshot.is_some() => {
                self.batch.get(pos).map(|(k, v)| (k.as_slice(), v.as_slice()))
            }
            _ => None,
        }
    }

    fn close(&mut self) {
        self.snapshot = None;
        self.handle = None;
        self.batch = Vec::new();
        self.position = Position::Unpositioned;
    }

    fn is_closed(&self) -> bool {
        self.snapshot.is_none()
    }
}
