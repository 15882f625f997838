//! Write buffering for emulated transactions.
//!
//! A [`WriteBuffer`] records every put and delete in the order they were
//! made, plus an overlay index giving the net effect per key so that the
//! transaction can read its own writes before the snapshot.

use std::collections::BTreeMap;

/// A single buffered write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Put a key-value pair.
    Put {
        /// The key.
        key: Vec<u8>,
        /// The value.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// The key.
        key: Vec<u8>,
    },
}

impl WriteOp {
    /// The key this operation writes.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Reduce `ops` to the last operation per key, in ascending key order.
///
/// For engines whose batches do not define an order between writes to the
/// same key.
#[must_use]
pub fn coalesce(ops: Vec<WriteOp>) -> Vec<WriteOp> {
    let mut last: BTreeMap<Vec<u8>, WriteOp> = BTreeMap::new();
    for op in ops {
        last.insert(op.key().to_vec(), op);
    }
    last.into_values().collect()
}

/// The overlay's answer for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay<'a> {
    /// The transaction wrote this value.
    Value(&'a [u8]),
    /// The transaction deleted the key.
    Tombstone,
    /// The transaction did not touch the key.
    Untouched,
}

/// The writes of one transaction.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    /// Operations in the order they were applied.
    ops: Vec<WriteOp>,
    /// Net effect per key: index into `ops` of the last put, or `None` if the
    /// last write was a delete.
    index: BTreeMap<Vec<u8>, Option<usize>>,
}

impl WriteBuffer {
    /// Create a new empty write buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a put operation.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        let idx = self.ops.len();
        self.ops.push(WriteOp::Put { key: key.to_vec(), value: value.to_vec() });
        self.index.insert(key.to_vec(), Some(idx));
    }

    /// Record a delete operation, whether or not the key exists.
    pub fn delete(&mut self, key: &[u8]) {
        self.ops.push(WriteOp::Delete { key: key.to_vec() });
        self.index.insert(key.to_vec(), None);
    }

    /// Look a key up in the overlay.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Overlay<'_> {
        match self.index.get(key) {
            None => Overlay::Untouched,
            Some(None) => Overlay::Tombstone,
            Some(Some(idx)) => match self.ops.get(*idx) {
                Some(WriteOp::Put { value, .. }) => Overlay::Value(value),
                // The index only ever points at puts.
                _ => Overlay::Tombstone,
            },
        }
    }

    /// Get the number of operations in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Take ownership of all operations, in the order they were made.
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Drop every buffered operation.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.index.clear();
    }
}
