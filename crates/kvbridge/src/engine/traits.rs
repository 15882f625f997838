//! Core storage traits.
//!
//! This module defines the surface every store exposes, whichever engine
//! backs it:
//!
//! - [`Db`] - The store facade: point and batch reads, cursors, transactions
//! - [`Txn`] - A single-writer, read-your-own-writes transaction
//! - [`ReadTxn`] - A read-only transaction bound to one snapshot
//! - [`Cursor`] - Ordered, bidirectional iteration over a snapshot
//!
//! Keys compare by unsigned lexicographic byte order on both engines.

use std::io::Write;
use std::sync::Arc;

use super::{StorageError, StorageResult};

/// A key-value pair returned by cursor operations.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Result type for cursor operations that return a key-value pair.
///
/// `Ok(None)` means the cursor is exhausted.
pub type CursorResult = Result<Option<KeyValue>, StorageError>;

/// A key-value store backed by one native engine.
///
/// A store owns the native engine state. It outlives every transaction and
/// cursor it hands out, and [`Db::close`] refuses to run while any of them
/// are still open.
///
/// # Example
///
/// ```ignore
/// use kvbridge::{Db, Txn};
/// use kvbridge::backends::RedbStore;
///
/// let store = RedbStore::in_memory()?;
///
/// let mut txn = store.txn()?;
/// txn.put(b"key042", b"val042")?;
/// txn.commit()?;
///
/// let found = store.get(b"key042", |value| {
///     assert_eq!(value, Some(&b"val042"[..]));
///     Ok::<_, kvbridge::StorageError>(())
/// })?;
/// assert!(found);
/// ```
pub trait Db: Send + Sync {
    /// The writable transaction type for this engine.
    type Txn: Txn;

    /// The read-only transaction type for this engine.
    type ReadTxn: ReadTxn<Cursor = Self::Cursor>;

    /// The cursor type for this engine.
    type Cursor: Cursor;

    /// Look up several keys against one snapshot.
    ///
    /// The callback runs once per key, in input order, with the value or
    /// `None` when the key is absent. The first callback error stops the
    /// batch and is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Storage`] if the engine cannot service a read,
    /// [`StorageError::StoreClosed`] after close, or the callback's error.
    fn batch_get<I, F, E>(&self, keys: I, f: F) -> Result<(), E>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
        F: FnMut(&[u8], Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>;

    /// Look up a single key.
    ///
    /// The callback runs exactly once, with `None` when the key is absent.
    /// Returns whether the key was found.
    ///
    /// # Errors
    ///
    /// Same as [`Db::batch_get`].
    fn get<F, E>(&self, key: &[u8], f: F) -> Result<bool, E>
    where
        F: FnOnce(Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>;

    /// Open a cursor over a fresh snapshot.
    ///
    /// Never waits on the writer lock, and never observes uncommitted writes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreClosed`] after close, or a storage error if
    /// the snapshot cannot be taken.
    fn iterator(&self) -> StorageResult<Self::Cursor>;

    /// Begin a read-only transaction over a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`Db::iterator`].
    fn read_txn(&self) -> StorageResult<Self::ReadTxn>;

    /// Begin a writable transaction.
    ///
    /// Blocks until the previous writable transaction on this store commits
    /// or rolls back, or until the configured lock timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LockTimeout`] if the writer lock could not be
    /// acquired in time, [`StorageError::StoreClosed`] after close, or a
    /// storage error if the native transaction cannot be started.
    fn txn(&self) -> StorageResult<Self::Txn>;

    /// Serialize the full committed contents of the store to `sink`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unsupported`] on engines that cannot stream a
    /// consistent copy, or an I/O error from the sink.
    fn write_to(&self, sink: &mut dyn Write) -> StorageResult<u64>;

    /// A constant identifying the engine.
    fn name(&self) -> &'static str;

    /// Release the native engine.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::OutstandingHandles`] while transactions or
    /// cursors are open, and [`StorageError::StoreClosed`] if already closed.
    fn close(&self) -> StorageResult<()>;
}

/// A writable transaction.
///
/// A transaction is open until exactly one of [`Txn::commit`] or
/// [`Txn::rollback`] succeeds; every later call returns
/// [`StorageError::TransactionClosed`]. Dropping an open transaction rolls
/// it back.
pub trait Txn {
    /// Read a key, observing this transaction's own writes first.
    ///
    /// Returns `Ok(None)` if the key is absent or was deleted in this
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] once terminated, or a
    /// storage error from the engine.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Read a key that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::KeyNotFound`] when the key is absent, plus the
    /// errors of [`Txn::get`].
    fn get_required(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.get(key)?.ok_or(StorageError::KeyNotFound)
    }

    /// Insert or replace a key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] once terminated, or
    /// [`StorageError::InvalidKey`] for an empty key or one longer than
    /// [`MAX_KEY_SIZE`](super::MAX_KEY_SIZE). The transaction stays open
    /// after an invalid key.
    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] once terminated, or
    /// [`StorageError::InvalidKey`] for an empty key or one longer than
    /// [`MAX_KEY_SIZE`](super::MAX_KEY_SIZE). The transaction stays open
    /// after an invalid key.
    fn delete(&mut self, key: &[u8]) -> StorageResult<()>;

    /// Apply every write atomically and end the transaction.
    ///
    /// The snapshot and writer lock are released whether or not the apply
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] if already terminated, or a
    /// storage error if the engine rejects the write.
    fn commit(&mut self) -> StorageResult<()>;

    /// Discard every write and end the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] if already terminated.
    fn rollback(&mut self) -> StorageResult<()>;

    /// Returns `true` until the transaction is committed or rolled back.
    fn is_open(&self) -> bool;
}

/// A read-only transaction bound to one snapshot.
pub trait ReadTxn {
    /// The cursor type opened from this transaction.
    type Cursor: Cursor;

    /// Read a key from the bound snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] once rolled back, or a
    /// storage error from the engine.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Read a key that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::KeyNotFound`] when the key is absent, plus the
    /// errors of [`ReadTxn::get`].
    fn get_required(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.get(key)?.ok_or(StorageError::KeyNotFound)
    }

    /// Open a cursor sharing this transaction's snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] once rolled back.
    fn iterator(&self) -> StorageResult<Self::Cursor>;

    /// End the transaction. Cursors already opened from it stay valid.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TransactionClosed`] if already ended.
    fn rollback(&mut self) -> StorageResult<()>;
}

/// A cursor for iterating over key-value pairs.
///
/// A cursor is unpositioned when created, positioned at an entry after a
/// successful move, and exhausted after a move finds nothing. Moving from
/// the exhausted state with [`Cursor::next`] or [`Cursor::prev`] stays
/// exhausted; [`Cursor::seek`], [`Cursor::seek_first`] and
/// [`Cursor::seek_last`] reposition from any state.
pub trait Cursor {
    /// Seek to the first key >= the given key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CursorClosed`] after close, or a storage error.
    fn seek(&mut self, key: &[u8]) -> CursorResult;

    /// Seek to the smallest key.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::seek`].
    fn seek_first(&mut self) -> CursorResult;

    /// Seek to the largest key.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::seek`].
    fn seek_last(&mut self) -> CursorResult;

    /// Move to the successor. An unpositioned cursor moves to the first key.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::seek`].
    fn next(&mut self) -> CursorResult;

    /// Move to the predecessor. An unpositioned cursor moves to the last key.
    ///
    /// # Errors
    ///
    /// Same as [`Cursor::seek`].
    fn prev(&mut self) -> CursorResult;

    /// Get the current key-value pair without moving.
    ///
    /// The borrow ends at the next positioning call.
    fn current(&self) -> Option<(&[u8], &[u8])>;

    /// Release the cursor and, if it was the last holder, its snapshot.
    ///
    /// Closing twice is a no-op.
    fn close(&mut self);

    /// Returns `true` once the cursor has been closed.
    fn is_closed(&self) -> bool;
}

/// Blanket implementation for `Arc<D>`, so a store can be shared across
/// threads and still be used through the trait.
impl<D: Db> Db for Arc<D> {
    type Txn = D::Txn;
    type ReadTxn = D::ReadTxn;
    type Cursor = D::Cursor;

    fn batch_get<I, F, E>(&self, keys: I, f: F) -> Result<(), E>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
        F: FnMut(&[u8], Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>,
    {
        (**self).batch_get(keys, f)
    }

    fn get<F, E>(&self, key: &[u8], f: F) -> Result<bool, E>
    where
        F: FnOnce(Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>,
    {
        (**self).get(key, f)
    }

    fn iterator(&self) -> StorageResult<Self::Cursor> {
        (**self).iterator()
    }

    fn read_txn(&self) -> StorageResult<Self::ReadTxn> {
        (**self).read_txn()
    }

    fn txn(&self) -> StorageResult<Self::Txn> {
        (**self).txn()
    }

    fn write_to(&self, sink: &mut dyn Write) -> StorageResult<u64> {
        (**self).write_to(sink)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn close(&self) -> StorageResult<()> {
        (**self).close()
    }
}
