//! Storage error types.

use std::time::Duration;

use thiserror::Error;

use super::key::MAX_KEY_SIZE;
use crate::dump::DumpError;

/// Errors that can occur in storage operations.
///
/// Both engines report failures through this one taxonomy, so callers never
/// need to know which engine backs a store to interpret an error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be opened.
    #[error("failed to open store: {0}")]
    Open(String),

    /// The native engine reported a failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// The requested key is absent.
    #[error("key not found")]
    KeyNotFound,

    /// A write used a key that is empty or longer than [`MAX_KEY_SIZE`].
    #[error("invalid key of {len} bytes: keys must be 1 to {max} bytes long", max = MAX_KEY_SIZE)]
    InvalidKey {
        /// Length of the rejected key.
        len: usize,
    },

    /// The transaction was already committed or rolled back.
    #[error("transaction closed")]
    TransactionClosed,

    /// The cursor was already closed.
    #[error("cursor closed")]
    CursorClosed,

    /// The store was already closed.
    #[error("store closed")]
    StoreClosed,

    /// The store cannot close while transactions or cursors are still open.
    #[error("store has {count} outstanding transaction(s) or cursor(s)")]
    OutstandingHandles {
        /// Number of live handles at the time of the close attempt.
        count: usize,
    },

    /// The writer lock could not be acquired within the configured wait.
    #[error("timed out after {0:?} waiting for the writer lock")]
    LockTimeout(Duration),

    /// The operation is not supported by this engine.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A dump stream could not be read back.
    #[error("dump error: {0}")]
    Dump(#[from] DumpError),
}

impl StorageError {
    /// Returns `true` if this error reports an absent key.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound)
    }

    /// Returns `true` if this error reports misuse of a handle's lifecycle
    /// (using something after it was closed, or closing too early).
    #[must_use]
    pub const fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::TransactionClosed
                | Self::CursorClosed
                | Self::StoreClosed
                | Self::OutstandingHandles { .. }
        )
    }

    /// Returns `true` if retrying the operation may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::LockTimeout(_) | Self::OutstandingHandles { .. })
    }

    /// Wrap a native engine error.
    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
