//! Storage traits and abstractions.
//!
//! This module defines the traits both engines implement:
//!
//! - [`Db`] - The store facade
//! - [`Txn`] / [`ReadTxn`] - Writable and read-only transactions
//! - [`Cursor`] - Ordered iteration over key-value pairs
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`] which is an alias for
//! `Result<T, StorageError>`. See [`StorageError`] for the possible error variants.

mod error;
mod key;
mod traits;

pub use error::{StorageError, StorageResult};
pub use key::{validate_key, MAX_KEY_SIZE};
pub use traits::{Cursor, CursorResult, Db, KeyValue, ReadTxn, Txn};
