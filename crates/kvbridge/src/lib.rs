//! `kvbridge`
//!
//! One key/value interface over two embedded storage engines.
//!
//! # Overview
//!
//! Callers use a single facade whichever engine backs the store:
//!
//! - [`backends::RedbStore`] - a copy-on-write B-tree (redb) with native
//!   multi-operation transactions
//! - [`backends::LsmStore`] - a log-structured merge tree (fjall) that only
//!   offers snapshots and atomic batches; writable transactions are emulated
//!   with a write buffer, an overlay, a bound snapshot and a single-writer lock
//!
//! # Core Traits
//!
//! - [`Db`] - The store facade: `batch_get`, `get`, `iterator`, `read_txn`,
//!   `txn`, `write_to`, `name`, `close`
//! - [`Txn`] - Writable transaction: `get`, `put`, `delete`, `commit`, `rollback`
//! - [`ReadTxn`] - Read-only transaction over one snapshot
//! - [`Cursor`] - Ordered iteration: `seek`, `seek_first`, `seek_last`,
//!   `next`, `prev`, `close`
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`], which is an alias for
//! `Result<T, StorageError>`. An absent key is never an error on the read
//! paths: it is reported as `None`.
//!
//! # Example
//!
//! ```ignore
//! use kvbridge::{open, Db, EngineKind, StoreConfig, Txn};
//!
//! let store = open(&StoreConfig::new("data/store", EngineKind::Lsm))?;
//!
//! let mut txn = store.txn()?;
//! txn.put(b"key042", b"val042")?;
//! txn.commit()?;
//!
//! store.batch_get([b"key042".as_slice(), b"key079".as_slice()], |key, value| {
//!     println!("{key:?} => {value:?}");
//!     Ok::<_, kvbridge::StorageError>(())
//! })?;
//!
//! store.close()?;
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Storage traits and error types
//! - [`backends`] - The redb and fjall stores
//! - [`txn`] - Writer lock, write buffer and transaction implementations
//! - [`snapshot`] - Snapshot sources and the batched cursor
//! - [`dump`] - Portable dumps and restore
//! - [`config`] - Engine selection

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod any;
pub mod backends;
pub mod config;
pub mod dump;
pub mod engine;
pub mod lifecycle;
pub mod snapshot;
pub mod txn;

pub use any::{AnyCursor, AnyReadTxn, AnyStore, AnyTxn};
pub use config::{EngineKind, StoreConfig};
pub use engine::{
    validate_key, Cursor, CursorResult, Db, KeyValue, ReadTxn, StorageError, StorageResult, Txn,
    MAX_KEY_SIZE,
};

/// Open the store described by `config`.
///
/// # Errors
///
/// Returns [`StorageError::Open`] if the engine cannot open the path.
pub fn open(config: &StoreConfig) -> StorageResult<AnyStore> {
    config.open()
}
