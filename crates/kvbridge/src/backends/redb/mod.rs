//! Redb storage backend.
//!
//! This module provides the B-tree engine: a store backed by Redb, a
//! pure-Rust embedded database with native transactions.

mod engine;
mod snapshot;
mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbStore};
pub use snapshot::RedbSnapshot;
pub use transaction::RedbTxn;

/// Cursor type of a [`RedbStore`].
pub type RedbCursor = crate::snapshot::SnapshotCursor<RedbSnapshot>;

/// Read-only transaction type of a [`RedbStore`].
pub type RedbReadTxn = crate::txn::SnapshotTxn<RedbSnapshot>;
