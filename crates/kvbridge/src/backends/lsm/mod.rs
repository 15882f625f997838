//! Fjall storage backend.
//!
//! This module provides the LSM engine: a store backed by fjall, with
//! writable transactions emulated over snapshots and atomic batches.

mod engine;
mod snapshot;

pub use engine::{LsmApplier, LsmConfig, LsmStore, LsmTxn};
pub use snapshot::LsmSnapshot;

/// Cursor type of an [`LsmStore`].
pub type LsmCursor = crate::snapshot::SnapshotCursor<LsmSnapshot>;

/// Read-only transaction type of an [`LsmStore`].
pub type LsmReadTxn = crate::txn::SnapshotTxn<LsmSnapshot>;
