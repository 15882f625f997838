//! Storage backend implementations.
//!
//! # Available Backends
//!
//! - [`redb`] - Copy-on-write B-tree with native transactions
//! - [`lsm`] - Log-structured merge tree (fjall) with emulated transactions

pub mod lsm;
pub mod redb;

pub use self::lsm::{LsmConfig, LsmCursor, LsmReadTxn, LsmStore, LsmTxn};
pub use self::redb::{RedbConfig, RedbCursor, RedbReadTxn, RedbStore, RedbTxn};
