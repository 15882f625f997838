//! Transaction machinery shared by the backends.
//!
//! - [`WriterLock`] - One writable transaction per store at a time
//! - [`WriteBuffer`] - Buffered writes with a read-your-own-writes overlay
//! - [`EmulatedTxn`] - A writable transaction for engines without native ones
//! - [`SnapshotTxn`] - A read-only transaction over one snapshot

mod buffer;
mod emulated;
mod lock;
mod read;

pub use buffer::{coalesce, Overlay, WriteBuffer, WriteOp};
pub use emulated::{BatchApply, EmulatedTxn, TxnState};
pub use lock::{WriterLock, WriterPermit};
pub use read::SnapshotTxn;
