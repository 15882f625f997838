//! Fjall store implementation.
//!
//! Fjall is a log-structured merge tree. This backend uses only its
//! snapshots and atomic write batches; writable transactions are emulated
//! with [`EmulatedTxn`] on top of them.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use tracing::debug;

use super::snapshot::LsmSnapshot;
use crate::engine::{Db, StorageError, StorageResult};
use crate::lifecycle::{HandleGuard, StoreState};
use crate::snapshot::{SnapshotCursor, SnapshotSource, DEFAULT_BATCH_SIZE};
use crate::txn::{coalesce, BatchApply, EmulatedTxn, SnapshotTxn, WriteOp, WriterLock};

/// Name of the partition holding every key-value pair of a store.
const PARTITION: &str = "kv_root";

/// Configuration options for the fjall store.
#[derive(Debug, Clone, Copy)]
pub struct LsmConfig {
    /// Block cache size in bytes.
    /// If not set, uses fjall's default.
    pub cache_size: Option<u64>,

    /// Maximum total size of in-memory write buffers before they are flushed.
    /// If not set, uses fjall's default.
    pub max_write_buffer_size: Option<u64>,

    /// Whether each commit is fsynced before it returns.
    pub sync_on_commit: bool,

    /// How long `txn()` waits for the writer lock.
    /// If not set, it waits indefinitely.
    pub lock_timeout: Option<Duration>,

    /// Entries fetched per cursor batch.
    pub cursor_batch_size: usize,
}

impl Default for LsmConfig {
    fn default() -> Self {
        Self {
            cache_size: None,
            max_write_buffer_size: None,
            sync_on_commit: false,
            lock_timeout: None,
            cursor_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LsmConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: u64) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Set the write buffer budget.
    #[must_use]
    pub const fn max_write_buffer_size(mut self, size: u64) -> Self {
        self.max_write_buffer_size = Some(size);
        self
    }

    /// Fsync on every commit.
    #[must_use]
    pub const fn sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    /// Bound the wait for the writer lock.
    #[must_use]
    pub const fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Set the number of entries fetched per cursor batch.
    #[must_use]
    pub const fn cursor_batch_size(mut self, size: usize) -> Self {
        self.cursor_batch_size = size;
        self
    }
}

struct LsmInner {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

/// Applies a transaction's writes as one fjall batch.
pub struct LsmApplier {
    keyspace: Keyspace,
    partition: PartitionHandle,
    sync: bool,
}

impl BatchApply for LsmApplier {
    fn engine(&self) -> &'static str {
        "lsm"
    }

    fn apply(&self, ops: Vec<WriteOp>) -> StorageResult<()> {
        let mut batch = self.keyspace.batch();
        for op in coalesce(ops) {
            match op {
                WriteOp::Put { key, value } => batch.insert(&self.partition, key, value),
                WriteOp::Delete { key } => batch.remove(&self.partition, key),
            }
        }
        batch.commit().map_err(StorageError::storage)?;

        if self.sync {
            self.keyspace.persist(PersistMode::SyncAll).map_err(StorageError::storage)?;
        }
        Ok(())
    }
}

/// Writable transaction type of an [`LsmStore`].
pub type LsmTxn = EmulatedTxn<LsmSnapshot, LsmApplier>;

/// A store backed by fjall.
///
/// # Example
///
/// ```ignore
/// use kvbridge::backends::LsmStore;
/// use kvbridge::{Db, Txn};
///
/// let store = LsmStore::open("my_store")?;
///
/// let mut txn = store.txn()?;
/// txn.put(b"user:1", b"Alice")?;
/// assert_eq!(txn.get(b"user:1")?, Some(b"Alice".to_vec()));
/// txn.commit()?;
/// ```
pub struct LsmStore {
    state: StoreState<LsmInner>,
    writer: WriterLock,
    config: LsmConfig,
}

impl LsmStore {
    /// Open or create a store in the given directory with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the keyspace cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_config(path, LsmConfig::default())
    }

    /// Open or create a store in the given directory with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the keyspace cannot be opened or created.
    pub fn open_with_config(path: impl AsRef<Path>, config: LsmConfig) -> StorageResult<Self> {
        let mut fjall_config = Config::new(path.as_ref());
        if let Some(size) = config.cache_size {
            fjall_config = fjall_config.cache_size(size);
        }
        if let Some(size) = config.max_write_buffer_size {
            fjall_config = fjall_config.max_write_buffer_size(size);
        }

        let keyspace = fjall_config.open().map_err(|e| StorageError::Open(e.to_string()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(|e| StorageError::Open(e.to_string()))?;
        debug!(engine = "lsm", path = %path.as_ref().display(), "store opened");

        Ok(Self {
            state: StoreState::new("lsm", LsmInner { keyspace, partition }),
            writer: WriterLock::new(),
            config,
        })
    }

    /// The configuration this store was opened with.
    #[must_use]
    pub const fn config(&self) -> &LsmConfig {
        &self.config
    }

    /// Take a snapshot and register a handle for as long as the caller needs it.
    fn snapshot(&self) -> StorageResult<(LsmSnapshot, HandleGuard)> {
        let inner = self.state.open()?;
        let handle = self.state.handles().register();
        Ok((LsmSnapshot::new(inner.partition.snapshot()), handle))
    }
}

impl Db for LsmStore {
    type Txn = LsmTxn;
    type ReadTxn = SnapshotTxn<LsmSnapshot>;
    type Cursor = SnapshotCursor<LsmSnapshot>;

    fn batch_get<I, F, E>(&self, keys: I, mut f: F) -> Result<(), E>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
        F: FnMut(&[u8], Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>,
    {
        let (snapshot, _handle) = self.snapshot()?;
        for key in keys {
            let key = key.as_ref();
            let value = snapshot.get(key)?;
            f(key, value.as_deref())?;
        }
        Ok(())
    }

    fn get<F, E>(&self, key: &[u8], f: F) -> Result<bool, E>
    where
        F: FnOnce(Option<&[u8]>) -> Result<(), E>,
        E: From<StorageError>,
    {
        let (snapshot, _handle) = self.snapshot()?;
        let value = snapshot.get(key)?;
        let found = value.is_some();
        f(value.as_deref())?;
        Ok(found)
    }

    fn iterator(&self) -> StorageResult<Self::Cursor> {
        let (snapshot, handle) = self.snapshot()?;
        Ok(SnapshotCursor::new(Arc::new(snapshot), handle, self.config.cursor_batch_size))
    }

    fn read_txn(&self) -> StorageResult<Self::ReadTxn> {
        let inner = self.state.open()?;
        Ok(SnapshotTxn::new(
            Arc::new(LsmSnapshot::new(inner.partition.snapshot())),
            self.state.handles().clone(),
            self.config.cursor_batch_size,
        ))
    }

    fn txn(&self) -> StorageResult<Self::Txn> {
        let permit = self.writer.acquire(self.config.lock_timeout)?;
        let inner = self.state.open()?;
        let handle = self.state.handles().register();
        // Taken after the permit, so the snapshot includes every earlier commit.
        let snapshot = Arc::new(LsmSnapshot::new(inner.partition.snapshot()));
        let applier = LsmApplier {
            keyspace: inner.keyspace.clone(),
            partition: inner.partition.clone(),
            sync: self.config.sync_on_commit,
        };
        Ok(EmulatedTxn::begin(snapshot, applier, permit, handle))
    }

    fn write_to(&self, _sink: &mut dyn Write) -> StorageResult<u64> {
        self.state.open()?;
        Err(StorageError::Unsupported("write_to is not implemented for the lsm engine".into()))
    }

    fn name(&self) -> &'static str {
        "lsm"
    }

    fn close(&self) -> StorageResult<()> {
        self.state.close(|inner| {
            inner.keyspace.persist(PersistMode::SyncAll).map_err(StorageError::storage)
        })
    }
}
