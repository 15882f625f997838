//! Redb store implementation.
//!
//! This module provides the `RedbStore` type which implements the [`Db`]
//! trait using the Redb embedded B-tree database.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use redb::{Builder, Database};
use tracing::debug;

use super::snapshot::RedbSnapshot;
use super::tables::ensure_data_table;
use super::transaction::RedbTxn;
use crate::dump;
use crate::engine::{Db, StorageError, StorageResult};
use crate::lifecycle::{HandleGuard, StoreState};
use crate::snapshot::{SnapshotCursor, SnapshotSource, DEFAULT_BATCH_SIZE};
use crate::txn::{SnapshotTxn, WriterLock};

/// Configuration options for the Redb store.
#[derive(Debug, Clone, Copy)]
pub struct RedbConfig {
    /// Cache size in bytes.
    /// If not set, uses Redb's default.
    pub cache_size: Option<usize>,

    /// How long `txn()` waits for the writer lock.
    /// If not set, it waits indefinitely.
    pub lock_timeout: Option<Duration>,

    /// Entries fetched per cursor batch.
    pub cursor_batch_size: usize,
}

impl Default for RedbConfig {
    fn default() -> Self {
        Self { cache_size: None, lock_timeout: None, cursor_batch_size: DEFAULT_BATCH_SIZE }
    }
}

impl RedbConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
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

/// A store backed by Redb.
///
/// Redb is a pure-Rust copy-on-write B-tree with native ACID transactions.
/// All keys live in a single table created at open.
///
/// # Example
///
/// ```ignore
/// use kvbridge::backends::RedbStore;
/// use kvbridge::{Db, Txn};
///
/// let store = RedbStore::open("my_store.redb")?;
///
/// let mut txn = store.txn()?;
/// txn.put(b"user:1", b"Alice")?;
/// txn.commit()?;
/// ```
pub struct RedbStore {
    state: StoreState<Database>,
    writer: WriterLock,
    config: RedbConfig,
}

impl RedbStore {
    /// Open or create a store at the given path with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// Open or create a store at the given path with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or created.
    pub fn open_with_config(path: impl AsRef<Path>, config: RedbConfig) -> StorageResult<Self> {
        let db = Self::builder(&config)
            .create(path.as_ref())
            .map_err(|e| StorageError::Open(e.to_string()))?;
        debug!(engine = "redb", path = %path.as_ref().display(), "store opened");

        Self::from_database(db, config)
    }

    /// Create an in-memory store for testing.
    ///
    /// The data is lost when the store is closed or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory() -> StorageResult<Self> {
        Self::in_memory_with_config(RedbConfig::default())
    }

    /// Create an in-memory store with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory_with_config(config: RedbConfig) -> StorageResult<Self> {
        let db = Self::builder(&config)
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| StorageError::Open(e.to_string()))?;

        Self::from_database(db, config)
    }

    /// Database builder carrying the tuning options of `config`.
    fn builder(config: &RedbConfig) -> Builder {
        let mut builder = Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }
        builder
    }

    fn from_database(db: Database, config: RedbConfig) -> StorageResult<Self> {
        ensure_data_table(&db)?;
        Ok(Self { state: StoreState::new("redb", db), writer: WriterLock::new(), config })
    }

    /// The configuration this store was opened with.
    #[must_use]
    pub const fn config(&self) -> &RedbConfig {
        &self.config
    }

    /// Take a snapshot and register a handle for as long as the caller needs it.
    fn snapshot(&self) -> StorageResult<(RedbSnapshot, HandleGuard)> {
        let db = self.state.open()?;
        let handle = self.state.handles().register();
        let tx = db.begin_read().map_err(StorageError::storage)?;
        Ok((RedbSnapshot::new(tx), handle))
    }
}

impl Db for RedbStore {
    type Txn = RedbTxn;
    type ReadTxn = SnapshotTxn<RedbSnapshot>;
    type Cursor = SnapshotCursor<RedbSnapshot>;

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
        let db = self.state.open()?;
        let tx = db.begin_read().map_err(StorageError::storage)?;
        Ok(SnapshotTxn::new(
            Arc::new(RedbSnapshot::new(tx)),
            self.state.handles().clone(),
            self.config.cursor_batch_size,
        ))
    }

    fn txn(&self) -> StorageResult<Self::Txn> {
        let permit = self.writer.acquire(self.config.lock_timeout)?;
        let db = self.state.open()?;
        let handle = self.state.handles().register();
        let tx = db.begin_write().map_err(StorageError::storage)?;
        debug!(engine = "redb", "transaction started");
        Ok(RedbTxn::new(tx, permit, handle))
    }

    fn write_to(&self, sink: &mut dyn Write) -> StorageResult<u64> {
        let (snapshot, _handle) = self.snapshot()?;
        let bytes = dump::write_snapshot(&snapshot, sink, self.config.cursor_batch_size)?;
        debug!(engine = "redb", bytes, "store written to sink");
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "redb"
    }

    fn close(&self) -> StorageResult<()> {
        self.state.close(|db| {
            drop(db);
            Ok(())
        })
    }
}
