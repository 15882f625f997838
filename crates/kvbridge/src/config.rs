//! Store configuration and engine selection.
//!
//! [`StoreConfig`] names a path and an engine; [`open`](crate::open) turns it
//! into an [`AnyStore`](crate::AnyStore).
//!
//! # Example
//!
//! ```ignore
//! use kvbridge::{EngineKind, StoreConfig};
//!
//! let store = StoreConfig::new("data/store", EngineKind::Lsm)
//!     .lock_timeout(Duration::from_secs(5))
//!     .open()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::any::AnyStore;
use crate::backends::{LsmConfig, LsmStore, RedbConfig, RedbStore};
use crate::engine::{StorageError, StorageResult};

/// Which native engine backs a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Copy-on-write B-tree with native transactions.
    Redb,
    /// Log-structured merge tree with emulated transactions.
    Lsm,
}

impl EngineKind {
    /// The name reported by stores of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::Lsm => "lsm",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redb" | "btree" => Ok(Self::Redb),
            "lsm" | "fjall" => Ok(Self::Lsm),
            other => Err(StorageError::Unsupported(format!("unknown engine: {other}"))),
        }
    }
}

/// Where and how to open a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// File (redb) or directory (lsm) holding the store.
    pub path: PathBuf,
    /// The engine to open.
    pub engine: EngineKind,
    /// Cache size in bytes, passed to either engine.
    pub cache_size: Option<usize>,
    /// How long `txn()` waits for the writer lock.
    pub lock_timeout: Option<Duration>,
    /// Whether LSM commits are fsynced before returning.
    pub sync_on_commit: bool,
}

impl StoreConfig {
    /// Configure a store at `path` on `engine` with default settings.
    pub fn new(path: impl AsRef<Path>, engine: EngineKind) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            engine,
            cache_size: None,
            lock_timeout: None,
            sync_on_commit: false,
        }
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

    /// Fsync LSM commits before they return.
    #[must_use]
    pub const fn sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    /// Open the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the engine cannot open the path.
    pub fn open(&self) -> StorageResult<AnyStore> {
        match self.engine {
            EngineKind::Redb => {
                let mut config = RedbConfig::new();
                if let Some(size) = self.cache_size {
                    config = config.cache_size(size);
                }
                if let Some(timeout) = self.lock_timeout {
                    config = config.lock_timeout(timeout);
                }
                RedbStore::open_with_config(&self.path, config).map(AnyStore::Redb)
            }
            EngineKind::Lsm => {
                let mut config = LsmConfig::new().sync_on_commit(self.sync_on_commit);
                if let Some(size) = self.cache_size {
                    config = config.cache_size(size as u64);
                }
                if let Some(timeout) = self.lock_timeout {
                    config = config.lock_timeout(timeout);
                }
                LsmStore::open_with_config(&self.path, config).map(AnyStore::Lsm)
            }
        }
    }
}
