//! Store lifetime and handle accounting.
//!
//! A store hands out transactions and cursors that keep native engine
//! resources alive. [`StoreState`] owns the native engine behind a lock so
//! that close cannot race with handle creation, and a [`HandleTracker`]
//! counts the handles still alive so that close can refuse to run early.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use tracing::debug;

use crate::engine::{StorageError, StorageResult};

/// Counts live transactions and cursors for one store.
#[derive(Debug, Clone, Default)]
pub struct HandleTracker {
    live: Arc<AtomicUsize>,
}

impl HandleTracker {
    /// Create a tracker with no live handles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new handle. The count drops again when the guard drops.
    #[must_use]
    pub fn register(&self) -> HandleGuard {
        self.live.fetch_add(1, Ordering::AcqRel);
        HandleGuard { live: Arc::clone(&self.live) }
    }

    /// Number of handles currently alive.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// Keeps one handle counted as live while it exists.
#[derive(Debug)]
pub struct HandleGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// The native engine of a store, present until the store is closed.
pub(crate) struct StoreState<T> {
    engine: &'static str,
    inner: RwLock<Option<T>>,
    handles: HandleTracker,
}

impl<T> StoreState<T> {
    pub(crate) fn new(engine: &'static str, inner: T) -> Self {
        Self { engine, inner: RwLock::new(Some(inner)), handles: HandleTracker::new() }
    }

    /// Borrow the open engine.
    ///
    /// Close waits for this guard to drop, so a handle registered while it
    /// is held is always seen by close.
    pub(crate) fn open(&self) -> StorageResult<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.inner.read(), Option::as_ref)
            .map_err(|_| StorageError::StoreClosed)
    }

    pub(crate) fn handles(&self) -> &HandleTracker {
        &self.handles
    }

    /// Take the engine out of the store, handing it to `release`.
    ///
    /// Fails without releasing anything while handles are alive.
    pub(crate) fn close(&self, release: impl FnOnce(T) -> StorageResult<()>) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner.is_none() {
            return Err(StorageError::StoreClosed);
        }

        let count = self.handles.live();
        if count > 0 {
            debug!(engine = self.engine, count, "close refused, handles outstanding");
            return Err(StorageError::OutstandingHandles { count });
        }

        match inner.take() {
            Some(engine) => {
                release(engine)?;
                debug!(engine = self.engine, "store closed");
                Ok(())
            }
            None => Err(StorageError::StoreClosed),
        }
    }
}
