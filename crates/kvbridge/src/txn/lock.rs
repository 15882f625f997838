//! Single-writer exclusion.
//!
//! Each store owns one [`WriterLock`]. Beginning a writable transaction
//! acquires a [`WriterPermit`]; the permit releases the lock when the
//! transaction ends, or when it is dropped on any other exit path.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

use crate::engine::{StorageError, StorageResult};

/// A blocking lock that admits one writer at a time.
///
/// Clones share the same lock.
#[derive(Debug, Clone, Default)]
pub struct WriterLock {
    inner: Arc<Mutex<()>>,
}

impl WriterLock {
    /// Create a new, unheld lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock is free, then take it.
    ///
    /// With `timeout` set, gives up once that much time has passed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LockTimeout`] if the wait timed out.
    pub fn acquire(&self, timeout: Option<Duration>) -> StorageResult<WriterPermit> {
        let guard = match timeout {
            Some(timeout) => {
                self.inner.try_lock_arc_for(timeout).ok_or(StorageError::LockTimeout(timeout))?
            }
            None => self.inner.lock_arc(),
        };
        Ok(WriterPermit { _guard: guard })
    }

    /// Take the lock only if it is free right now.
    #[must_use]
    pub fn try_acquire(&self) -> Option<WriterPermit> {
        self.inner.try_lock_arc().map(|guard| WriterPermit { _guard: guard })
    }

    /// Returns `true` while a permit is outstanding.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.inner.is_locked()
    }
}

/// Proof of exclusive write access. Releases the lock on drop.
pub struct WriterPermit {
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl fmt::Debug for WriterPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterPermit").finish_non_exhaustive()
    }
}
