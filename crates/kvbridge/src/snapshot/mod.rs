//! Point-in-time read views.
//!
//! Each engine exposes its native snapshot through [`SnapshotSource`]. A
//! snapshot is shared through an `Arc` by every cursor and transaction built
//! on it, and the native snapshot is released when the last holder drops.

mod cursor;

use std::ops::Bound;

pub use cursor::{SnapshotCursor, DEFAULT_BATCH_SIZE};

use crate::engine::{KeyValue, StorageResult};

/// Read access to one immutable point-in-time view of a store.
pub trait SnapshotSource {
    /// Point lookup.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine cannot service the read.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Up to `limit` entries with keys after `from`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine cannot service the read.
    fn scan_forward(&self, from: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>>;

    /// Up to `limit` entries with keys before `until`, closest to `until`
    /// first when fetched, returned in ascending order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine cannot service the read.
    fn scan_backward(&self, until: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>>;
}

#[cfg(test)]
pub(crate) mod memory {
    //! An in-memory snapshot for exercising cursor and transaction logic
    //! without a native engine.

    use std::collections::BTreeMap;
    use std::ops::Bound;

    use super::SnapshotSource;
    use crate::engine::{KeyValue, StorageResult};

    #[derive(Debug, Clone, Default)]
    pub(crate) struct MemorySnapshot {
        pub(crate) data: BTreeMap<Vec<u8>, Vec<u8>>,
    }

    impl MemorySnapshot {
        pub(crate) fn from_pairs<K: AsRef<[u8]>, V: AsRef<[u8]>>(pairs: &[(K, V)]) -> Self {
            let data = pairs
                .iter()
                .map(|(k, v)| (k.as_ref().to_vec(), v.as_ref().to_vec()))
                .collect();
            Self { data }
        }
    }

    impl SnapshotSource for MemorySnapshot {
        fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
            Ok(self.data.get(key).cloned())
        }

        fn scan_forward(&self, from: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>> {
            Ok(self
                .data
                .range::<[u8], _>((from, Bound::Unbounded))
                .take(limit)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }

        fn scan_backward(&self, until: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>> {
            let mut entries: Vec<KeyValue> = self
                .data
                .range::<[u8], _>((Bound::Unbounded, until))
                .rev()
                .take(limit)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            entries.reverse();
            Ok(entries)
        }
    }
}
