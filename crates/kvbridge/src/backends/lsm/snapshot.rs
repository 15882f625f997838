//! Fjall read snapshots.

use std::ops::Bound;

use fjall::Snapshot;

use crate::engine::{KeyValue, StorageError, StorageResult, MAX_KEY_SIZE};
use crate::snapshot::SnapshotSource;

/// A snapshot of one fjall partition.
///
/// The native snapshot pins a sequence number; it is released when this
/// value drops.
pub struct LsmSnapshot {
    snapshot: Snapshot,
}

impl LsmSnapshot {
    /// Wrap a native snapshot.
    pub const fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

// fjall panics on empty bounds and on bounds longer than MAX_KEY_SIZE. No
// stored key is either, so both map onto an equivalent storable bound.

/// Lower bound over stored keys equivalent to `bound`.
fn lower_bound(bound: Bound<&[u8]>) -> Bound<Vec<u8>> {
    match bound {
        Bound::Included([]) | Bound::Excluded([]) | Bound::Unbounded => Bound::Unbounded,
        Bound::Included(b) | Bound::Excluded(b) if b.len() > MAX_KEY_SIZE => {
            Bound::Excluded(b[..MAX_KEY_SIZE].to_vec())
        }
        Bound::Included(b) => Bound::Included(b.to_vec()),
        Bound::Excluded(b) => Bound::Excluded(b.to_vec()),
    }
}

/// Upper bound over stored keys equivalent to `bound`, or `None` when no
/// stored key can satisfy it.
fn upper_bound(bound: Bound<&[u8]>) -> Option<Bound<Vec<u8>>> {
    match bound {
        Bound::Unbounded => Some(Bound::Unbounded),
        Bound::Included([]) | Bound::Excluded([]) => None,
        Bound::Included(b) | Bound::Excluded(b) if b.len() > MAX_KEY_SIZE => {
            Some(Bound::Included(b[..MAX_KEY_SIZE].to_vec()))
        }
        Bound::Included(b) => Some(Bound::Included(b.to_vec())),
        Bound::Excluded(b) => Some(Bound::Excluded(b.to_vec())),
    }
}

impl SnapshotSource for LsmSnapshot {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        if key.is_empty() || key.len() > MAX_KEY_SIZE {
            return Ok(None);
        }
        let value = self.snapshot.get(key).map_err(StorageError::storage)?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn scan_forward(&self, from: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>> {
        let range: (Bound<Vec<u8>>, Bound<Vec<u8>>) = (lower_bound(from), Bound::Unbounded);

        let mut entries = Vec::with_capacity(limit.min(1024));
        for result in self.snapshot.range(range).take(limit) {
            let (k, v) = result.map_err(StorageError::storage)?;
            entries.push((k.to_vec(), v.to_vec()));
        }
        Ok(entries)
    }

    fn scan_backward(&self, until: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>> {
        let Some(until) = upper_bound(until) else {
            return Ok(Vec::new());
        };
        let range: (Bound<Vec<u8>>, Bound<Vec<u8>>) = (Bound::Unbounded, until);

        let mut entries = Vec::with_capacity(limit.min(1024));
        for result in self.snapshot.range(range).rev().take(limit) {
            let (k, v) = result.map_err(StorageError::storage)?;
            entries.push((k.to_vec(), v.to_vec()));
        }
        entries.reverse();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_outside_key_limits() {
        let long = vec![b'k'; MAX_KEY_SIZE + 3];
        let prefix = long[..MAX_KEY_SIZE].to_vec();

        assert_eq!(lower_bound(Bound::Included(b"")), Bound::Unbounded);
        assert_eq!(lower_bound(Bound::Excluded(b"")), Bound::Unbounded);
        assert_eq!(lower_bound(Bound::Included(&long)), Bound::Excluded(prefix.clone()));
        assert_eq!(lower_bound(Bound::Included(b"a")), Bound::Included(b"a".to_vec()));

        assert_eq!(upper_bound(Bound::Excluded(b"")), None);
        assert_eq!(upper_bound(Bound::Excluded(&long)), Some(Bound::Included(prefix)));
        assert_eq!(upper_bound(Bound::Excluded(b"a")), Some(Bound::Excluded(b"a".to_vec())));
    }
}
