//! Redb read snapshots.
//!
//! A redb read transaction is already an immutable point-in-time view, so a
//! snapshot is just a read transaction that is never upgraded.

use std::ops::Bound;

use redb::{ReadOnlyTable, ReadTransaction, ReadableTable};

use super::tables::DATA_TABLE;
use crate::engine::{KeyValue, StorageError, StorageResult};
use crate::snapshot::SnapshotSource;

type DataTable = ReadOnlyTable<&'static [u8], &'static [u8]>;

/// A snapshot backed by a redb read transaction.
pub struct RedbSnapshot {
    tx: ReadTransaction,
}

impl RedbSnapshot {
    /// Wrap a read transaction.
    pub const fn new(tx: ReadTransaction) -> Self {
        Self { tx }
    }

    /// Open the data table, or `None` if the file has no data table.
    fn table(&self) -> StorageResult<Option<DataTable>> {
        match self.tx.open_table(DATA_TABLE) {
            Ok(t) => Ok(Some(t)),
            // No data table means no data, which is not an error
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(StorageError::storage(e)),
        }
    }
}

impl SnapshotSource for RedbSnapshot {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let Some(table) = self.table()? else {
            return Ok(None);
        };
        let value = table.get(key).map_err(StorageError::storage)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn scan_forward(&self, from: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>> {
        let Some(table) = self.table()? else {
            return Ok(Vec::new());
        };

        let range =
            table.range::<&[u8]>((from, Bound::Unbounded)).map_err(StorageError::storage)?;

        let mut entries = Vec::with_capacity(limit.min(1024));
        for result in range.take(limit) {
            let (k, v) = result.map_err(StorageError::storage)?;
            entries.push((k.value().to_vec(), v.value().to_vec()));
        }
        Ok(entries)
    }

    fn scan_backward(&self, until: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>> {
        let Some(table) = self.table()? else {
            return Ok(Vec::new());
        };

        let range =
            table.range::<&[u8]>((Bound::Unbounded, until)).map_err(StorageError::storage)?;

        let mut entries = Vec::with_capacity(limit.min(1024));
        for result in range.rev().take(limit) {
            let (k, v) = result.map_err(StorageError::storage)?;
            entries.push((k.value().to_vec(), v.value().to_vec()));
        }
        // Reverse to get ascending order within the batch
        entries.reverse();
        Ok(entries)
    }
}
