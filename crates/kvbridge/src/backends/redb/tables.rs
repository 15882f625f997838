//! Redb table definitions.

use redb::{Database, TableDefinition};

use crate::engine::{StorageError, StorageResult};

/// The physical table holding every key-value pair of a store.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> = TableDefinition::new("kv_root");

/// Create the data table if it does not exist yet.
///
/// Running this once at open means readers never see a missing table on a
/// store this crate created.
pub fn ensure_data_table(db: &Database) -> StorageResult<()> {
    let tx = db.begin_write().map_err(|e| StorageError::Open(e.to_string()))?;
    {
        tx.open_table(DATA_TABLE).map_err(|e| StorageError::Open(e.to_string()))?;
    }
    tx.commit().map_err(|e| StorageError::Open(e.to_string()))
}
