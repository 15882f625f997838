//! Portable dumps of a store's committed contents.
//!
//! A dump is a 16-byte header followed by framed records:
//!
//! ```text
//! [magic: 8 bytes "KVBDUMP\0"][version: u32][reserved: u32]
//! [length: u32][bincode record][crc32: u32]   one per entry
//! [length: u32][bincode End { entries }][crc32: u32]
//! ```
//!
//! All integers are little-endian. Entries appear in ascending key order.
//! [`restore`] loads a dump into any store through one transaction, so a
//! dump taken from one engine can seed the other.

mod error;
mod reader;
mod writer;

use std::io::{Read, Write};
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use error::{DumpError, DumpResult};
pub use reader::DumpReader;
pub use writer::DumpWriter;

use crate::engine::{Db, StorageResult, Txn};
use crate::snapshot::SnapshotSource;

/// Magic number at the start of a dump: "KVBDUMP\0"
const DUMP_MAGIC: [u8; 8] = [0x4B, 0x56, 0x42, 0x44, 0x55, 0x4D, 0x50, 0x00];

/// Current dump format version
const DUMP_VERSION: u32 = 1;

/// Size of the dump header
const HEADER_SIZE: u64 = 16; // 8 bytes magic + 4 bytes version + 4 bytes reserved

/// Upper bound on a single framed record
const MAX_RECORD_SIZE: usize = 256 * 1024 * 1024;

/// One framed record of a dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DumpRecord {
    /// A key-value pair.
    Entry {
        /// The key.
        key: Vec<u8>,
        /// The value.
        value: Vec<u8>,
    },
    /// End marker carrying the number of entries written.
    End {
        /// Number of `Entry` records before this one.
        entries: u64,
    },
}

/// Write every entry of `snapshot` to `sink` as a dump.
///
/// Reads the snapshot in batches of `batch_size`, so memory use does not
/// grow with the store. Returns the number of bytes written.
///
/// # Errors
///
/// Returns a storage error if the snapshot cannot be read, or a dump error
/// if the sink fails.
pub fn write_snapshot<S: SnapshotSource>(
    snapshot: &S,
    sink: &mut dyn Write,
    batch_size: usize,
) -> StorageResult<u64> {
    let batch_size = batch_size.max(1);
    let mut writer = DumpWriter::new(sink)?;
    let mut last_key: Option<Vec<u8>> = None;

    loop {
        let from = match &last_key {
            Some(key) => Bound::Excluded(key.as_slice()),
            None => Bound::Unbounded,
        };
        let batch = snapshot.scan_forward(from, batch_size)?;

        for (key, value) in &batch {
            writer.write_entry(key, value)?;
        }

        if batch.len() < batch_size {
            break;
        }
        last_key = batch.into_iter().next_back().map(|(key, _)| key);
    }

    let entries = writer.entries();
    let bytes = writer.finish()?;
    debug!(entries, bytes, "dump written");
    Ok(bytes)
}

/// Load a dump into `db` through a single transaction.
///
/// Nothing is committed unless the whole stream verifies. Returns the
/// number of entries loaded.
///
/// # Errors
///
/// Returns a dump error if the stream is damaged, or any error of
/// [`Db::txn`], [`Txn::put`] or [`Txn::commit`].
pub fn restore<D: Db>(db: &D, source: impl Read) -> StorageResult<u64> {
    let mut reader = DumpReader::new(source)?;
    let mut txn = db.txn()?;
    let mut loaded = 0u64;

    while let Some(record) = reader.next_record()? {
        match record {
            DumpRecord::Entry { key, value } => {
                txn.put(&key, &value)?;
                loaded += 1;
            }
            DumpRecord::End { entries } => {
                if entries != loaded {
                    return Err(DumpError::CountMismatch { expected: entries, actual: loaded }.into());
                }
            }
        }
    }

    txn.commit()?;
    info!(engine = db.name(), entries = loaded, "dump restored");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::memory::MemorySnapshot;
    use crate::StorageError;

    fn sample(count: usize) -> MemorySnapshot {
        let pairs: Vec<(String, String)> =
            (0..count).map(|i| (format!("key{i:03}"), format!("val{i:03}"))).collect();
        MemorySnapshot::from_pairs(&pairs)
    }

    fn dump_of(snapshot: &MemorySnapshot, batch_size: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        let bytes = write_snapshot(snapshot, &mut buf, batch_size).expect("failed to write dump");
        assert_eq!(bytes, buf.len() as u64);
        buf
    }

    fn read_all(buf: &[u8]) -> DumpResult<Vec<DumpRecord>> {
        let mut reader = DumpReader::new(buf)?;
        let mut records = Vec::new();
        while let Some(record) = reader.next_record()? {
            records.push(record);
        }
        Ok(records)
    }

    #[test]
    fn test_header_layout() {
        let buf = dump_of(&MemorySnapshot::default(), 10);
        assert_eq!(&buf[..8], b"KVBDUMP\0");
        assert_eq!(u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]), DUMP_VERSION);

        let records = read_all(&buf).expect("failed to read dump");
        assert_eq!(records, vec![DumpRecord::End { entries: 0 }]);
    }

    #[test]
    fn test_entries_in_order_across_batches() {
        // A batch size that divides the entry count exercises the final empty scan.
        let buf = dump_of(&sample(12), 4);
        let records = read_all(&buf).expect("failed to read dump");

        assert_eq!(records.len(), 13);
        assert_eq!(
            records[0],
            DumpRecord::Entry { key: b"key000".to_vec(), value: b"val000".to_vec() }
        );
        assert_eq!(
            records[11],
            DumpRecord::Entry { key: b"key011".to_vec(), value: b"val011".to_vec() }
        );
        assert_eq!(records[12], DumpRecord::End { entries: 12 });
    }

    #[test]
    fn test_bad_magic() {
        let mut buf = dump_of(&sample(1), 10);
        buf[0] = b'X';
        let err = read_all(&buf).expect_err("should reject magic");
        assert!(matches!(err, DumpError::InvalidFormat(_)));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut buf = dump_of(&sample(1), 10);
        // Flip a byte inside the first record's payload.
        let idx = HEADER_SIZE as usize + 4 + 1;
        buf[idx] ^= 0xFF;

        let err = read_all(&buf).expect_err("should detect corruption");
        assert!(matches!(err, DumpError::ChecksumMismatch { offset: 16, .. }));
        assert!(err.is_corruption());
    }

    #[test]
    fn test_truncated_stream() {
        let buf = dump_of(&sample(3), 10);
        let err = read_all(&buf[..buf.len() - 2]).expect_err("should detect truncation");
        assert!(matches!(err, DumpError::Truncated { .. }));

        // Cutting the end marker entirely is also a truncation.
        let mut reader = DumpReader::new(&buf[..HEADER_SIZE as usize]).expect("valid header");
        assert!(matches!(reader.next_record(), Err(DumpError::Truncated { offset: 16 })));
    }

    #[test]
    fn test_oversized_record_is_rejected_when_written() {
        let mut buf = Vec::new();
        let mut writer =
            DumpWriter::new(&mut buf).expect("failed to start dump").with_max_record_size(64);
        writer.write_entry(b"small", b"value").expect("failed to write entry");

        let err = writer.write_entry(b"big", &[0u8; 100]).expect_err("oversized entry should fail");
        assert!(matches!(err, DumpError::RecordTooLarge { max: 64, .. }));
        assert!(!err.is_corruption());
        assert_eq!(writer.entries(), 1);
        writer.finish().expect("failed to finish dump");

        // The rejected entry left no partial frame behind.
        let records = read_all(&buf).expect("failed to read dump");
        assert_eq!(
            records,
            vec![
                DumpRecord::Entry { key: b"small".to_vec(), value: b"value".to_vec() },
                DumpRecord::End { entries: 1 },
            ]
        );
    }

    #[test]
    fn test_dump_error_converts_to_storage_error() {
        let err: StorageError = DumpError::CountMismatch { expected: 2, actual: 1 }.into();
        assert!(matches!(err, StorageError::Dump(DumpError::CountMismatch { .. })));
    }
}
