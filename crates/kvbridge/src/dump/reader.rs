//! Dump reader implementation

use std::io::{self, Read};

use super::error::{DumpError, DumpResult};
use super::{DumpRecord, DUMP_MAGIC, DUMP_VERSION, HEADER_SIZE, MAX_RECORD_SIZE};

/// Reads a dump stream record by record, verifying every checksum.
pub struct DumpReader<R: Read> {
    /// Source stream
    reader: R,

    /// Offset of the next record
    position: u64,

    /// Set once the end marker has been read
    finished: bool,
}

impl<R: Read> DumpReader<R> {
    /// Open a dump stream, validating its header.
    pub fn new(mut reader: R) -> DumpResult<Self> {
        let mut magic = [0u8; 8];
        if reader.read_exact(&mut magic).is_err() {
            return Err(DumpError::InvalidFormat("stream too small for header".into()));
        }

        if magic != DUMP_MAGIC {
            return Err(DumpError::InvalidFormat(format!("invalid magic number: {magic:?}")));
        }

        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);

        if version != DUMP_VERSION {
            return Err(DumpError::InvalidFormat(format!(
                "unsupported dump version: {version}, expected {DUMP_VERSION}"
            )));
        }

        // Skip reserved bytes
        let mut reserved = [0u8; 4];
        reader.read_exact(&mut reserved)?;

        Ok(Self { reader, position: HEADER_SIZE, finished: false })
    }

    /// Read the next record. Returns `None` after the end marker.
    pub fn next_record(&mut self) -> DumpResult<Option<DumpRecord>> {
        if self.finished {
            return Ok(None);
        }

        let mut len_bytes = [0u8; 4];
        self.read_exact(&mut len_bytes)?;

        let len = u32::from_le_bytes(len_bytes) as usize;
        if len == 0 || len > MAX_RECORD_SIZE {
            return Err(DumpError::InvalidFormat(format!("invalid record length: {len}")));
        }

        let mut data = vec![0u8; len];
        self.read_exact(&mut data)?;

        let mut crc_bytes = [0u8; 4];
        self.read_exact(&mut crc_bytes)?;

        let stored_crc = u32::from_le_bytes(crc_bytes);
        let computed_crc = crc32fast::hash(&data);
        if stored_crc != computed_crc {
            return Err(DumpError::ChecksumMismatch {
                offset: self.position,
                expected: stored_crc,
                actual: computed_crc,
            });
        }

        let (record, _): (DumpRecord, _) =
            bincode::serde::decode_from_slice(&data, bincode::config::standard())
                .map_err(|e| DumpError::Deserialize(e.to_string()))?;

        self.position += 4 + len as u64 + 4;
        if matches!(record, DumpRecord::End { .. }) {
            self.finished = true;
        }

        Ok(Some(record))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> DumpResult<()> {
        match self.reader.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(DumpError::Truncated { offset: self.position })
            }
            Err(e) => Err(e.into()),
        }
    }
}
