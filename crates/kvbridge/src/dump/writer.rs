//! Dump writer implementation

use std::io::{BufWriter, Write};

use super::error::{DumpError, DumpResult};
use super::{DumpRecord, DUMP_MAGIC, DUMP_VERSION, HEADER_SIZE, MAX_RECORD_SIZE};

/// Streams a dump to a byte sink.
///
/// Writes the header on creation; [`DumpWriter::finish`] appends the end
/// marker and flushes.
pub struct DumpWriter<W: Write> {
    /// Buffered sink
    writer: BufWriter<W>,

    /// Bytes written so far, header included
    bytes: u64,

    /// Entries written so far
    entries: u64,

    /// Largest encoded record accepted, matching what readers accept
    max_record_size: usize,
}

impl<W: Write> DumpWriter<W> {
    /// Start a dump on `sink`, writing the header.
    pub fn new(sink: W) -> DumpResult<Self> {
        let mut writer = BufWriter::new(sink);
        writer.write_all(&DUMP_MAGIC)?;
        writer.write_all(&DUMP_VERSION.to_le_bytes())?;
        writer.write_all(&[0u8; 4])?; // Reserved
        Ok(Self { writer, bytes: HEADER_SIZE, entries: 0, max_record_size: MAX_RECORD_SIZE })
    }

    #[cfg(test)]
    pub(crate) const fn with_max_record_size(mut self, max_record_size: usize) -> Self {
        self.max_record_size = max_record_size;
        self
    }

    /// Append one key-value pair.
    pub fn write_entry(&mut self, key: &[u8], value: &[u8]) -> DumpResult<()> {
        self.write_record(&DumpRecord::Entry { key: key.to_vec(), value: value.to_vec() })?;
        self.entries += 1;
        Ok(())
    }

    /// Append the end marker, flush, and return the total bytes written.
    pub fn finish(mut self) -> DumpResult<u64> {
        self.write_record(&DumpRecord::End { entries: self.entries })?;
        self.writer.flush()?;
        Ok(self.bytes)
    }

    /// Number of entries written so far.
    pub const fn entries(&self) -> u64 {
        self.entries
    }

    fn write_record(&mut self, record: &DumpRecord) -> DumpResult<()> {
        let data = bincode::serde::encode_to_vec(record, bincode::config::standard())
            .map_err(|e| DumpError::Serialize(e.to_string()))?;

        // Nothing is written for a rejected record, so the stream stays valid.
        let too_large = || DumpError::RecordTooLarge { size: data.len(), max: self.max_record_size };
        if data.len() > self.max_record_size {
            return Err(too_large());
        }
        let len = u32::try_from(data.len()).map_err(|_| too_large())?;
        let crc = crc32fast::hash(&data);

        // Write: [length: u32][data: bytes][crc: u32]
        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&data)?;
        self.writer.write_all(&crc.to_le_bytes())?;

        self.bytes += 4 + u64::from(len) + 4;
        Ok(())
    }
}
