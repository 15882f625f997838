//! Dump error types and result aliases

use std::io;

/// Result type alias for dump operations
pub type DumpResult<T> = Result<T, DumpError>;

/// Errors that can occur while writing or reading a dump stream
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// I/O error on the sink or source
    #[error("dump I/O error: {0}")]
    Io(#[from] io::Error),

    /// Checksum mismatch - data corruption detected
    #[error("dump checksum mismatch at offset {offset}: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        /// Byte offset of the corrupted record
        offset: u64,
        /// Stored checksum value
        expected: u32,
        /// Actual computed checksum
        actual: u32,
    },

    /// Record serialization failed
    #[error("dump record serialization failed: {0}")]
    Serialize(String),

    /// An entry encodes to more than a reader would accept
    #[error("dump record of {size} bytes exceeds the {max} byte limit")]
    RecordTooLarge {
        /// Encoded record size
        size: usize,
        /// Largest accepted record size
        max: usize,
    },

    /// Record deserialization failed
    #[error("dump record deserialization failed: {0}")]
    Deserialize(String),

    /// Invalid dump format or magic number
    #[error("invalid dump format: {0}")]
    InvalidFormat(String),

    /// The stream ended before the end marker
    #[error("dump truncated at offset {offset}")]
    Truncated {
        /// Byte offset where truncation was detected
        offset: u64,
    },

    /// The end marker disagrees with the number of entries read
    #[error("dump declares {expected} entries but contains {actual}")]
    CountMismatch {
        /// Count stored in the end marker
        expected: u64,
        /// Entries actually read
        actual: u64,
    },
}

impl DumpError {
    /// Returns true if this error indicates a damaged stream
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::ChecksumMismatch { .. }
                | Self::Truncated { .. }
                | Self::InvalidFormat(_)
                | Self::CountMismatch { .. }
        )
    }
}
