use std::io;

use thiserror::Error;

/// Errors that can occur while writing or reading SSTable files.
#[derive(Debug, Error)]
pub enum TableError {
    /// An underlying I/O error, labeled with the operation that failed.
    #[error("sstable {op} error: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// A block's stored CRC32 did not match its compressed payload.
    #[error("block checksum mismatch at offset {offset}")]
    ChecksumMismatch { offset: u64 },

    /// A block line's JSON payload failed to (de)serialize.
    #[error("entry encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A block line's payload was not valid base64.
    #[error("entry encoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A decompressed block line had no `,` separator.
    #[error("malformed block line: missing separator")]
    MalformedLine,

    /// The key is not present in this table. The display form is part of
    /// the lookup contract.
    #[error("key not found: {0}")]
    KeyNotFound(String),
}

impl TableError {
    pub(crate) fn io(op: &'static str, source: io::Error) -> Self {
        TableError::Io { op, source }
    }
}
