use std::io;

use thiserror::Error;

/// Errors that can occur during WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    /// An underlying I/O error, labeled with the operation that failed.
    #[error("wal {op} error: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// A record was too short or declared lengths that overflow its buffer.
    #[error("corrupted wal entry")]
    Corrupted,

    /// A record's stored CRC32 did not match a recomputation.
    #[error("checksum mismatch")]
    ChecksumMismatch,
}

impl WalError {
    pub(crate) fn io(op: &'static str, source: io::Error) -> Self {
        WalError::Io { op, source }
    }
}
