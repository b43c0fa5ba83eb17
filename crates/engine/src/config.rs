use std::path::PathBuf;

use wal::RetentionPolicy;

/// Engine configuration, read once at [`Engine::open`](crate::Engine::open)
/// and immutable afterwards. Paths and policies are plumbed through
/// explicitly — there is no ambient or global state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for WAL segments; created if missing.
    pub wal_dir: PathBuf,
    /// Bytes at which a WAL segment is considered full and rotated.
    pub wal_segment_size: u64,
    /// Pruning rules for sealed WAL segments (zero fields = unlimited).
    pub wal_retention: RetentionPolicy,
    /// Directory for SSTable files; created if missing.
    pub sstable_dir: PathBuf,
    /// Memtable entry count that triggers a flush.
    pub memtable_threshold: usize,
}

impl Config {
    pub const DEFAULT_WAL_SEGMENT_SIZE: u64 = 16 * 1024 * 1024;
    pub const DEFAULT_MEMTABLE_THRESHOLD: usize = 1024;

    /// A configuration with default sizing for the given directories.
    pub fn new(wal_dir: impl Into<PathBuf>, sstable_dir: impl Into<PathBuf>) -> Self {
        Config {
            wal_dir: wal_dir.into(),
            wal_segment_size: Self::DEFAULT_WAL_SEGMENT_SIZE,
            wal_retention: RetentionPolicy::default(),
            sstable_dir: sstable_dir.into(),
            memtable_threshold: Self::DEFAULT_MEMTABLE_THRESHOLD,
        }
    }
}
