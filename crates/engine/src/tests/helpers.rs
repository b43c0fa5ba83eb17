use std::fs;
use std::path::Path;

use wal::RetentionPolicy;

use crate::{Config, Engine};

/// Opens an engine rooted in `dir` with the given flush threshold.
pub fn open_engine(dir: &Path, threshold: usize) -> Engine {
    Engine::open(test_config(dir, threshold)).unwrap()
}

pub fn test_config(dir: &Path, threshold: usize) -> Config {
    Config {
        wal_dir: dir.join("wal"),
        wal_segment_size: 1 << 20,
        wal_retention: RetentionPolicy::default(),
        sstable_dir: dir.join("sst"),
        memtable_threshold: threshold,
    }
}

pub fn count_sst_files(dir: &Path) -> usize {
    fs::read_dir(dir.join("sst"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext == "sst")
                .unwrap_or(false)
        })
        .count()
}
