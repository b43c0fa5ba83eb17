use std::fs;
use std::path::{Path, PathBuf};

use memtable::Entry;
use tracing::debug;

use crate::error::TableError;
use crate::{reader, writer};

/// Filename-addressed access to the SSTable files in one directory.
///
/// The store keeps no per-file state: every operation opens a fresh handle
/// and closes it on return, so concurrent lookups can never alias a shared
/// file position.
pub struct TableStore {
    dir: PathBuf,
}

impl TableStore {
    /// Binds the store to a directory, creating it if missing.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<TableStore, TableError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| TableError::io("create_dir", e))?;
        Ok(TableStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `entries` (any order, no duplicate keys) as a new table file.
    pub fn write(&self, file_name: &str, entries: Vec<Entry>) -> Result<(), TableError> {
        let count = entries.len();
        writer::write_table(&self.dir.join(file_name), entries)?;
        debug!(table = file_name, entries = count, "wrote sstable");
        Ok(())
    }

    /// Returns every entry in the table, in key order.
    pub fn read_all(&self, file_name: &str) -> Result<Vec<Entry>, TableError> {
        reader::read_all(&self.dir.join(file_name))
    }

    /// Decodes the single block whose header sits at `offset`.
    pub fn read_block(&self, file_name: &str, offset: u64) -> Result<Vec<Entry>, TableError> {
        reader::read_block(&self.dir.join(file_name), offset)
    }

    /// Point lookup for `key`; misses surface as [`TableError::KeyNotFound`].
    pub fn find_key(&self, file_name: &str, key: &str) -> Result<Entry, TableError> {
        reader::find_key(&self.dir.join(file_name), key)
    }
}
