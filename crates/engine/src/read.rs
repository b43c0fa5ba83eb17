/// Read path: `get()`.
///
/// The memtable holds the freshest data and is probed first; on a miss the
/// SSTables are probed newest to oldest, so later flushes shadow earlier
/// writes of the same key.
use anyhow::Result;
use sstable::TableError;
use tracing::{debug, warn};

use crate::{Engine, Entry, NotFound};

impl Engine {
    /// Looks up a key.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] (display form `entry not found`) when no layer
    /// holds the key. A read failure in one SSTable is logged and treated
    /// as a miss for that layer; the search continues into older tables.
    pub fn get(&self, key: &str) -> Result<Entry> {
        let inner = self.lock();

        if let Some(entry) = inner.mem.get(key) {
            debug!(key, "found entry in memtable");
            return Ok(entry.clone());
        }

        for name in inner.sstables.iter().rev() {
            match inner.tables.find_key(name, key) {
                Ok(entry) => {
                    debug!(key, table = %name, "found entry in sstable");
                    return Ok(entry);
                }
                Err(TableError::KeyNotFound(_)) => continue,
                Err(err) => {
                    warn!(key, table = %name, error = %err, "sstable lookup failed");
                    continue;
                }
            }
        }

        debug!(key, "entry not found in any layer");
        Err(NotFound.into())
    }
}
