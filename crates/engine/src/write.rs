/// Write path: `put()`, `force_flush()`, and the internal `flush()`.
///
/// Every mutation is appended (and fsynced) to the WAL before it touches
/// the memtable, so a `put` that returns `Ok` is durable. The `put` that
/// brings the memtable up to the threshold flushes it before returning.
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{Engine, EngineInner, Entry};

impl Engine {
    /// Inserts a key-value pair.
    ///
    /// A keyed overwrite wins: putting an existing key replaces its value.
    ///
    /// # Errors
    ///
    /// If the WAL append fails the memtable is left untouched and the
    /// caller may retry. If the flush fails, the memtable and WAL keep the
    /// data, so a later `put` retries the flush.
    pub fn put(&self, entry: Entry) -> Result<()> {
        let mut inner = self.lock();

        let record = wal::Entry::put(entry.key.clone().into_bytes(), entry.value.clone());
        inner
            .wal
            .append(&record)
            .with_context(|| format!("failed to append wal record for key {}", entry.key))?;

        debug!(key = %entry.key, "inserted entry into memtable");
        inner.mem.insert(entry);

        if inner.mem.len() >= inner.threshold {
            inner.flush()?;
        }

        Ok(())
    }

    /// Forces a flush of the current memtable to a new SSTable.
    ///
    /// A no-op when the memtable is empty. The automatic flush in `put`
    /// makes this unnecessary in normal operation; it exists for operators
    /// who want to bound WAL replay time before a planned restart.
    pub fn force_flush(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.mem.is_empty() {
            return Ok(());
        }
        inner.flush()
    }
}

impl EngineInner {
    /// Converts the memtable into the next SSTable and reclaims WAL space.
    ///
    /// Runs under the engine's exclusive lock. Order matters: the table
    /// write must return before the sealed WAL segments are dropped — up to
    /// that point the WAL is the only durable copy. A failure anywhere
    /// leaves the memtable and WAL intact so the next `put` retries; a
    /// failed write leaves at most a `.sst.tmp` staging file (never the
    /// final name), which the retry truncates and recovery deletes.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let file_name = format!("sstable_{}.sst", self.sstables.len());

        self.tables
            .write(&file_name, self.mem.entries())
            .with_context(|| format!("failed to flush memtable to {}", file_name))?;

        self.wal
            .remove_old_segments()
            .context("failed to reclaim wal segments after flush")?;

        self.mem.clear();
        info!(table = %file_name, "flushed memtable");
        self.sstables.push(file_name);

        Ok(())
    }
}
