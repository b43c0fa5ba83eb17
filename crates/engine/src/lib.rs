//! # Engine — SiltKV Storage Engine
//!
//! The central orchestrator that ties together the [`memtable`], [`wal`],
//! and [`sstable`] crates into a log-structured merge key-value store.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │ write.rs → WAL append (fsync) → Memtable      │
//! │              |                                │
//! │              |  (threshold reached?)          │
//! │              |            yes                 │
//! │              v                                │
//! │           flush() → sstable_<N>.sst           │
//! │              |                                │
//! │              v                                │
//! │           drop sealed WAL segments            │
//! │                                               │
//! │ read.rs → Memtable → SSTables (newest first)  │
//! │            (first match wins)                 │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module responsibilities
//!
//! | Module        | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `lib.rs`      | `Engine` struct, `open`, accessors, `Debug`, `Drop` |
//! | [`config`]    | Directory paths, segment size, threshold, retention |
//! | [`recovery`]  | WAL replay and SSTable stack discovery           |
//! | `write.rs`    | `put()`, `force_flush()`, the internal `flush()` |
//! | `read.rs`     | `get()`                                          |
//!
//! ## Crash safety
//!
//! Every write is fsynced into the WAL **before** the memtable update, so
//! an acknowledged `put` survives a crash. Sealed WAL segments are only
//! removed **after** a flush completes — a crash in between merely replays
//! duplicate records into the memtable. SSTables are committed by an
//! atomic temp-file rename, so a crash mid-flush leaves only a `.sst.tmp`
//! leftover that recovery deletes; a `sstable_<N>.sst` name always refers
//! to a complete table.
//!
//! ## Concurrency
//!
//! One exclusive lock covers the whole `put`/`get`/flush critical section;
//! readers always observe the post-flush state atomically. Lock order is
//! engine → WAL manager → segment, and no path takes them in reverse.

mod config;
mod read;
mod recovery;
mod write;

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use tracing::info;

pub use config::Config;
pub use memtable::Entry;

use memtable::Memtable;
use sstable::TableStore;
use wal::Manager;

/// Typed miss returned by [`Engine::get`]. Its display form,
/// `entry not found`, is part of the lookup contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("entry not found")]
pub struct NotFound;

/// The storage engine. Cheap to share behind an `Arc`; all methods take
/// `&self` and serialize internally.
pub struct Engine {
    inner: Mutex<EngineInner>,
}

pub(crate) struct EngineInner {
    pub(crate) mem: Memtable,
    /// SSTable filenames, oldest first: `sstables[i]` came from the i-th
    /// flush, so newer files shadow older ones on key collisions.
    pub(crate) sstables: Vec<String>,
    pub(crate) wal: Manager,
    pub(crate) tables: TableStore,
    /// Memtable entry count that triggers a flush, inclusive: the `put`
    /// that makes the count reach this value flushes before returning.
    pub(crate) threshold: usize,
}

impl Engine {
    /// Opens the engine, recovering all durable state.
    ///
    /// Recovery opens the WAL and SSTable directories (creating them if
    /// missing), deletes stale `.sst.tmp` leftovers from interrupted
    /// flushes, rebuilds the SSTable stack from the `sstable_<N>.sst`
    /// files on disk, and replays every WAL record into a fresh memtable —
    /// `Put` records insert, `Delete` records erase. The memtable may
    /// exceed the threshold during replay; the flush is deferred to the
    /// next `put`.
    pub fn open(config: Config) -> Result<Engine> {
        let wal = Manager::open(
            &config.wal_dir,
            config.wal_segment_size,
            config.wal_retention,
        )
        .context("failed to open wal directory")?;
        let tables =
            TableStore::open(&config.sstable_dir).context("failed to open sstable directory")?;

        recovery::remove_stale_tmp_files(tables.dir());
        let sstables = recovery::discover_sstables(tables.dir())?;

        let mut mem = Memtable::new();
        let replayed = recovery::replay_wal(&wal, &mut mem)?;

        info!(
            replayed,
            sstables = sstables.len(),
            memtable_entries = mem.len(),
            "engine recovered"
        );

        Ok(Engine {
            inner: Mutex::new(EngineInner {
                mem,
                sstables,
                wal,
                tables,
                threshold: config.memtable_threshold,
            }),
        })
    }

    /// Flushes any buffered writes and closes the WAL.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.lock();
        if !inner.mem.is_empty() {
            inner.flush()?;
        }
        inner.wal.close().context("failed to close wal")?;
        Ok(())
    }

    /// Applies the configured WAL retention policy to sealed segments.
    ///
    /// The flush path always removes *all* sealed segments (they are
    /// redundant once their effect is in an SSTable); this is the separate
    /// operator-driven knob for bounding WAL space between flushes.
    pub fn apply_wal_retention(&self) -> Result<()> {
        let inner = self.lock();
        inner
            .wal
            .apply_retention_policy()
            .context("failed to apply wal retention policy")?;
        Ok(())
    }

    /// Number of entries currently buffered in the memtable.
    pub fn memtable_len(&self) -> usize {
        self.lock().mem.len()
    }

    /// Number of SSTables in the stack.
    pub fn sstable_count(&self) -> usize {
        self.lock().sstables.len()
    }

    /// Number of sealed (read-only) WAL segments on disk.
    pub fn wal_sealed_segments(&self) -> usize {
        self.lock().wal.sealed_segment_count()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Engine")
            .field("memtable_entries", &inner.mem.len())
            .field("sstable_count", &inner.sstables.len())
            .field("wal_sealed_segments", &inner.wal.sealed_segment_count())
            .field("threshold", &inner.threshold)
            .finish()
    }
}

/// Best-effort flush on drop.
///
/// Errors are swallowed because `Drop` cannot propagate them — the data is
/// still safe in the WAL and will be recovered on the next open.
impl Drop for Engine {
    fn drop(&mut self) {
        let mut inner = self.lock();
        if !inner.mem.is_empty() {
            let _ = inner.flush();
        }
    }
}

#[cfg(test)]
mod tests;
