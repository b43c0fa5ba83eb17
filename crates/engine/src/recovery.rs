/// Cold-start recovery: rebuild the SSTable stack from the files on disk
/// and replay the WAL into a fresh memtable.
use std::path::Path;

use anyhow::{Context, Result};
use memtable::{Entry, Memtable};
use wal::{EntryKind, Manager};

/// Removes leftover `.sst.tmp` files from interrupted flushes.
///
/// The writer only renames a table to its final name after the header
/// patch and fsync, so a tmp file is never part of the stack — it is
/// garbage from a crash mid-write. Best effort: an undeletable tmp file
/// is harmless and will be truncated by the next write anyway.
pub(crate) fn remove_stale_tmp_files(dir: &Path) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(".sst.tmp") {
                    let _ = std::fs::remove_file(&path);
                }
            }
        }
    }
}

/// Rebuilds the SSTable stack by scanning for `sstable_<N>.sst` files.
///
/// The stack is ordered by `N` (oldest first), matching the invariant that
/// the i-th flush produced `sstable_<i>.sst`. Files that do not match the
/// naming scheme are ignored.
pub(crate) fn discover_sstables(dir: &Path) -> Result<Vec<String>> {
    let mut found: Vec<(usize, String)> = Vec::new();

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list sstable directory {}", dir.display()))?;
    for entry in entries.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if let Some(n) = parse_sstable_index(&name) {
            found.push((n, name));
        }
    }

    found.sort_by_key(|(n, _)| *n);
    Ok(found.into_iter().map(|(_, name)| name).collect())
}

/// Replays the full durable history into `mem`, returning the number of
/// records applied. `Put` records insert; `Delete` records erase. The
/// memtable may exceed the flush threshold here — the flush is deferred to
/// the next external `put`.
pub(crate) fn replay_wal(wal: &Manager, mem: &mut Memtable) -> Result<usize> {
    let records = wal.read_all().context("failed to replay wal")?;
    let replayed = records.len();

    for record in records {
        let key = String::from_utf8(record.key).context("invalid utf-8 key in wal record")?;
        match record.kind {
            EntryKind::Put => mem.insert(Entry::new(key, record.value)),
            EntryKind::Delete => mem.remove(&key),
        }
    }

    Ok(replayed)
}

fn parse_sstable_index(name: &str) -> Option<usize> {
    name.strip_prefix("sstable_")?
        .strip_suffix(".sst")?
        .parse()
        .ok()
}
