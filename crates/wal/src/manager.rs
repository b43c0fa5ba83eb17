use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::entry::Entry;
use crate::error::WalError;
use crate::segment::Segment;

/// Filename suffix shared by every segment in a WAL directory.
pub const SEGMENT_SUFFIX: &str = ".wal";

/// Limits on how many sealed segments are kept around.
///
/// A zero field disables that rule. Count-based pruning runs before
/// age-based pruning; both trim from the oldest end and never touch the
/// active segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Maximum number of sealed segments to keep (0 = unlimited).
    pub max_segments: usize,
    /// Maximum age of a sealed segment, judged by file modification time
    /// (zero = unlimited).
    pub max_age: Duration,
}

/// Owns a WAL directory: one active segment plus an ordered list of sealed
/// segments, oldest first.
///
/// A manager-level reader/writer lock serializes mutators against each
/// other and against [`read_all`](Manager::read_all). Per-segment mutexes
/// are always taken sealed head-to-tail, then active, so the two lock
/// levels cannot deadlock.
pub struct Manager {
    dir: PathBuf,
    max_segment_size: u64,
    retention: RetentionPolicy,
    inner: RwLock<SegmentList>,
}

struct SegmentList {
    active: Option<Segment>,
    sealed: Vec<Segment>,
    /// Numeric id of the newest segment ever created or recovered, used to
    /// keep rotation filenames strictly increasing even if the clock stalls.
    last_id: u128,
}

impl Manager {
    /// Opens a WAL directory, recovering any existing segments.
    ///
    /// Segments are listed by filename (ascending, which equals creation
    /// order), opened as sealed, and the newest is promoted to active. An
    /// empty directory rotates a fresh active segment. Partial trailing
    /// records are left in place; they surface as errors from
    /// [`read_all`](Manager::read_all).
    pub fn open<P: AsRef<Path>>(
        dir: P,
        max_segment_size: u64,
        retention: RetentionPolicy,
    ) -> Result<Manager, WalError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| WalError::io("create_dir", e))?;

        let mut names: Vec<String> = fs::read_dir(&dir)
            .map_err(|e| WalError::io("read_dir", e))?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name.ends_with(SEGMENT_SUFFIX))
            .collect();
        names.sort();

        let mut list = SegmentList {
            active: None,
            sealed: Vec::with_capacity(names.len()),
            last_id: names.last().and_then(|n| parse_segment_id(n)).unwrap_or(0),
        };
        for name in &names {
            list.sealed.push(Segment::open(dir.join(name), max_segment_size)?);
        }

        let manager = Manager {
            dir,
            max_segment_size,
            retention,
            inner: RwLock::new(list),
        };

        {
            let mut list = manager.write();
            match list.sealed.pop() {
                Some(newest) => list.active = Some(newest),
                None => manager.rotate(&mut list)?,
            }
        }

        Ok(manager)
    }

    /// Appends one entry to the active segment and forces it to stable
    /// storage before returning. Rotates first if the active segment is
    /// full (or absent).
    pub fn append(&self, entry: &Entry) -> Result<(), WalError> {
        let mut list = self.write();

        let needs_rotate = match &list.active {
            None => true,
            Some(active) => active.is_full(),
        };
        if needs_rotate {
            self.rotate(&mut list)?;
        }

        let active = list.active.as_ref().expect("rotate installs an active segment");
        active.append(entry)?;
        active.sync()
    }

    /// Returns the full durable history not yet truncated by retention:
    /// every sealed segment's records in order, then the active segment's.
    pub fn read_all(&self) -> Result<Vec<Entry>, WalError> {
        let list = self.read();

        let mut entries = Vec::new();
        for segment in &list.sealed {
            entries.extend(segment.read_all()?);
        }
        if let Some(active) = &list.active {
            entries.extend(active.read_all()?);
        }
        Ok(entries)
    }

    /// Closes and unlinks every sealed segment, leaving the active segment
    /// intact. Called after a successful memtable flush, when the sealed
    /// history is captured in an SSTable.
    pub fn remove_old_segments(&self) -> Result<(), WalError> {
        let mut list = self.write();
        for segment in list.sealed.drain(..) {
            remove_segment(segment)?;
        }
        Ok(())
    }

    /// Prunes sealed segments per the configured [`RetentionPolicy`]:
    /// count-based first, then age-based, both from the oldest end.
    pub fn apply_retention_policy(&self) -> Result<(), WalError> {
        let mut list = self.write();

        if self.retention.max_segments > 0 {
            while list.sealed.len() > self.retention.max_segments {
                let segment = list.sealed.remove(0);
                remove_segment(segment)?;
            }
        }

        if !self.retention.max_age.is_zero() {
            let cutoff = SystemTime::now()
                .checked_sub(self.retention.max_age)
                .unwrap_or(UNIX_EPOCH);
            while !list.sealed.is_empty() {
                let modified = fs::metadata(list.sealed[0].path())
                    .and_then(|m| m.modified())
                    .map_err(|e| WalError::io("stat_segment", e))?;
                if modified >= cutoff {
                    break;
                }
                let segment = list.sealed.remove(0);
                remove_segment(segment)?;
            }
        }

        Ok(())
    }

    /// Flushes and closes every owned segment.
    pub fn close(&self) -> Result<(), WalError> {
        let list = self.write();
        for segment in &list.sealed {
            segment.close()?;
        }
        if let Some(active) = &list.active {
            active.close()?;
        }
        Ok(())
    }

    /// Number of sealed (read-only) segments currently on disk.
    pub fn sealed_segment_count(&self) -> usize {
        self.read().sealed.len()
    }

    /// Seals the current active segment (after syncing it) and installs a
    /// fresh one whose name sorts strictly after every existing segment.
    fn rotate(&self, list: &mut SegmentList) -> Result<(), WalError> {
        if let Some(active) = &list.active {
            active.sync()?;
        }

        let mut id = unix_nanos();
        if id <= list.last_id {
            id = list.last_id + 1;
        }
        list.last_id = id;

        let name = format!("{:020}{}", id, SEGMENT_SUFFIX);
        let segment = Segment::open(self.dir.join(&name), self.max_segment_size)?;
        debug!(segment = %name, "rotated wal segment");

        if let Some(old) = list.active.take() {
            list.sealed.push(old);
        }
        list.active = Some(segment);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, SegmentList> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SegmentList> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn remove_segment(segment: Segment) -> Result<(), WalError> {
    segment.close()?;
    fs::remove_file(segment.path()).map_err(|e| WalError::io("remove_segment", e))?;
    debug!(segment = %segment.path().display(), "removed wal segment");
    Ok(())
}

fn parse_segment_id(name: &str) -> Option<u128> {
    name.strip_suffix(SEGMENT_SUFFIX)?.parse().ok()
}

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}
