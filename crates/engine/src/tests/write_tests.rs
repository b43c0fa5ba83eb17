use tempfile::tempdir;

use super::helpers::{count_sst_files, open_engine};
use crate::Entry;

// -------------------- Read after write --------------------

#[test]
fn put_then_get() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 1024);

    engine
        .put(Entry::new("user1", b"Hello, World!".to_vec()))
        .unwrap();
    let entry = engine.get("user1").unwrap();
    assert_eq!(entry.value, b"Hello, World!");
}

#[test]
fn keyed_overwrite_wins_in_memtable() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 1024);

    engine.put(Entry::new("k", b"v1".to_vec())).unwrap();
    engine.put(Entry::new("k", b"v2".to_vec())).unwrap();

    assert_eq!(engine.get("k").unwrap().value, b"v2");
    assert_eq!(engine.memtable_len(), 1);
}

#[test]
fn shadowing_across_flushes() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 2);

    // First flush captures k=v1.
    engine.put(Entry::new("k", b"v1".to_vec())).unwrap();
    engine.put(Entry::new("pad0", b"x".to_vec())).unwrap();
    assert_eq!(engine.sstable_count(), 1);

    // Second flush captures k=v2; the newer table must win.
    engine.put(Entry::new("k", b"v2".to_vec())).unwrap();
    engine.put(Entry::new("pad1", b"x".to_vec())).unwrap();
    assert_eq!(engine.sstable_count(), 2);

    assert_eq!(engine.get("k").unwrap().value, b"v2");
}

// -------------------- Flush boundary --------------------

#[test]
fn flush_triggers_exactly_at_threshold() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 3);

    engine.put(Entry::new("k0", b"v".to_vec())).unwrap();
    engine.put(Entry::new("k1", b"v".to_vec())).unwrap();
    assert_eq!(engine.memtable_len(), 2);
    assert_eq!(engine.sstable_count(), 0);

    // The third put reaches the threshold and flushes synchronously.
    engine.put(Entry::new("k2", b"v".to_vec())).unwrap();
    assert_eq!(engine.memtable_len(), 0);
    assert_eq!(engine.sstable_count(), 1);

    // The next put starts filling a fresh memtable.
    engine.put(Entry::new("k3", b"v".to_vec())).unwrap();
    assert_eq!(engine.memtable_len(), 1);
    assert_eq!(engine.sstable_count(), 1);
}

#[test]
fn overwrites_do_not_advance_the_threshold() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 3);

    // Same key three times: memtable size stays 1, no flush.
    for v in [b"v1", b"v2", b"v3"] {
        engine.put(Entry::new("k", v.to_vec())).unwrap();
    }
    assert_eq!(engine.memtable_len(), 1);
    assert_eq!(engine.sstable_count(), 0);
}

#[test]
fn flushed_tables_are_named_by_flush_ordinal() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 1);

    for i in 0..3 {
        engine
            .put(Entry::new(format!("k{}", i), b"v".to_vec()))
            .unwrap();
    }

    assert_eq!(engine.sstable_count(), 3);
    assert_eq!(count_sst_files(dir.path()), 3);
    for i in 0..3 {
        assert!(dir
            .path()
            .join("sst")
            .join(format!("sstable_{}.sst", i))
            .exists());
    }
}

// -------------------- force_flush --------------------

#[test]
fn force_flush_on_empty_memtable_is_noop() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 1024);

    engine.force_flush().unwrap();
    assert_eq!(engine.sstable_count(), 0);
}

#[test]
fn force_flush_persists_buffered_entries() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 1024);

    engine.put(Entry::new("k", b"v".to_vec())).unwrap();
    assert_eq!(engine.sstable_count(), 0);

    engine.force_flush().unwrap();
    assert_eq!(engine.memtable_len(), 0);
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get("k").unwrap().value, b"v");
}

// -------------------- WAL interaction --------------------

#[test]
fn flush_drops_sealed_wal_segments() {
    let dir = tempdir().unwrap();
    let mut config = super::helpers::test_config(dir.path(), 4);
    // Tiny segments: every append seals another segment.
    config.wal_segment_size = 1;
    let engine = crate::Engine::open(config).unwrap();

    for i in 0..3 {
        engine
            .put(Entry::new(format!("k{}", i), b"v".to_vec()))
            .unwrap();
    }
    assert!(engine.wal_sealed_segments() >= 2);

    // The flush captures all of it and reclaims the sealed segments.
    engine.put(Entry::new("k3", b"v".to_vec())).unwrap();
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.wal_sealed_segments(), 0);
}

#[test]
fn get_after_flush_reads_from_sstable() {
    let dir = tempdir().unwrap();
    let engine = open_engine(dir.path(), 1);

    engine.put(Entry::new("k1", b"v1".to_vec())).unwrap();
    assert_eq!(engine.memtable_len(), 0);

    assert_eq!(engine.get("k1").unwrap().value, b"v1");
}
