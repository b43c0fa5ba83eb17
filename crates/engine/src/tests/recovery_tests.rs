use tempfile::tempdir;

use super::helpers::{open_engine, test_config};
use crate::{Engine, Entry};

// -------------------- WAL replay --------------------

#[test]
fn unflushed_writes_survive_a_crash() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1024);
        engine.put(Entry::new("k", b"v".to_vec())).unwrap();
        // Crash: skip Drop so nothing is flushed — only the WAL has it.
        std::mem::forget(engine);
    }

    let engine = open_engine(dir.path(), 1024);
    assert_eq!(engine.sstable_count(), 0);
    assert_eq!(engine.memtable_len(), 1);
    assert_eq!(engine.get("k").unwrap().value, b"v");
}

#[test]
fn replay_preserves_overwrite_order() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1024);
        engine.put(Entry::new("k", b"v1".to_vec())).unwrap();
        engine.put(Entry::new("k", b"v2".to_vec())).unwrap();
        std::mem::forget(engine);
    }

    let engine = open_engine(dir.path(), 1024);
    assert_eq!(engine.get("k").unwrap().value, b"v2");
}

#[test]
fn replayed_delete_records_erase_keys() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), 1024);

    // Write a put followed by a tombstone straight into the WAL, the way a
    // richer front-end would.
    {
        let manager = wal::Manager::open(
            &config.wal_dir,
            config.wal_segment_size,
            config.wal_retention,
        )
        .unwrap();
        manager
            .append(&wal::Entry::put(b"doomed".to_vec(), b"v".to_vec()))
            .unwrap();
        manager
            .append(&wal::Entry::put(b"kept".to_vec(), b"v".to_vec()))
            .unwrap();
        manager
            .append(&wal::Entry::delete(b"doomed".to_vec()))
            .unwrap();
        manager.close().unwrap();
    }

    let engine = Engine::open(config).unwrap();
    assert_eq!(engine.memtable_len(), 1);
    assert!(engine.get("doomed").is_err());
    assert_eq!(engine.get("kept").unwrap().value, b"v");
}

#[test]
fn recovery_above_threshold_defers_the_flush() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1024);
        for i in 0..5 {
            engine
                .put(Entry::new(format!("k{}", i), b"v".to_vec()))
                .unwrap();
        }
        std::mem::forget(engine);
    }

    // Reopen with a threshold the replayed memtable already exceeds.
    let engine = open_engine(dir.path(), 3);
    assert_eq!(engine.memtable_len(), 5);
    assert_eq!(engine.sstable_count(), 0);

    // The next put crosses the boundary and flushes everything.
    engine.put(Entry::new("k5", b"v".to_vec())).unwrap();
    assert_eq!(engine.memtable_len(), 0);
    assert_eq!(engine.sstable_count(), 1);
}

// -------------------- SSTable stack discovery --------------------

#[test]
fn reopen_rediscovers_flushed_tables() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1);
        for i in 0..3 {
            engine
                .put(Entry::new(format!("k{}", i), format!("v{}", i).into_bytes()))
                .unwrap();
        }
        engine.close().unwrap();
    }

    let engine = open_engine(dir.path(), 1024);
    assert_eq!(engine.sstable_count(), 3);
    for i in 0..3 {
        let entry = engine.get(&format!("k{}", i)).unwrap();
        assert_eq!(entry.value, format!("v{}", i).into_bytes());
    }
}

#[test]
fn rediscovered_stack_keeps_shadowing_order() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1);
        engine.put(Entry::new("k", b"old".to_vec())).unwrap();
        engine.put(Entry::new("k", b"new".to_vec())).unwrap();
        engine.close().unwrap();
    }

    let engine = open_engine(dir.path(), 1024);
    assert_eq!(engine.sstable_count(), 2);
    assert_eq!(engine.get("k").unwrap().value, b"new");
}

#[test]
fn new_flushes_continue_the_table_numbering() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1);
        engine.put(Entry::new("a", b"1".to_vec())).unwrap();
        engine.put(Entry::new("b", b"2".to_vec())).unwrap();
        engine.close().unwrap();
    }

    let engine = open_engine(dir.path(), 1);
    engine.put(Entry::new("c", b"3".to_vec())).unwrap();

    assert!(dir.path().join("sst").join("sstable_2.sst").exists());
    assert_eq!(engine.sstable_count(), 3);
}

#[test]
fn foreign_files_in_sstable_dir_are_ignored() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), 1024);
    std::fs::create_dir_all(&config.sstable_dir).unwrap();
    std::fs::write(config.sstable_dir.join("README"), b"hands off").unwrap();
    std::fs::write(config.sstable_dir.join("sstable_x.sst"), b"junk").unwrap();

    let engine = Engine::open(config).unwrap();
    assert_eq!(engine.sstable_count(), 0);
}

#[test]
fn interrupted_flush_leftovers_are_cleaned_up_not_promoted() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path(), 1024);
    std::fs::create_dir_all(&config.sstable_dir).unwrap();

    // A crash mid-flush leaves the staging file, never the final name.
    let tmp = config.sstable_dir.join("sstable_0.sst.tmp");
    std::fs::write(&tmp, b"half-written junk").unwrap();

    let engine = Engine::open(config).unwrap();
    assert_eq!(engine.sstable_count(), 0);
    assert!(!tmp.exists(), "stale tmp file should be deleted at open");

    // The next flush reuses the ordinal without tripping over the leftover.
    engine.put(Entry::new("k", b"v".to_vec())).unwrap();
    engine.close().unwrap();
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get("k").unwrap().value, b"v");
}

// -------------------- Close --------------------

#[test]
fn close_flushes_buffered_writes() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1024);
        engine.put(Entry::new("k", b"v".to_vec())).unwrap();
        engine.close().unwrap();
        assert_eq!(engine.memtable_len(), 0);
        assert_eq!(engine.sstable_count(), 1);
    }

    let engine = open_engine(dir.path(), 1024);
    assert_eq!(engine.get("k").unwrap().value, b"v");
}

#[test]
fn drop_flushes_best_effort() {
    let dir = tempdir().unwrap();

    {
        let engine = open_engine(dir.path(), 1024);
        engine.put(Entry::new("k", b"v".to_vec())).unwrap();
        // Dropped without close().
    }

    let engine = open_engine(dir.path(), 1024);
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.get("k").unwrap().value, b"v");
}
