use super::*;

#[test]
fn insert_get_remove() {
    let mut mem = Memtable::new();
    mem.insert(Entry::new("k1", b"v1".to_vec()));
    assert_eq!(mem.len(), 1);
    assert_eq!(mem.get("k1").unwrap().value, b"v1");

    mem.remove("k1");
    assert!(mem.get("k1").is_none());
    assert!(mem.is_empty());
}

#[test]
fn keyed_overwrite_wins() {
    let mut mem = Memtable::new();
    mem.insert(Entry::new("k", b"v1".to_vec()));
    mem.insert(Entry::new("k", b"v2".to_vec()));

    assert_eq!(mem.len(), 1);
    assert_eq!(mem.get("k").unwrap().value, b"v2");
}

#[test]
fn remove_of_absent_key_is_noop() {
    let mut mem = Memtable::new();
    mem.remove("ghost");
    assert!(mem.is_empty());
}

#[test]
fn entries_clones_everything_out() {
    let mut mem = Memtable::new();
    for i in 0..10 {
        mem.insert(Entry::new(format!("k{}", i), format!("v{}", i).into_bytes()));
    }

    let mut entries = mem.entries();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0], Entry::new("k0", b"v0".to_vec()));

    // The memtable itself is untouched.
    assert_eq!(mem.len(), 10);
}

#[test]
fn clear_empties_the_table() {
    let mut mem = Memtable::new();
    mem.insert(Entry::new("k", b"v".to_vec()));
    mem.clear();
    assert!(mem.is_empty());
}

// -------------------- Serde shape --------------------

#[test]
fn entry_serializes_to_pascal_case_with_base64_value() {
    let entry = Entry::new("user1", b"Hello, World!".to_vec());
    let json = serde_json::to_string(&entry).unwrap();
    assert_eq!(json, r#"{"Key":"user1","Value":"SGVsbG8sIFdvcmxkIQ=="}"#);
}

#[test]
fn entry_json_roundtrip() {
    let entry = Entry::new("k", vec![0x00, 0xFF, 0x10]);
    let json = serde_json::to_string(&entry).unwrap();
    let back: Entry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}

#[test]
fn entry_deserializes_hand_written_json() {
    let entry: Entry = serde_json::from_str(r#"{"Key":"a","Value":"eHl6"}"#).unwrap();
    assert_eq!(entry.key, "a");
    assert_eq!(entry.value, b"xyz");
}

#[test]
fn empty_value_roundtrips() {
    let entry = Entry::new("k", Vec::new());
    let json = serde_json::to_string(&entry).unwrap();
    assert_eq!(json, r#"{"Key":"k","Value":""}"#);
    let back: Entry = serde_json::from_str(&json).unwrap();
    assert!(back.value.is_empty());
}
