use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A key/value pair as the engine and the SSTable layer see it.
///
/// The serde shape is fixed by the SSTable block format: PascalCase field
/// names with the value carried as standard base64, i.e.
/// `{"Key":"user1","Value":"SGVsbG8="}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value", with = "base64_bytes")]
    pub value: Vec<u8>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Unordered in-memory overlay holding the most recent writes.
///
/// Deliberately just a `HashMap`: ordering happens once, at flush time,
/// inside the SSTable writer. The engine owns the size invariant — it
/// flushes inside the same `put` that crosses the threshold.
#[derive(Debug, Default)]
pub struct Memtable {
    map: HashMap<String, Entry>,
}

impl Memtable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry; an existing entry under the same key is replaced.
    pub fn insert(&mut self, entry: Entry) {
        self.map.insert(entry.key.clone(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.map.get(key)
    }

    /// Erases a key. Used when replaying a tombstone from the WAL.
    pub fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clones out every entry, in no particular order.
    pub fn entries(&self) -> Vec<Entry> {
        self.map.values().cloned().collect()
    }

    /// Drops all entries, keeping the allocation.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests;
