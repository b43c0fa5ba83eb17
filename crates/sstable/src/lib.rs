//! # SSTable — Sorted String Table
//!
//! Immutable, on-disk storage files for the SiltKV storage engine.
//!
//! When the in-memory [`memtable::Memtable`] reaches its entry threshold
//! the engine flushes it to disk as an SSTable. SSTables are *write-once,
//! read-many* — once the header is patched with the final index offset the
//! file is never modified again.
//!
//! ## File layout (v1)
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ FILE HEADER (28 bytes, all integers big-endian)               │
//! │                                                               │
//! │ version (u32) | created_at (i64) | entry_count (u32)          │
//! │ index_offset (u64) | block_size (u32)                         │
//! ├───────────────────────────────────────────────────────────────┤
//! │ BLOCKS (repeated until index_offset)                          │
//! │                                                               │
//! │ entry_count (u32) | compressed_size (u32) | checksum (u32)    │
//! │ next_block_offset (u64)                                       │
//! │ <compressed_size bytes of gzip data>                          │
//! │                                                               │
//! │ The payload decompresses to one entry per line:               │
//! │   <key>,<base64(json{"Key","Value"})>                         │
//! │ 100 entries per block; the final block may be short. The      │
//! │ checksum is CRC32 (IEEE) over the compressed payload, and the │
//! │ last block's next_block_offset equals index_offset.           │
//! ├───────────────────────────────────────────────────────────────┤
//! │ INDEX                                                         │
//! │                                                               │
//! │ index_count (u32), then per block:                            │
//! │ start_key_len (u32) | start_key | end_key_len (u32) | end_key │
//! │ block_offset (u64)                                            │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blocks hold ascending, non-overlapping key ranges, so a point lookup
//! binary-searches the index for the one candidate block, decompresses
//! it, and binary-searches the decoded lines by their key prefix.
//!
//! The writer stages everything in a `.sst.tmp` sibling, patches
//! `index_offset` into the header *last*, fsyncs, and only then renames
//! the file into place — the final name never refers to a half-written
//! table, and a leftover `.sst.tmp` is garbage from an interrupted write.

mod codec;
mod error;
mod format;
mod reader;
mod store;
mod writer;

pub use error::TableError;
pub use format::{
    BlockHeader, FileHeader, IndexEntry, BLOCK_ENTRY_COUNT, BLOCK_HEADER_BYTES, BLOCK_SIZE_HINT,
    FILE_HEADER_BYTES, VERSION,
};
pub use store::TableStore;

#[cfg(test)]
mod tests;
