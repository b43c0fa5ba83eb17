//! # WAL — Segmented Write-Ahead Log
//!
//! Crash-safe durability for the SiltKV storage engine.
//!
//! Every mutation is serialized into a checksummed binary record and
//! appended to the log **before** the corresponding in-memory update. On
//! restart the log is replayed to reconstruct the memtable, guaranteeing
//! that no acknowledged write is lost.
//!
//! ## Binary record format
//!
//! ```text
//! [crc32: u32 BE][kind: u8][key_len: u32 BE][value_len: u32 BE][key][value]
//! ```
//!
//! The CRC32 (IEEE) covers every byte after itself. On disk each record is
//! framed with a `u32 BE` length prefix.
//!
//! ## Segments
//!
//! The log is not one file but a directory of *segments*, each named
//! `{:020}.wal` after a nanosecond timestamp so lexicographic order equals
//! creation order. Exactly one segment is *active* (writable); the rest are
//! *sealed*. When the active segment reaches its configured size the
//! [`Manager`] rotates in a fresh one. Sealed segments become redundant
//! once the engine flushes the memtable they cover, at which point
//! [`Manager::remove_old_segments`] reclaims them; a [`RetentionPolicy`]
//! can additionally cap sealed segments by count or age.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wal::{Entry, Manager, RetentionPolicy};
//!
//! let manager = Manager::open("wal", 16 * 1024 * 1024, RetentionPolicy::default()).unwrap();
//! manager.append(&Entry::put(b"hello".to_vec(), b"world".to_vec())).unwrap();
//!
//! for entry in manager.read_all().unwrap() {
//!     println!("{:?}", entry);
//! }
//! ```

mod entry;
mod error;
mod manager;
mod segment;

pub use entry::{Entry, EntryKind, ENTRY_HEADER_BYTES};
pub use error::WalError;
pub use manager::{Manager, RetentionPolicy, SEGMENT_SUFFIX};
