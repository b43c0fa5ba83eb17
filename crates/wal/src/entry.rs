use byteorder::{BigEndian, ByteOrder};
use crc32fast::Hasher as Crc32;

use crate::error::WalError;

/// Fixed prefix of every record: CRC (4) + kind (1) + key_len (4) + value_len (4).
/// Anything shorter cannot be a record at all.
pub const ENTRY_HEADER_BYTES: usize = 13;

/// Discriminates the two mutation kinds carried by the log.
///
/// `Delete` exists for replay semantics (a tombstone erases the key from
/// the rebuilt memtable); the engine's public surface only issues `Put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryKind {
    Put = 1,
    Delete = 2,
}

impl EntryKind {
    fn from_u8(raw: u8) -> Result<Self, WalError> {
        match raw {
            1 => Ok(EntryKind::Put),
            2 => Ok(EntryKind::Delete),
            _ => Err(WalError::Corrupted),
        }
    }
}

/// A single logical mutation: a kind tag plus opaque key and value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Entry {
    pub fn put(key: Vec<u8>, value: Vec<u8>) -> Self {
        Entry {
            kind: EntryKind::Put,
            key,
            value,
        }
    }

    pub fn delete(key: Vec<u8>) -> Self {
        Entry {
            kind: EntryKind::Delete,
            key,
            value: Vec::new(),
        }
    }

    /// Serializes the entry into the on-disk record layout.
    ///
    /// The leading four bytes hold a CRC32 (IEEE) over everything after
    /// them; lengths are big-endian.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ENTRY_HEADER_BYTES + self.key.len() + self.value.len());

        // Reserve the CRC slot, filled last.
        buf.extend_from_slice(&[0u8; 4]);
        buf.push(self.kind as u8);

        let mut len = [0u8; 4];
        BigEndian::write_u32(&mut len, self.key.len() as u32);
        buf.extend_from_slice(&len);
        BigEndian::write_u32(&mut len, self.value.len() as u32);
        buf.extend_from_slice(&len);

        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);

        let mut hasher = Crc32::new();
        hasher.update(&buf[4..]);
        let crc = hasher.finalize();
        BigEndian::write_u32(&mut buf[0..4], crc);

        buf
    }

    /// Decodes a record, verifying its checksum and declared lengths.
    ///
    /// The returned entry owns freshly copied key/value buffers and shares
    /// no storage with `buf`.
    ///
    /// # Errors
    ///
    /// - [`WalError::Corrupted`] if the buffer is shorter than
    ///   [`ENTRY_HEADER_BYTES`], the declared lengths overflow the buffer,
    ///   or the kind byte is unknown.
    /// - [`WalError::ChecksumMismatch`] if the stored CRC32 differs from a
    ///   recomputation.
    pub fn decode(buf: &[u8]) -> Result<Entry, WalError> {
        if buf.len() < ENTRY_HEADER_BYTES {
            return Err(WalError::Corrupted);
        }

        let stored_crc = BigEndian::read_u32(&buf[0..4]);
        let mut hasher = Crc32::new();
        hasher.update(&buf[4..]);
        if hasher.finalize() != stored_crc {
            return Err(WalError::ChecksumMismatch);
        }

        let kind = EntryKind::from_u8(buf[4])?;
        let key_len = BigEndian::read_u32(&buf[5..9]) as usize;
        let value_len = BigEndian::read_u32(&buf[9..13]) as usize;

        let body = &buf[ENTRY_HEADER_BYTES..];
        if key_len
            .checked_add(value_len)
            .map_or(true, |total| total > body.len())
        {
            return Err(WalError::Corrupted);
        }

        Ok(Entry {
            kind,
            key: body[..key_len].to_vec(),
            value: body[key_len..key_len + value_len].to_vec(),
        })
    }
}
