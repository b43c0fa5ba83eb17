use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use crc32fast::Hasher as Crc32;
use flate2::read::GzDecoder;
use memtable::Entry;

use crate::codec::{decode_line, line_key};
use crate::error::TableError;
use crate::format::{BlockHeader, FileHeader, IndexEntry, FILE_HEADER_BYTES};

/// Streams every entry in on-disk (key-sorted) order by chaining each
/// block's `next_block_offset` until it meets the index.
pub(crate) fn read_all(path: &Path) -> Result<Vec<Entry>, TableError> {
    let mut file = open_table(path)?;
    let header = read_header(&mut file)?;

    let mut entries = Vec::with_capacity(header.entry_count as usize);
    let mut offset = FILE_HEADER_BYTES;
    while offset < header.index_offset {
        let (block, lines) = read_block_at(&mut file, offset)?;
        for line in &lines {
            entries.push(decode_line(line)?);
        }
        if block.next_block_offset <= offset {
            return Err(TableError::io(
                "read_block_header",
                io::Error::new(io::ErrorKind::InvalidData, "block chain does not advance"),
            ));
        }
        offset = block.next_block_offset;
    }
    Ok(entries)
}

/// Decodes the single block whose header sits at `offset`.
pub(crate) fn read_block(path: &Path, offset: u64) -> Result<Vec<Entry>, TableError> {
    let mut file = open_table(path)?;
    let (_, lines) = read_block_at(&mut file, offset)?;
    lines.iter().map(|line| decode_line(line)).collect()
}

/// Point lookup: binary-search the sparse index for the candidate block,
/// then binary-search the decoded block by key prefix.
pub(crate) fn find_key(path: &Path, key: &str) -> Result<Entry, TableError> {
    let mut file = open_table(path)?;
    let header = read_header(&mut file)?;

    file.seek(SeekFrom::Start(header.index_offset))
        .map_err(|e| TableError::io("seek_index", e))?;
    let index_count = file
        .read_u32::<BigEndian>()
        .map_err(|e| TableError::io("read_index", e))?;

    // The index entries are variable-width, so materialize them in one
    // sequential pass rather than re-scanning to the midpoint per probe.
    let mut index = Vec::with_capacity(index_count as usize);
    for _ in 0..index_count {
        index.push(IndexEntry::read_from(&mut file).map_err(|e| TableError::io("read_index", e))?);
    }

    let offset = locate_block(&index, key).ok_or_else(|| TableError::KeyNotFound(key.to_owned()))?;
    let (_, lines) = read_block_at(&mut file, offset)?;
    search_block(&lines, key)
}

fn open_table(path: &Path) -> Result<File, TableError> {
    File::open(path).map_err(|e| TableError::io("open_table", e))
}

fn read_header(file: &mut File) -> Result<FileHeader, TableError> {
    file.seek(SeekFrom::Start(0))
        .map_err(|e| TableError::io("read_header", e))?;
    FileHeader::read_from(file).map_err(|e| TableError::io("read_header", e))
}

/// Reads, CRC-verifies, and decompresses one block into its text lines.
fn read_block_at(file: &mut File, offset: u64) -> Result<(BlockHeader, Vec<String>), TableError> {
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| TableError::io("seek_block", e))?;
    let header =
        BlockHeader::read_from(file).map_err(|e| TableError::io("read_block_header", e))?;

    let mut compressed = vec![0u8; header.compressed_size as usize];
    file.read_exact(&mut compressed)
        .map_err(|e| TableError::io("read_block", e))?;

    let mut hasher = Crc32::new();
    hasher.update(&compressed);
    if hasher.finalize() != header.checksum {
        return Err(TableError::ChecksumMismatch { offset });
    }

    let mut text = String::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_string(&mut text)
        .map_err(|e| TableError::io("decompress_block", e))?;

    let lines = text.lines().map(str::to_owned).collect();
    Ok((header, lines))
}

/// Binary search over `[start_key, end_key]` ranges.
///
/// An exact range hit returns immediately. When the probe's end key sorts
/// below the target, its block is remembered as a fallback candidate and
/// the search moves right; if no range ever contains the key the fallback
/// block is still decoded and searched, and the miss surfaces there.
/// `None` means the key sorts below every block.
fn locate_block(index: &[IndexEntry], key: &str) -> Option<u64> {
    let mut candidate = None;
    let mut left = 0isize;
    let mut right = index.len() as isize - 1;

    while left <= right {
        let mid = ((left + right) / 2) as usize;
        let entry = &index[mid];
        if key == entry.start_key
            || key == entry.end_key
            || (entry.start_key.as_str() < key && key < entry.end_key.as_str())
        {
            return Some(entry.block_offset);
        }
        if entry.end_key.as_str() < key {
            candidate = Some(entry.block_offset);
            left = mid as isize + 1;
        } else {
            right = mid as isize - 1;
        }
    }

    candidate
}

/// Binary search of decoded lines, comparing only the key prefix before
/// the first comma.
fn search_block(lines: &[String], key: &str) -> Result<Entry, TableError> {
    let mut left = 0isize;
    let mut right = lines.len() as isize - 1;

    while left <= right {
        let mid = ((left + right) / 2) as usize;
        match line_key(&lines[mid]).cmp(key) {
            Ordering::Equal => return decode_line(&lines[mid]),
            Ordering::Less => left = mid as isize + 1,
            Ordering::Greater => right = mid as isize - 1,
        }
    }

    Err(TableError::KeyNotFound(key.to_owned()))
}
