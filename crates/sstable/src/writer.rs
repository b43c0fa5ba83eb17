use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use flate2::write::GzEncoder;
use flate2::Compression;
use memtable::Entry;

use crate::codec::encode_line;
use crate::error::TableError;
use crate::format::{
    BlockHeader, FileHeader, IndexEntry, BLOCK_ENTRY_COUNT, BLOCK_HEADER_BYTES, BLOCK_SIZE_HINT,
    FILE_HEADER_BYTES, VERSION,
};

/// Writes a complete table file from an unordered batch of entries.
///
/// The batch is sorted by key (stable; callers must not supply duplicate
/// keys), packed into gzip-compressed blocks of [`BLOCK_ENTRY_COUNT`]
/// entries, and indexed by each block's first/last key. The header is
/// written first with a zero `index_offset` and patched once the index
/// position is known.
///
/// Everything is staged in a `.sst.tmp` sibling and renamed into place
/// only after the header patch and fsync succeed, so the final name never
/// refers to a half-written file — a crash mid-write leaves only the tmp
/// file behind. The handle closes on every return path.
pub(crate) fn write_table(path: &Path, mut entries: Vec<Entry>) -> Result<(), TableError> {
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    let tmp_path = path.with_extension("sst.tmp");
    let mut file = File::create(&tmp_path).map_err(|e| TableError::io("create_table", e))?;

    let mut header = FileHeader {
        version: VERSION,
        created_at: unix_seconds(),
        entry_count: entries.len() as u32,
        index_offset: 0,
        block_size: BLOCK_SIZE_HINT,
    };
    header
        .write_to(&mut file)
        .map_err(|e| TableError::io("write_header", e))?;

    let mut index: Vec<IndexEntry> = Vec::new();
    let mut offset = FILE_HEADER_BYTES;

    for chunk in entries.chunks(BLOCK_ENTRY_COUNT) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        for entry in chunk {
            let mut line = encode_line(entry)?;
            line.push('\n');
            encoder
                .write_all(line.as_bytes())
                .map_err(|e| TableError::io("compress_block", e))?;
        }
        let compressed = encoder
            .finish()
            .map_err(|e| TableError::io("compress_block", e))?;

        let mut hasher = Crc32::new();
        hasher.update(&compressed);

        let block_header = BlockHeader {
            entry_count: chunk.len() as u32,
            compressed_size: compressed.len() as u32,
            checksum: hasher.finalize(),
            next_block_offset: offset + BLOCK_HEADER_BYTES + compressed.len() as u64,
        };
        block_header
            .write_to(&mut file)
            .map_err(|e| TableError::io("write_block", e))?;
        file.write_all(&compressed)
            .map_err(|e| TableError::io("write_block", e))?;

        index.push(IndexEntry {
            start_key: chunk[0].key.clone(),
            end_key: chunk[chunk.len() - 1].key.clone(),
            block_offset: offset,
        });
        offset = block_header.next_block_offset;
    }

    // The running offset is now the index position; the last block's
    // next_block_offset already equals it (end-of-blocks sentinel).
    header.index_offset = offset;

    file.write_u32::<BigEndian>(index.len() as u32)
        .map_err(|e| TableError::io("write_index", e))?;
    for entry in &index {
        entry
            .write_to(&mut file)
            .map_err(|e| TableError::io("write_index", e))?;
    }

    // Patch the final index offset into the header — the commit point.
    file.seek(SeekFrom::Start(0))
        .map_err(|e| TableError::io("write_header", e))?;
    header
        .write_to(&mut file)
        .map_err(|e| TableError::io("write_header", e))?;

    file.sync_all().map_err(|e| TableError::io("sync_table", e))?;

    // Atomically move into place.
    fs::rename(&tmp_path, path).map_err(|e| TableError::io("rename_table", e))?;
    Ok(())
}

fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
