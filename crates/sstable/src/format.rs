use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Current file format version.
pub const VERSION: u32 = 1;
/// Fixed file header size: version + created_at + entry_count + index_offset + block_size.
pub const FILE_HEADER_BYTES: u64 = 4 + 8 + 4 + 8 + 4;
/// Fixed block header size: entry_count + compressed_size + checksum + next_block_offset.
pub const BLOCK_HEADER_BYTES: u64 = 4 + 4 + 4 + 8;
/// Authoritative grouping: entries per block (the final block may be short).
pub const BLOCK_ENTRY_COUNT: usize = 100;
/// Informational target block size recorded in the header.
pub const BLOCK_SIZE_HINT: u32 = 4096;

/// Fixed-size header at the start of every table file.
///
/// `index_offset` is written as zero first and patched in once the blocks
/// are on disk, just before the staged file is renamed into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    /// Seconds since the UNIX epoch at creation time.
    pub created_at: i64,
    pub entry_count: u32,
    pub index_offset: u64,
    pub block_size: u32,
}

impl FileHeader {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.version)?;
        w.write_i64::<BigEndian>(self.created_at)?;
        w.write_u32::<BigEndian>(self.entry_count)?;
        w.write_u64::<BigEndian>(self.index_offset)?;
        w.write_u32::<BigEndian>(self.block_size)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<FileHeader> {
        Ok(FileHeader {
            version: r.read_u32::<BigEndian>()?,
            created_at: r.read_i64::<BigEndian>()?,
            entry_count: r.read_u32::<BigEndian>()?,
            index_offset: r.read_u64::<BigEndian>()?,
            block_size: r.read_u32::<BigEndian>()?,
        })
    }
}

/// Header preceding each compressed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub entry_count: u32,
    pub compressed_size: u32,
    /// CRC32 (IEEE) over the compressed payload.
    pub checksum: u32,
    /// File offset of the following block header; for the last block this
    /// equals the index offset (end-of-blocks sentinel).
    pub next_block_offset: u64,
}

impl BlockHeader {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.entry_count)?;
        w.write_u32::<BigEndian>(self.compressed_size)?;
        w.write_u32::<BigEndian>(self.checksum)?;
        w.write_u64::<BigEndian>(self.next_block_offset)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<BlockHeader> {
        Ok(BlockHeader {
            entry_count: r.read_u32::<BigEndian>()?,
            compressed_size: r.read_u32::<BigEndian>()?,
            checksum: r.read_u32::<BigEndian>()?,
            next_block_offset: r.read_u64::<BigEndian>()?,
        })
    }
}

/// One sparse-index record: the exact `[start_key, end_key]` range of a
/// block and the file offset of its header. Ranges never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub start_key: String,
    pub end_key: String,
    pub block_offset: u64,
}

impl IndexEntry {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.start_key.len() as u32)?;
        w.write_all(self.start_key.as_bytes())?;
        w.write_u32::<BigEndian>(self.end_key.len() as u32)?;
        w.write_all(self.end_key.as_bytes())?;
        w.write_u64::<BigEndian>(self.block_offset)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<IndexEntry> {
        let start_key = read_key(r)?;
        let end_key = read_key(r)?;
        let block_offset = r.read_u64::<BigEndian>()?;
        Ok(IndexEntry {
            start_key,
            end_key,
            block_offset,
        })
    }
}

fn read_key<R: Read>(r: &mut R) -> io::Result<String> {
    let len = r.read_u32::<BigEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("non-utf8 index key: {}", e)))
}
