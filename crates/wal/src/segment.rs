use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use crate::entry::Entry;
use crate::error::WalError;

/// One append-only `.wal` file.
///
/// Records are framed as `[len: u32 BE][record bytes]` and written through
/// a user-space buffer; [`Segment::sync`] flushes the buffer and forces the
/// file to stable storage. All operations serialize under a segment-local
/// mutex, so concurrent callers never interleave bytes.
pub(crate) struct Segment {
    path: PathBuf,
    max_size: u64,
    inner: Mutex<SegmentFile>,
}

struct SegmentFile {
    writer: BufWriter<File>,
    /// Current write offset, counting buffered-but-unflushed bytes.
    offset: u64,
}

impl Segment {
    /// Opens (or creates) a segment file in append mode.
    pub(crate) fn open(path: PathBuf, max_size: u64) -> Result<Segment, WalError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| WalError::io("open_segment", e))?;

        let offset = file
            .metadata()
            .map_err(|e| WalError::io("stat_segment", e))?
            .len();

        Ok(Segment {
            path,
            max_size,
            inner: Mutex::new(SegmentFile {
                writer: BufWriter::new(file),
                offset,
            }),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one length-prefixed record through the write buffer.
    pub(crate) fn append(&self, entry: &Entry) -> Result<(), WalError> {
        let mut file = self.lock();

        let data = entry.encode();
        file.writer
            .write_u32::<BigEndian>(data.len() as u32)
            .map_err(|e| WalError::io("write_size", e))?;
        file.writer
            .write_all(&data)
            .map_err(|e| WalError::io("write_entry", e))?;

        file.offset += 4 + data.len() as u64;
        Ok(())
    }

    /// Flushes the write buffer and fsyncs the file.
    pub(crate) fn sync(&self) -> Result<(), WalError> {
        let mut file = self.lock();
        file.writer.flush().map_err(|e| WalError::io("flush", e))?;
        file.writer
            .get_ref()
            .sync_all()
            .map_err(|e| WalError::io("sync", e))?;
        Ok(())
    }

    pub(crate) fn is_full(&self) -> bool {
        self.lock().offset >= self.max_size
    }

    /// Flushes pending writes; the file handle closes when the segment drops.
    pub(crate) fn close(&self) -> Result<(), WalError> {
        let mut file = self.lock();
        file.writer.flush().map_err(|e| WalError::io("flush", e))?;
        Ok(())
    }

    /// Rewinds and streams every framed record in the segment.
    ///
    /// A clean EOF on a frame boundary terminates successfully; a partial
    /// frame surfaces as an I/O error and a corrupt record propagates its
    /// decode error. The file is opened in append mode, so the rewind does
    /// not disturb subsequent writes.
    pub(crate) fn read_all(&self) -> Result<Vec<Entry>, WalError> {
        let mut file = self.lock();
        file.writer.flush().map_err(|e| WalError::io("flush", e))?;

        let mut handle = file.writer.get_ref();
        handle
            .seek(SeekFrom::Start(0))
            .map_err(|e| WalError::io("seek", e))?;

        let mut reader = BufReader::new(handle);
        let mut entries = Vec::new();
        loop {
            let mut size_buf = [0u8; 4];
            match read_frame(&mut reader, &mut size_buf) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => return Err(WalError::io("read_size", e)),
            }
            let size = BigEndian::read_u32(&size_buf) as usize;

            let mut data = vec![0u8; size];
            match read_frame(&mut reader, &mut data) {
                Ok(true) => {}
                Ok(false) => {
                    return Err(WalError::io(
                        "read_entry",
                        io::Error::new(io::ErrorKind::UnexpectedEof, "missing record body"),
                    ))
                }
                Err(e) => return Err(WalError::io("read_entry", e)),
            }

            entries.push(Entry::decode(&data)?);
        }

        Ok(entries)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SegmentFile> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fills `buf` completely, distinguishing a clean EOF (zero bytes read,
/// returns `Ok(false)`) from a partial frame (`UnexpectedEof` error).
fn read_frame<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "partial record frame",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
