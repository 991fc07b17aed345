//! Uniform stream sources for TIFF data
//!
//! A `DataSource` is a lightweight, cloneable locator for the bytes a
//! directory was read from.  Directories keep one of these instead of an
//! open file handle, so the writer can open a fresh reader per source per
//! pass, and so directories read from several files can be concatenated
//! into one output.
//!
//! Unseekable input (stdin) is spilled into an in-memory buffer up front;
//! everything handed out from here is seekable.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::io::seekable::SeekableReader;
use crate::tiff::errors::TiffResult;

/// Locator for the bytes backing a directory's uninterpreted payloads
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A file on disk, reopened read-only on demand
    Path(PathBuf),
    /// An in-memory buffer (stdin spill or caller-supplied bytes)
    Memory(Arc<Vec<u8>>),
}

impl DataSource {
    /// Creates a source from a CLI path argument, with `-` meaning stdin
    ///
    /// Stdin is not seekable, so it is read to the end and kept in memory.
    pub fn from_arg(path: &str) -> TiffResult<Self> {
        if path == "-" {
            let mut buffer = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buffer)?;
            debug!("Spilled {} bytes from stdin", buffer.len());
            Ok(DataSource::Memory(Arc::new(buffer)))
        } else {
            Ok(DataSource::Path(PathBuf::from(path)))
        }
    }

    /// Creates a source over caller-supplied bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        DataSource::Memory(Arc::new(bytes))
    }

    /// Opens a fresh seekable reader over this source
    pub fn open_reader(&self) -> TiffResult<Box<dyn SeekableReader>> {
        match self {
            DataSource::Path(path) => {
                let file = File::open(path)?;
                Ok(Box::new(BufReader::with_capacity(1024 * 1024, file)))
            }
            DataSource::Memory(bytes) => Ok(Box::new(Cursor::new(MemorySlice(bytes.clone())))),
        }
    }

    /// A stable identity string, used to memoize per-source state
    pub fn identity(&self) -> String {
        match self {
            DataSource::Path(path) => format!("path:{}", path.display()),
            DataSource::Memory(bytes) => format!("mem:{:p}", Arc::as_ptr(bytes)),
        }
    }

    /// Human-readable description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            DataSource::Path(path) => path.display().to_string(),
            DataSource::Memory(bytes) => format!("<memory: {} bytes>", bytes.len()),
        }
    }
}

/// Shared byte buffer that a `Cursor` can seek over without copying
struct MemorySlice(Arc<Vec<u8>>);

impl AsRef<[u8]> for MemorySlice {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}
