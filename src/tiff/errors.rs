//! Custom error types for TIFF processing

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// First four bytes do not match any recognized TIFF magic
    UnknownHeader,
    /// An entry references a datatype id not in the registry
    UnknownDatatype(u16),
    /// A tag name or number could not be resolved and creation is disallowed
    UnknownTag(String),
    /// A value cannot be packed into the requested or inferred datatype
    DatatypeMismatch(String),
    /// An offset-bearing tag's partner byte-count tag has a different element count
    OffsetsAndCountsMismatch(usize, usize),
    /// A classic-TIFF write needs 64-bit storage; the writer retries as BigTIFF
    MustBeBigTiff,
    /// Destination exists and overwriting was not allowed
    FileAlreadyExists(String),
    /// A warning escalated to an error by --stop-on-warning
    EscalatedWarning(String),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::UnknownHeader => write!(f, "Not a known TIFF header"),
            TiffError::UnknownDatatype(dt) => write!(f, "Unknown datatype {} (0x{:X})", dt, dt),
            TiffError::UnknownTag(tag) => write!(f, "Unknown tag {}", tag),
            TiffError::DatatypeMismatch(msg) => write!(f, "{}", msg),
            TiffError::OffsetsAndCountsMismatch(offsets, counts) => write!(
                f,
                "Offsets and byte counts do not correspond ({} vs {})",
                offsets, counts
            ),
            TiffError::MustBeBigTiff => write!(f, "Output requires BigTIFF format"),
            TiffError::FileAlreadyExists(path) => write!(f, "File already exists: {}", path),
            TiffError::EscalatedWarning(msg) => write!(f, "{}", msg),
            TiffError::GenericError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TiffError {}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

impl From<serde_json::Error> for TiffError {
    fn from(error: serde_json::Error) -> Self {
        TiffError::GenericError(format!("JSON error: {}", error))
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

static STOP_ON_WARNING: AtomicBool = AtomicBool::new(false);

/// Makes subsequent [`warning`] calls fail instead of logging
///
/// Set once at command startup from the --stop-on-warning flag.
pub fn set_stop_on_warning(enabled: bool) {
    STOP_ON_WARNING.store(enabled, Ordering::Relaxed);
}

/// Reports a repairable data-integrity problem
///
/// In the default mode this logs through the `log` crate and lets the
/// caller proceed with its local repair.  Under --stop-on-warning the
/// warning is returned as an error so the operation fails fast.
pub fn warning(message: String) -> TiffResult<()> {
    if STOP_ON_WARNING.load(Ordering::Relaxed) {
        Err(TiffError::EscalatedWarning(message))
    } else {
        warn!("{}", message);
        Ok(())
    }
}
