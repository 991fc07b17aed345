pub mod commands;
pub mod io;
pub mod tiff;
pub mod utils;

pub use crate::io::source::DataSource;
pub use crate::tiff::reader::{read_tiff, read_tiff_source};
pub use crate::tiff::writer::{write_tiff, write_tiff_bytes, WriteOptions};
pub use crate::tiff::{Datatype, Directory, TagData, TagEntry, TiffError, TiffFile, TiffResult};
