//! TIFF container engine
//!
//! This module provides the typed tag/IFD data model, the reader and
//! writer for TIFF and BigTIFF files, the constants registry, and the
//! GeoTIFF key codec.

pub mod constants;
pub mod errors;
pub mod geokeys;
pub mod jpeg_quality;
pub mod reader;
pub mod types;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use constants::{get_or_create_tag, Datatype, Tag, TagDef, TagSet, TagSetKind};
pub use errors::{TiffError, TiffResult};
pub use reader::{read_tiff, read_tiff_source, split_path_spec};
pub use types::{Directory, TagData, TagEntry, TiffFile};
pub use writer::{write_tiff, write_tiff_bytes, WriteOptions};
