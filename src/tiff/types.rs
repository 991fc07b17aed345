//! Core TIFF data structures
//!
//! The in-memory tree a TIFF file materializes into: a `TiffFile` owns a
//! list of `Directory` records, each directory maps tag ids to `TagEntry`
//! values, and an entry's payload is a `TagData` sum type dispatched on
//! the entry's datatype.  Directories keep a back-reference to their
//! source stream so pixel payloads can be copied from the right file at
//! write time, even after concatenation.

use std::collections::BTreeMap;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::io::source::DataSource;
use crate::tiff::constants::Datatype;
use crate::tiff::errors::{TiffError, TiffResult};

/// Decoded tag payload, dispatched by datatype
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    /// Integer types (BYTE..SLONG8, IFD pointers)
    Integers(Vec<i64>),
    /// FLOAT and DOUBLE
    Floats(Vec<f64>),
    /// RATIONAL and SRATIONAL numerator/denominator pairs
    Rationals(Vec<(i64, i64)>),
    /// ASCII, decoded with the trailing NUL stripped
    Ascii(String),
    /// UNDEFINED, or ASCII that failed UTF-8 decoding
    Bytes(Vec<u8>),
}

impl TagData {
    /// Decodes a raw byte run according to a datatype and endianness
    pub fn decode(raw: &[u8], datatype: Datatype, big_endian: bool) -> TagData {
        if big_endian {
            Self::decode_with::<BigEndian>(raw, datatype)
        } else {
            Self::decode_with::<LittleEndian>(raw, datatype)
        }
    }

    fn decode_with<B: ByteOrder>(raw: &[u8], datatype: Datatype) -> TagData {
        let size = datatype.size() as usize;
        match datatype {
            Datatype::Byte => TagData::Integers(raw.iter().map(|b| *b as i64).collect()),
            Datatype::SByte => TagData::Integers(raw.iter().map(|b| *b as i8 as i64).collect()),
            Datatype::Undefined => TagData::Bytes(raw.to_vec()),
            Datatype::Ascii => {
                let trimmed = raw.strip_suffix(&[0]).unwrap_or(raw);
                match std::str::from_utf8(trimmed) {
                    Ok(text) => TagData::Ascii(text.to_string()),
                    Err(_) => TagData::Bytes(raw.to_vec()),
                }
            }
            Datatype::Short => TagData::Integers(
                raw.chunks_exact(size).map(|c| B::read_u16(c) as i64).collect(),
            ),
            Datatype::SShort => TagData::Integers(
                raw.chunks_exact(size).map(|c| B::read_i16(c) as i64).collect(),
            ),
            Datatype::Long | Datatype::Ifd => TagData::Integers(
                raw.chunks_exact(size).map(|c| B::read_u32(c) as i64).collect(),
            ),
            Datatype::SLong => TagData::Integers(
                raw.chunks_exact(size).map(|c| B::read_i32(c) as i64).collect(),
            ),
            Datatype::Long8 | Datatype::Ifd8 => TagData::Integers(
                raw.chunks_exact(size).map(|c| B::read_u64(c) as i64).collect(),
            ),
            Datatype::SLong8 => TagData::Integers(
                raw.chunks_exact(size).map(|c| B::read_i64(c)).collect(),
            ),
            Datatype::Float => TagData::Floats(
                raw.chunks_exact(size).map(|c| B::read_f32(c) as f64).collect(),
            ),
            Datatype::Double => TagData::Floats(
                raw.chunks_exact(size).map(|c| B::read_f64(c)).collect(),
            ),
            Datatype::Rational => TagData::Rationals(
                raw.chunks_exact(size)
                    .map(|c| (B::read_u32(c) as i64, B::read_u32(&c[4..]) as i64))
                    .collect(),
            ),
            Datatype::SRational => TagData::Rationals(
                raw.chunks_exact(size)
                    .map(|c| (B::read_i32(c) as i64, B::read_i32(&c[4..]) as i64))
                    .collect(),
            ),
        }
    }

    /// Encodes the payload for a datatype and endianness
    ///
    /// Fails with a datatype-mismatch error when a value is out of range
    /// for the requested storage.
    pub fn encode(&self, datatype: Datatype, big_endian: bool) -> TiffResult<Vec<u8>> {
        if big_endian {
            self.encode_with::<BigEndian>(datatype)
        } else {
            self.encode_with::<LittleEndian>(datatype)
        }
    }

    fn encode_with<B: ByteOrder>(&self, datatype: Datatype) -> TiffResult<Vec<u8>> {
        fn mismatch(value: impl std::fmt::Display, datatype: Datatype) -> TiffError {
            TiffError::DatatypeMismatch(format!(
                "Value {} cannot be stored as {}",
                value, datatype
            ))
        }

        let mut out = Vec::new();
        match (self, datatype) {
            (TagData::Integers(values), Datatype::Byte) => {
                for &v in values {
                    let b = u8::try_from(v).map_err(|_| mismatch(v, datatype))?;
                    out.push(b);
                }
            }
            (TagData::Integers(values), Datatype::SByte) => {
                for &v in values {
                    let b = i8::try_from(v).map_err(|_| mismatch(v, datatype))?;
                    out.push(b as u8);
                }
            }
            (TagData::Integers(values), Datatype::Short) => {
                for &v in values {
                    let s = u16::try_from(v).map_err(|_| mismatch(v, datatype))?;
                    let mut buf = [0u8; 2];
                    B::write_u16(&mut buf, s);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Integers(values), Datatype::SShort) => {
                for &v in values {
                    let s = i16::try_from(v).map_err(|_| mismatch(v, datatype))?;
                    let mut buf = [0u8; 2];
                    B::write_i16(&mut buf, s);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Integers(values), Datatype::Long | Datatype::Ifd) => {
                for &v in values {
                    let l = u32::try_from(v).map_err(|_| mismatch(v, datatype))?;
                    let mut buf = [0u8; 4];
                    B::write_u32(&mut buf, l);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Integers(values), Datatype::SLong) => {
                for &v in values {
                    let l = i32::try_from(v).map_err(|_| mismatch(v, datatype))?;
                    let mut buf = [0u8; 4];
                    B::write_i32(&mut buf, l);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Integers(values), Datatype::Long8 | Datatype::Ifd8) => {
                for &v in values {
                    let mut buf = [0u8; 8];
                    B::write_u64(&mut buf, v as u64);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Integers(values), Datatype::SLong8) => {
                for &v in values {
                    let mut buf = [0u8; 8];
                    B::write_i64(&mut buf, v);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Integers(values), Datatype::Float) => {
                for &v in values {
                    let mut buf = [0u8; 4];
                    B::write_f32(&mut buf, v as f32);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Integers(values), Datatype::Double) => {
                for &v in values {
                    let mut buf = [0u8; 8];
                    B::write_f64(&mut buf, v as f64);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Floats(values), Datatype::Float) => {
                for &v in values {
                    if v.is_finite() && (v as f32).is_infinite() {
                        return Err(mismatch(v, datatype));
                    }
                    let mut buf = [0u8; 4];
                    B::write_f32(&mut buf, v as f32);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Floats(values), Datatype::Double) => {
                for &v in values {
                    let mut buf = [0u8; 8];
                    B::write_f64(&mut buf, v);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Rationals(values), Datatype::Rational) => {
                for &(num, den) in values {
                    let num = u32::try_from(num).map_err(|_| mismatch(num, datatype))?;
                    let den = u32::try_from(den).map_err(|_| mismatch(den, datatype))?;
                    let mut buf = [0u8; 8];
                    B::write_u32(&mut buf, num);
                    B::write_u32(&mut buf[4..], den);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Rationals(values), Datatype::SRational) => {
                for &(num, den) in values {
                    let num = i32::try_from(num).map_err(|_| mismatch(num, datatype))?;
                    let den = i32::try_from(den).map_err(|_| mismatch(den, datatype))?;
                    let mut buf = [0u8; 8];
                    B::write_i32(&mut buf, num);
                    B::write_i32(&mut buf[4..], den);
                    out.extend_from_slice(&buf);
                }
            }
            (TagData::Ascii(text), Datatype::Ascii) => {
                out.extend_from_slice(text.as_bytes());
                out.push(0);
            }
            (TagData::Bytes(bytes), Datatype::Ascii) => {
                out.extend_from_slice(bytes);
                if bytes.last() != Some(&0) {
                    out.push(0);
                }
            }
            (TagData::Bytes(bytes), Datatype::Undefined | Datatype::Byte) => {
                out.extend_from_slice(bytes);
            }
            (TagData::Ascii(text), Datatype::Undefined) => {
                out.extend_from_slice(text.as_bytes());
            }
            (data, datatype) => {
                return Err(TiffError::DatatypeMismatch(format!(
                    "{} data cannot be stored as {}",
                    data.kind_name(),
                    datatype
                )));
            }
        }
        Ok(out)
    }

    /// Short label for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            TagData::Integers(_) => "integer",
            TagData::Floats(_) => "float",
            TagData::Rationals(_) => "rational",
            TagData::Ascii(_) => "ascii",
            TagData::Bytes(_) => "binary",
        }
    }

    /// Number of elements as counted by the given datatype
    pub fn element_count(&self, datatype: Datatype) -> u64 {
        match self {
            TagData::Integers(values) => values.len() as u64,
            TagData::Floats(values) => values.len() as u64,
            TagData::Rationals(values) => values.len() as u64,
            TagData::Ascii(text) => text.len() as u64 + 1,
            TagData::Bytes(bytes) => {
                if datatype == Datatype::Ascii && bytes.last() != Some(&0) {
                    bytes.len() as u64 + 1
                } else {
                    bytes.len() as u64
                }
            }
        }
    }

    /// Integer view of the payload, when it holds integers
    pub fn integers(&self) -> Option<&[i64]> {
        match self {
            TagData::Integers(values) => Some(values),
            _ => None,
        }
    }

    /// True when the payload holds nothing
    pub fn is_empty(&self) -> bool {
        match self {
            TagData::Integers(values) => values.is_empty(),
            TagData::Floats(values) => values.is_empty(),
            TagData::Rationals(values) => values.is_empty(),
            TagData::Ascii(text) => text.is_empty(),
            TagData::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

/// One tag occurrence inside a directory
#[derive(Debug, Clone)]
pub struct TagEntry {
    /// Datatype recorded in the entry
    pub datatype: Datatype,
    /// Element count recorded in the entry
    pub count: u64,
    /// File position of the entry's value slot in the source
    pub data_pos: u64,
    /// External value offset, when the value did not fit the slot
    pub offset: Option<u64>,
    /// Decoded payload
    pub data: TagData,
    /// Child directory chains for SubIFD-style tags; the outer list lets
    /// one tag hold several independent chains
    pub ifds: Option<Vec<Vec<Directory>>>,
}

impl TagEntry {
    /// Creates a synthetic entry, as the set transform does
    pub fn new(datatype: Datatype, data: TagData) -> Self {
        let count = data.element_count(datatype);
        TagEntry {
            datatype,
            count,
            data_pos: 0,
            offset: None,
            data,
            ifds: None,
        }
    }
}

/// An Image File Directory and its source provenance
///
/// A directory does not own its raw pixel payloads; those remain in the
/// source stream and are copied from it at write time.
#[derive(Debug, Clone)]
pub struct Directory {
    /// Byte offset of this directory in its source
    pub offset: u64,
    /// Entry count as stored in the source
    pub tag_count: u64,
    /// Entries keyed (and therefore iterated) by ascending tag id
    pub tags: BTreeMap<u16, TagEntry>,
    /// Where this directory's bytes live
    pub source: DataSource,
    /// Total length of the source stream
    pub size: u64,
    /// Endianness of the source
    pub big_endian: bool,
    /// Whether the source was BigTIFF
    pub bigtiff: bool,
}

impl Directory {
    pub fn new(source: DataSource, size: u64, big_endian: bool, bigtiff: bool, offset: u64) -> Self {
        Directory {
            offset,
            tag_count: 0,
            tags: BTreeMap::new(),
            source,
            size,
            big_endian,
            bigtiff,
        }
    }

    /// Looks up an entry by tag id
    pub fn entry(&self, tag: u16) -> Option<&TagEntry> {
        self.tags.get(&tag)
    }

    /// True if the directory carries the tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tags.contains_key(&tag)
    }
}

/// A parsed TIFF file: header facts plus the top-level directory chain
#[derive(Debug, Clone)]
pub struct TiffFile {
    /// The four header bytes
    pub header: [u8; 4],
    /// True for MM byte order
    pub big_endian: bool,
    /// True for the 0x2B BigTIFF dialect
    pub bigtiff: bool,
    /// Hamamatsu NDPI mode: classic header hiding 64-bit offsets
    pub ndpi: bool,
    /// Offset of the first directory
    pub first_ifd: u64,
    /// Total stream length
    pub size: u64,
    /// Top-level directories in chain order
    pub ifds: Vec<Directory>,
    /// The stream the file was read from
    pub source: DataSource,
    /// Path-suffix components applied to reduce the view, if any
    pub reduction: Option<Vec<String>>,
}
