//! TIFF constants registry
//!
//! Declarative tables of datatypes, tags, enums and bitfields, with
//! constant-time lookup in both directions (id and name).  Keys are
//! "textual-or-numeric": a key resolves as an integer (decimal or 0x-hex),
//! then case-insensitively against names and aliases.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use crate::tiff::errors::{TiffError, TiffResult};

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// BigTIFF version number (43)
    pub const BIG_TIFF_VERSION: u16 = 43;

    /// BigTIFF offset size (8 bytes)
    pub const BIGTIFF_OFFSET_SIZE: u16 = 8;
}

/// Field datatypes as defined in the TIFF and BigTIFF specs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// UINT8 - unsigned byte
    Byte,
    /// Null-terminated string
    Ascii,
    /// UINT16 - unsigned short
    Short,
    /// UINT32 - unsigned long
    Long,
    /// Two UINT32 forming a numerator and a denominator
    Rational,
    /// INT8 - signed byte
    SByte,
    /// Arbitrary binary data
    Undefined,
    /// INT16 - signed short
    SShort,
    /// INT32 - signed long
    SLong,
    /// Two INT32 forming a numerator and a denominator
    SRational,
    /// IEEE-754 single-precision float
    Float,
    /// IEEE-754 double-precision float
    Double,
    /// UINT32 with the location of an Image File Directory
    Ifd,
    /// UINT64 - unsigned long long
    Long8,
    /// INT64 - signed long long
    SLong8,
    /// UINT64 with the location of an Image File Directory
    Ifd8,
}

impl Datatype {
    /// All recognized datatypes in ascending code order
    pub const ALL: [Datatype; 16] = [
        Datatype::Byte,
        Datatype::Ascii,
        Datatype::Short,
        Datatype::Long,
        Datatype::Rational,
        Datatype::SByte,
        Datatype::Undefined,
        Datatype::SShort,
        Datatype::SLong,
        Datatype::SRational,
        Datatype::Float,
        Datatype::Double,
        Datatype::Ifd,
        Datatype::Long8,
        Datatype::SLong8,
        Datatype::Ifd8,
    ];

    /// Resolves a wire code into a datatype
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Datatype::Byte),
            2 => Some(Datatype::Ascii),
            3 => Some(Datatype::Short),
            4 => Some(Datatype::Long),
            5 => Some(Datatype::Rational),
            6 => Some(Datatype::SByte),
            7 => Some(Datatype::Undefined),
            8 => Some(Datatype::SShort),
            9 => Some(Datatype::SLong),
            10 => Some(Datatype::SRational),
            11 => Some(Datatype::Float),
            12 => Some(Datatype::Double),
            13 => Some(Datatype::Ifd),
            16 => Some(Datatype::Long8),
            17 => Some(Datatype::SLong8),
            18 => Some(Datatype::Ifd8),
            _ => None,
        }
    }

    /// The numeric code stored in an IFD entry
    pub fn code(&self) -> u16 {
        match self {
            Datatype::Byte => 1,
            Datatype::Ascii => 2,
            Datatype::Short => 3,
            Datatype::Long => 4,
            Datatype::Rational => 5,
            Datatype::SByte => 6,
            Datatype::Undefined => 7,
            Datatype::SShort => 8,
            Datatype::SLong => 9,
            Datatype::SRational => 10,
            Datatype::Float => 11,
            Datatype::Double => 12,
            Datatype::Ifd => 13,
            Datatype::Long8 => 16,
            Datatype::SLong8 => 17,
            Datatype::Ifd8 => 18,
        }
    }

    /// Symbolic name, matching the TIFF specification
    pub fn name(&self) -> &'static str {
        match self {
            Datatype::Byte => "BYTE",
            Datatype::Ascii => "ASCII",
            Datatype::Short => "SHORT",
            Datatype::Long => "LONG",
            Datatype::Rational => "RATIONAL",
            Datatype::SByte => "SBYTE",
            Datatype::Undefined => "UNDEFINED",
            Datatype::SShort => "SSHORT",
            Datatype::SLong => "SLONG",
            Datatype::SRational => "SRATIONAL",
            Datatype::Float => "FLOAT",
            Datatype::Double => "DOUBLE",
            Datatype::Ifd => "IFD",
            Datatype::Long8 => "LONG8",
            Datatype::SLong8 => "SLONG8",
            Datatype::Ifd8 => "IFD8",
        }
    }

    /// Size of one element in bytes
    ///
    /// A rational counts as a single element of width 8.
    pub fn size(&self) -> u64 {
        match self {
            Datatype::Byte | Datatype::Ascii | Datatype::SByte | Datatype::Undefined => 1,
            Datatype::Short | Datatype::SShort => 2,
            Datatype::Long | Datatype::SLong | Datatype::Float | Datatype::Ifd => 4,
            Datatype::Rational
            | Datatype::SRational
            | Datatype::Double
            | Datatype::Long8
            | Datatype::SLong8
            | Datatype::Ifd8 => 8,
        }
    }

    /// True for the pointer types whose value locates another directory
    pub fn is_ifd(&self) -> bool {
        matches!(self, Datatype::Ifd | Datatype::Ifd8)
    }

    /// Resolves a textual-or-numeric key (e.g. "SHORT", "3", "0x3")
    pub fn from_key(key: &str) -> Option<Self> {
        if let Some(value) = parse_int_key(key) {
            if (0..=u16::MAX as i64).contains(&value) {
                return Datatype::from_code(value as u16);
            }
            return None;
        }
        let upper = key.trim().to_uppercase();
        if upper == "DWORD" {
            return Some(Datatype::Long);
        }
        Datatype::ALL.iter().copied().find(|dt| dt.name() == upper)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parses a key as an integer, accepting decimal and 0x-prefixed hex
pub fn parse_int_key(key: &str) -> Option<i64> {
    let key = key.trim();
    if let Ok(value) = key.parse::<i64>() {
        return Some(value);
    }
    let hex = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X"))?;
    i64::from_str_radix(hex, 16).ok()
}

/// A named value inside an enum or bitfield vocabulary
#[derive(Debug, Clone, Copy)]
pub struct ValueDef {
    pub value: u64,
    pub name: &'static str,
    pub altnames: &'static [&'static str],
}

/// An enum or bitfield vocabulary attached to a tag definition
#[derive(Debug)]
pub struct ValueSet {
    pub name: &'static str,
    pub entries: &'static [ValueDef],
}

impl ValueSet {
    /// Looks up the symbolic name for a value
    pub fn name_for(&self, value: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.name)
    }

    /// True if the value is a member of the vocabulary
    pub fn contains(&self, value: u64) -> bool {
        self.entries.iter().any(|entry| entry.value == value)
    }

    /// Names of all bitfield members present in a value
    pub fn bit_names(&self, value: u64) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|entry| value & entry.value == entry.value && entry.value != 0)
            .map(|entry| entry.name)
            .collect()
    }

    /// Resolves a textual-or-numeric key against the vocabulary
    pub fn find(&self, key: &str) -> Option<&'static ValueDef> {
        if let Some(value) = parse_int_key(key) {
            if value >= 0 {
                return self.entries.iter().find(|entry| entry.value == value as u64);
            }
            return None;
        }
        let upper = key.trim().to_uppercase();
        self.entries.iter().find(|entry| {
            entry.name.to_uppercase() == upper
                || entry.altnames.iter().any(|alt| alt.to_uppercase() == upper)
        })
    }
}

macro_rules! values {
    ($($value:expr => $name:expr $(; $alt:expr)*),* $(,)?) => {
        &[$(ValueDef { value: $value, name: $name, altnames: &[$($alt),*] }),*]
    };
}

pub static NEW_SUBFILE_TYPE: ValueSet = ValueSet {
    name: "NewSubfileType",
    entries: values![
        1 => "ReducedImage",
        2 => "Page",
        4 => "Mask",
        8 => "Macro",
        16 => "MRC",
    ],
};

pub static OLD_SUBFILE_TYPE: ValueSet = ValueSet {
    name: "OldSubfileType",
    entries: values![
        1 => "Image",
        2 => "ReducedImage",
        3 => "Page",
    ],
};

pub static COMPRESSION: ValueSet = ValueSet {
    name: "Compression",
    entries: values![
        1 => "None",
        2 => "CCITTRLE",
        3 => "CCITT_T4"; "CCITTFAX3",
        4 => "CCITT_T6"; "CCITTFAX4",
        5 => "LZW",
        6 => "OldJPEG"; "OJPEG",
        7 => "JPEG",
        8 => "AdobeDeflate",
        9 => "T85",
        10 => "T43",
        32766 => "NeXT",
        32771 => "CCITTRLEW",
        32773 => "Packbits",
        32809 => "Thunderscan",
        32895 => "IT8CTPad",
        32896 => "IT8LW",
        32897 => "IT8MP",
        32898 => "IT8BL",
        32908 => "PixarFilm",
        32909 => "PixarLog",
        32946 => "Deflate",
        32947 => "DCS",
        33003 => "JP2kYCbCr",
        33004 => "JP2kLossy",
        33005 => "JP2kRGB",
        34661 => "JBIG",
        34676 => "SGILOG",
        34677 => "SGILOG24",
        34712 => "JP2000",
        34887 => "LERC",
        34925 => "LZMA",
        50000 => "ZSTD",
        50001 => "WEBP",
        50002 => "JXL",
    ],
};

pub static PHOTOMETRIC: ValueSet = ValueSet {
    name: "Photometric",
    entries: values![
        0 => "MinIsWhite",
        1 => "MinIsBlack",
        2 => "RGB",
        3 => "Palette",
        4 => "Mask",
        5 => "Separated",
        6 => "YCbCr",
        8 => "CIELab",
        9 => "ICCLab",
        10 => "ITULab",
        32803 => "CFA",
        32844 => "LogL",
        32845 => "LogLuv",
    ],
};

pub static THRESHOLDING: ValueSet = ValueSet {
    name: "Thresholding",
    entries: values![
        1 => "Bilevel",
        2 => "Halftone",
        3 => "ErrorDiffuse",
    ],
};

pub static FILL_ORDER: ValueSet = ValueSet {
    name: "FillOrder",
    entries: values![
        1 => "MSBToLSB"; "MSB2LSB",
        2 => "LSBToMSB"; "LSB2MSB",
    ],
};

pub static ORIENTATION: ValueSet = ValueSet {
    name: "Orientation",
    entries: values![
        1 => "TopLeft",
        2 => "TopRight",
        3 => "BottomRight"; "BotRight",
        4 => "BottomLeft"; "BotLeft",
        5 => "LeftTop",
        6 => "RightTop",
        7 => "RightBottom"; "RightBot",
        8 => "LeftBottom"; "LeftBot",
    ],
};

pub static PLANAR_CONFIG: ValueSet = ValueSet {
    name: "PlanarConfig",
    entries: values![
        1 => "Chunky"; "Contig"; "Continuous",
        2 => "Planar"; "Separate",
    ],
};

pub static T4_OPTIONS: ValueSet = ValueSet {
    name: "T4Options",
    entries: values![
        1 => "2DEncoding",
        2 => "Uncompressed",
        4 => "FillBits",
    ],
};

pub static T6_OPTIONS: ValueSet = ValueSet {
    name: "T6Options",
    entries: values![
        2 => "Uncompressed",
    ],
};

pub static RESOLUTION_UNIT: ValueSet = ValueSet {
    name: "ResolutionUnit",
    entries: values![
        1 => "None",
        2 => "Inch"; "in"; "inches",
        3 => "Centimeter"; "cm",
    ],
};

pub static PREDICTOR: ValueSet = ValueSet {
    name: "Predictor",
    entries: values![
        1 => "None",
        2 => "Horizontal",
        3 => "FloatingPoint",
    ],
};

pub static CLEAN_FAX_DATA: ValueSet = ValueSet {
    name: "CleanFaxData",
    entries: values![
        0 => "All"; "Clean",
        1 => "Regenerated"; "Unclean",
        2 => "Present",
    ],
};

pub static INK_SET: ValueSet = ValueSet {
    name: "InkSet",
    entries: values![
        1 => "CMYK",
        2 => "NotCMYK"; "MultiInk",
    ],
};

pub static EXTRA_SAMPLES: ValueSet = ValueSet {
    name: "ExtraSamples",
    entries: values![
        0 => "Unspecified",
        1 => "AssociatedAlpha"; "AssocAlpha",
        2 => "UnassociatedAlpha"; "UnassAlpha",
    ],
};

pub static SAMPLE_FORMAT: ValueSet = ValueSet {
    name: "SampleFormat",
    entries: values![
        1 => "uint"; "UnsignedInteger",
        2 => "int",
        3 => "float"; "IEEEFP",
        4 => "Undefined"; "Void",
        5 => "ComplexInt",
        6 => "ComplexFloat"; "ComplexIEEEFP",
    ],
};

pub static INDEXED: ValueSet = ValueSet {
    name: "Indexed",
    entries: values![
        0 => "NotIndexed",
        1 => "Indexed",
    ],
};

pub static JPEG_PROC: ValueSet = ValueSet {
    name: "JPEGProc",
    entries: values![
        1 => "Baseline"; "Quant",
        2 => "LosslessHuffman"; "Huff",
    ],
};

pub static JPEG_LOSSLESS_PREDICTORS: ValueSet = ValueSet {
    name: "JPEGLosslessPredictors",
    entries: values![
        1 => "A",
        2 => "B",
        3 => "C",
        4 => "AplusBminusC",
        5 => "AplusHalfBminusC",
        6 => "BplusHalfAminusC",
        7 => "HalfAplusB",
    ],
};

pub static YCBCR_POSITIONING: ValueSet = ValueSet {
    name: "YCbCrPositioning",
    entries: values![
        1 => "Centered",
        2 => "Cosited",
    ],
};

/// How an offset-bearing tag learns the length of each payload block
#[derive(Debug, Clone, Copy)]
pub enum Bytecounts {
    /// Name of the companion length tag (e.g. StripByteCounts)
    Tag(&'static str),
    /// Literal byte count per element
    Fixed(u64),
}

/// Which vocabulary a tag set draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSetKind {
    Tag,
    Exif,
    Gps,
    Interop,
    GeoKey,
}

impl TagSetKind {
    pub fn name(&self) -> &'static str {
        match self {
            TagSetKind::Tag => "Tag",
            TagSetKind::Exif => "EXIF",
            TagSetKind::Gps => "GPS",
            TagSetKind::Interop => "Interoperability",
            TagSetKind::GeoKey => "GeoKey",
        }
    }
}

/// Static definition of one tag in a vocabulary
#[derive(Debug, Clone, Copy)]
pub struct TagDef {
    pub value: u32,
    pub name: &'static str,
    pub altnames: &'static [&'static str],
    /// Accepted datatypes, most specific first; empty when unspecified
    pub datatypes: &'static [Datatype],
    /// Expected element count, when the tag fixes one
    pub count: Option<u64>,
    /// Companion byte-count information for offset-bearing tags
    pub bytecounts: Option<Bytecounts>,
    /// Enum vocabulary mapping values to symbols
    pub enum_set: Option<&'static ValueSet>,
    /// Bitfield vocabulary
    pub bitfield: Option<&'static ValueSet>,
    /// Nested tag set used when recursing through this tag's directories
    pub tag_set: Option<TagSetKind>,
    /// Hamamatsu marker: this tag carries the high 32 bits of wrapped offsets
    pub ndpi_offset: bool,
}

impl TagDef {
    pub const EMPTY: TagDef = TagDef {
        value: 0,
        name: "",
        altnames: &[],
        datatypes: &[],
        count: None,
        bytecounts: None,
        enum_set: None,
        bitfield: None,
        tag_set: None,
        ndpi_offset: false,
    };

    /// True when any accepted datatype is an IFD pointer
    pub fn is_ifd(&self) -> bool {
        self.datatypes.iter().any(|dt| dt.is_ifd())
    }

    /// True when the tag's data is an array of payload offsets
    pub fn is_offset_data(&self) -> bool {
        self.bytecounts.is_some()
    }
}

macro_rules! tag_def {
    ($value:expr, $name:expr) => {
        TagDef { value: $value, name: $name, ..TagDef::EMPTY }
    };
    ($value:expr, $name:expr, { $($field:ident : $fv:expr),* $(,)? }) => {
        TagDef { value: $value, name: $name, $($field: $fv,)* ..TagDef::EMPTY }
    };
}

use Datatype::*;

/// The main TIFF tag vocabulary
pub static TAG_DEFS: &[TagDef] = &[
    tag_def!(254, "NewSubfileType", { altnames: &["SubfileType", "OSubFileType"], datatypes: &[Long], count: Some(1), bitfield: Some(&NEW_SUBFILE_TYPE) }),
    tag_def!(255, "OldSubfileType", { datatypes: &[Short], count: Some(1), enum_set: Some(&OLD_SUBFILE_TYPE) }),
    tag_def!(256, "ImageWidth", { datatypes: &[Short, Long], count: Some(1) }),
    tag_def!(257, "ImageLength", { altnames: &["ImageHeight"], datatypes: &[Short, Long], count: Some(1) }),
    tag_def!(258, "BitsPerSample", { datatypes: &[Short] }),
    tag_def!(259, "Compression", { datatypes: &[Short], count: Some(1), enum_set: Some(&COMPRESSION) }),
    tag_def!(262, "Photometric", { altnames: &["PhotometricInterpretation"], datatypes: &[Short], count: Some(1), enum_set: Some(&PHOTOMETRIC) }),
    tag_def!(263, "Threshholding", { datatypes: &[Short], count: Some(1), enum_set: Some(&THRESHOLDING) }),
    tag_def!(264, "CellWidth", { datatypes: &[Short], count: Some(1) }),
    tag_def!(265, "CellLength", { altnames: &["CellHeight"], datatypes: &[Short], count: Some(1) }),
    tag_def!(266, "FillOrder", { datatypes: &[Short], count: Some(1), enum_set: Some(&FILL_ORDER) }),
    tag_def!(269, "DocumentName", { datatypes: &[Ascii] }),
    tag_def!(270, "ImageDescription", { datatypes: &[Ascii] }),
    tag_def!(271, "Make", { datatypes: &[Ascii] }),
    tag_def!(272, "Model", { datatypes: &[Ascii] }),
    tag_def!(273, "StripOffsets", { datatypes: &[Short, Long, Long8], bytecounts: Some(Bytecounts::Tag("StripByteCounts")) }),
    tag_def!(274, "Orientation", { datatypes: &[Short], count: Some(1), enum_set: Some(&ORIENTATION) }),
    tag_def!(277, "SamplesPerPixel", { datatypes: &[Short], count: Some(1) }),
    tag_def!(278, "RowsPerStrip", { datatypes: &[Short, Long], count: Some(1) }),
    tag_def!(279, "StripByteCounts", { datatypes: &[Short, Long, Long8] }),
    tag_def!(280, "MinSampleValue", { datatypes: &[Short] }),
    tag_def!(281, "MaxSampleValue", { datatypes: &[Short] }),
    tag_def!(282, "XResolution", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(283, "YResolution", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(284, "PlanarConfig", { datatypes: &[Short], count: Some(1), enum_set: Some(&PLANAR_CONFIG) }),
    tag_def!(285, "PageName", { datatypes: &[Ascii] }),
    tag_def!(286, "Xposition", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(287, "Yposition", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(288, "FreeOffsets", { datatypes: &[Long, Long8], bytecounts: Some(Bytecounts::Tag("FreeByteCounts")) }),
    tag_def!(289, "FreeByteCounts", { datatypes: &[Long, Long8] }),
    tag_def!(290, "GrayResponseUnit", { altnames: &["GreyResponseUnit"], datatypes: &[Short], count: Some(1) }),
    tag_def!(291, "GrayResponseCurve", { altnames: &["GreyResponseCurve"], datatypes: &[Short] }),
    tag_def!(292, "T4Options", { altnames: &["Group3Options"], datatypes: &[Long], count: Some(1), bitfield: Some(&T4_OPTIONS) }),
    tag_def!(293, "T6Options", { altnames: &["Group4Options"], datatypes: &[Long], count: Some(1), bitfield: Some(&T6_OPTIONS) }),
    tag_def!(296, "ResolutionUnit", { datatypes: &[Short], count: Some(1), enum_set: Some(&RESOLUTION_UNIT) }),
    tag_def!(297, "PageNumber", { datatypes: &[Short], count: Some(2) }),
    tag_def!(300, "ColorResponseUnit", { datatypes: &[Short], count: Some(1) }),
    tag_def!(301, "TransferFunction", { datatypes: &[Short] }),
    tag_def!(305, "Software", { datatypes: &[Ascii] }),
    tag_def!(306, "DateTime", { datatypes: &[Ascii], count: Some(20) }),
    tag_def!(315, "Artist", { datatypes: &[Ascii] }),
    tag_def!(316, "HostComputer", { datatypes: &[Ascii] }),
    tag_def!(317, "Predictor", { datatypes: &[Short], count: Some(1), enum_set: Some(&PREDICTOR) }),
    tag_def!(318, "WhitePoint", { datatypes: &[Rational], count: Some(2) }),
    tag_def!(319, "PrimaryChromaticities", { datatypes: &[Rational], count: Some(6) }),
    tag_def!(320, "ColorMap", { datatypes: &[Short] }),
    tag_def!(321, "HalftoneHints", { datatypes: &[Short], count: Some(2) }),
    tag_def!(322, "TileWidth", { datatypes: &[Short, Long] }),
    tag_def!(323, "TileLength", { altnames: &["TileHeight"], datatypes: &[Short, Long] }),
    tag_def!(324, "TileOffsets", { datatypes: &[Long, Long8], bytecounts: Some(Bytecounts::Tag("TileByteCounts")) }),
    tag_def!(325, "TileByteCounts", { datatypes: &[Long, Long8] }),
    tag_def!(326, "BadFaxLines", { datatypes: &[Short, Long] }),
    tag_def!(327, "CleanFaxData", { datatypes: &[Short], count: Some(1), enum_set: Some(&CLEAN_FAX_DATA) }),
    tag_def!(328, "ConsecutiveBadFaxLines", { datatypes: &[Short, Long] }),
    tag_def!(330, "SubIFD", { datatypes: &[Ifd, Ifd8], tag_set: Some(TagSetKind::Tag) }),
    tag_def!(332, "InkSet", { datatypes: &[Short], count: Some(1), enum_set: Some(&INK_SET) }),
    tag_def!(333, "InkNames", { datatypes: &[Ascii] }),
    tag_def!(334, "NumberOfInks", { datatypes: &[Short], count: Some(1) }),
    tag_def!(336, "DotRange", { datatypes: &[Byte, Short] }),
    tag_def!(337, "TargetPrinter", { datatypes: &[Ascii] }),
    tag_def!(338, "ExtraSamples", { datatypes: &[Short], count: Some(1), enum_set: Some(&EXTRA_SAMPLES) }),
    tag_def!(339, "SampleFormat", { datatypes: &[Short], enum_set: Some(&SAMPLE_FORMAT) }),
    tag_def!(340, "SMinSampleValue"),
    tag_def!(341, "SMaxSampleValue"),
    tag_def!(343, "ClipPath", { datatypes: &[Byte] }),
    tag_def!(344, "XClipPathUnits", { datatypes: &[Long] }),
    tag_def!(345, "YClipPathUnits", { datatypes: &[Long] }),
    tag_def!(346, "Indexed", { datatypes: &[Short], enum_set: Some(&INDEXED) }),
    tag_def!(347, "JPEGTables", { datatypes: &[Undefined] }),
    tag_def!(351, "OpiProxy"),
    tag_def!(400, "GlobalParametersIFD", { datatypes: &[Ifd, Ifd8], tag_set: Some(TagSetKind::Tag) }),
    tag_def!(401, "ProfileType"),
    tag_def!(402, "FaxProfile"),
    tag_def!(403, "CodingMethods"),
    tag_def!(404, "VersionYear"),
    tag_def!(405, "ModeNumber"),
    tag_def!(433, "Decode"),
    tag_def!(434, "ImageBaseColor"),
    tag_def!(435, "T82Options"),
    tag_def!(512, "JPEGProc", { datatypes: &[Short], count: Some(1), enum_set: Some(&JPEG_PROC) }),
    tag_def!(513, "JPEGIFOffset", { datatypes: &[Long, Long8], count: Some(1), bytecounts: Some(Bytecounts::Tag("JPEGIFByteCount")) }),
    tag_def!(514, "JPEGIFByteCount", { datatypes: &[Long, Long8], count: Some(1) }),
    tag_def!(515, "JPEGRestartInterval", { datatypes: &[Short], count: Some(1) }),
    tag_def!(517, "JPEGLosslessPredictors", { datatypes: &[Short], enum_set: Some(&JPEG_LOSSLESS_PREDICTORS) }),
    tag_def!(518, "JPEGPointTransform", { datatypes: &[Short] }),
    tag_def!(519, "JPEGQTables", { datatypes: &[Long, Long8], bytecounts: Some(Bytecounts::Fixed(64)) }),
    tag_def!(520, "JPEGDCTables", { datatypes: &[Long, Long8], bytecounts: Some(Bytecounts::Fixed(16 + 17)) }),
    tag_def!(521, "JPEGACTables", { datatypes: &[Long, Long8], bytecounts: Some(Bytecounts::Fixed(16 + 256)) }),
    tag_def!(529, "YCbCrCoefficients", { datatypes: &[Rational], count: Some(3) }),
    tag_def!(530, "YCbCrSubsampling", { datatypes: &[Short], count: Some(2) }),
    tag_def!(531, "YCbCrPositioning", { datatypes: &[Short], count: Some(1), enum_set: Some(&YCBCR_POSITIONING) }),
    tag_def!(532, "ReferenceBlackWhite", { datatypes: &[Rational], count: Some(6) }),
    tag_def!(559, "StripRowCounts", { datatypes: &[Long] }),
    tag_def!(700, "XMLPacket"),
    tag_def!(32781, "OPIImageID"),
    tag_def!(32932, "WangAnnotation", { altnames: &["TiffAnnotationData"] }),
    tag_def!(32953, "RefPts"),
    tag_def!(32954, "RegionTackPoint"),
    tag_def!(32955, "RegionWarpCorners"),
    tag_def!(32956, "RegionAffine"),
    tag_def!(32995, "Matteing"),
    tag_def!(32996, "Datatype"),
    tag_def!(32997, "ImageDepth"),
    tag_def!(32998, "TileDepth"),
    tag_def!(33300, "PIXAR_ImageFullWidth"),
    tag_def!(33301, "PIXAR_ImageFullLength", { altnames: &["PIXAR_ImageFullHeight"] }),
    tag_def!(33302, "PIXAR_TextureFormat"),
    tag_def!(33303, "PIXAR_WrapModes"),
    tag_def!(33304, "PIXAR_FovCot"),
    tag_def!(33305, "PIXAR_Matrix_WorldToScreen"),
    tag_def!(33306, "PIXAR_Matrix_WorldToCamera"),
    tag_def!(33405, "WriterSerialNumber"),
    tag_def!(33421, "CFARepeatPatternDim"),
    tag_def!(33422, "CFAPattern"),
    tag_def!(33423, "BatteryLevel"),
    tag_def!(33432, "Copyright", { datatypes: &[Ascii] }),
    tag_def!(33445, "MDFileTag"),
    tag_def!(33446, "MDScalePixel"),
    tag_def!(33447, "MDColorTable"),
    tag_def!(33448, "MDLabName"),
    tag_def!(33449, "MDSampleInfo"),
    tag_def!(33450, "MDPrepDate"),
    tag_def!(33451, "MDPrepTime"),
    tag_def!(33452, "MDFileUnits"),
    tag_def!(33550, "ModelPixelScaleTag", { datatypes: &[Double] }),
    tag_def!(33723, "RichTiffIPTC", { altnames: &["IPTC_NAA"] }),
    tag_def!(33918, "INGRPacketDataTag"),
    tag_def!(33919, "INGRFlagRegisters"),
    tag_def!(33920, "IrasBTransformationMatrix"),
    tag_def!(33922, "ModelTiepointTag", { datatypes: &[Double] }),
    tag_def!(34016, "IT8Site"),
    tag_def!(34017, "IT8ColorSequence"),
    tag_def!(34018, "IT8Header"),
    tag_def!(34019, "IT8RasterPadding"),
    tag_def!(34020, "IT8BitsPerRunLength"),
    tag_def!(34021, "IT8BitsPerExtendedRunLength"),
    tag_def!(34022, "IT8ColorTable"),
    tag_def!(34023, "IT8ImageColorIndicator"),
    tag_def!(34024, "IT8BkgColorIndicator"),
    tag_def!(34025, "IT8ImageColorValue"),
    tag_def!(34026, "IT8BkgColorValue"),
    tag_def!(34027, "IT8PixelIntensityRange"),
    tag_def!(34028, "IT8TransparencyIndicator"),
    tag_def!(34029, "IT8ColorCharacterization"),
    tag_def!(34030, "IT8HCUsage"),
    tag_def!(34031, "IT8TrapIndicator"),
    tag_def!(34032, "IT8CMYKEquivalent"),
    tag_def!(34232, "FrameCount"),
    tag_def!(34264, "ModelTransformationTag", { datatypes: &[Double], count: Some(16) }),
    tag_def!(34377, "Photoshop"),
    tag_def!(34665, "EXIFIFD", { datatypes: &[Ifd, Ifd8], tag_set: Some(TagSetKind::Exif) }),
    tag_def!(34675, "ICCProfile"),
    tag_def!(34732, "ImageLayer"),
    tag_def!(34735, "GeoKeyDirectoryTag", { datatypes: &[Short] }),
    tag_def!(34736, "GeoDoubleParamsTag", { datatypes: &[Double] }),
    tag_def!(34737, "GeoAsciiParamsTag", { datatypes: &[Ascii] }),
    tag_def!(34750, "JBIGOptions"),
    tag_def!(34853, "GPSIFD", { datatypes: &[Ifd, Ifd8], tag_set: Some(TagSetKind::Gps) }),
    tag_def!(34908, "FaxRecvParams"),
    tag_def!(34909, "FaxSubaddress"),
    tag_def!(34910, "FaxRecvTime"),
    tag_def!(34911, "FAXDCS"),
    tag_def!(34929, "FEDEX_EDR"),
    tag_def!(37439, "StoNits"),
    tag_def!(37724, "ImageSourceData"),
    tag_def!(40965, "InteroperabilityIFD", { datatypes: &[Ifd, Ifd8], tag_set: Some(TagSetKind::Interop) }),
    tag_def!(42112, "GDAL_Metadata"),
    tag_def!(42113, "GDAL_NoData"),
    tag_def!(50215, "OceScanjobDescription"),
    tag_def!(50216, "OceApplicationSelector"),
    tag_def!(50217, "OceIdentificationNumber"),
    tag_def!(50218, "OceImageLogicCharacteristics"),
    tag_def!(50674, "LERC_PARAMETERS"),
    tag_def!(50706, "DNGVersion"),
    tag_def!(50707, "DNGBackwardVersion"),
    tag_def!(50708, "UniqueCameraModel"),
    tag_def!(50709, "LocalizedCameraModel"),
    tag_def!(50710, "CFAPlaneColor"),
    tag_def!(50711, "CFALayout"),
    tag_def!(50712, "LinearizationTable"),
    tag_def!(50713, "BlackLevelRepeatDim"),
    tag_def!(50714, "BlackLevel"),
    tag_def!(50715, "BlackLevelDeltaH"),
    tag_def!(50716, "BlackLevelDeltaV"),
    tag_def!(50717, "WhiteLevel"),
    tag_def!(50718, "DefaultScale"),
    tag_def!(50719, "DefaultCropOrigin"),
    tag_def!(50720, "DefaultCropSize"),
    tag_def!(50721, "ColorMatrix1"),
    tag_def!(50722, "ColorMatrix2"),
    tag_def!(50723, "CameraCalibration1"),
    tag_def!(50724, "CameraCalibration2"),
    tag_def!(50725, "ReductionMatrix1"),
    tag_def!(50726, "ReductionMatrix2"),
    tag_def!(50727, "AnalogBalance"),
    tag_def!(50728, "AsShotNeutral"),
    tag_def!(50729, "AsShotWhiteXY"),
    tag_def!(50730, "BaselineExposure"),
    tag_def!(50731, "BaselineNoise"),
    tag_def!(50732, "BaselineSharpness"),
    tag_def!(50733, "BayerGreenSplit"),
    tag_def!(50734, "LinearResponseLimit"),
    tag_def!(50735, "CameraSerialNumber"),
    tag_def!(50736, "LensInfo"),
    tag_def!(50737, "ChromaBlurRadius"),
    tag_def!(50738, "AntiAliasStrength"),
    tag_def!(50739, "ShadowScale"),
    tag_def!(50740, "DNGPrivateData"),
    tag_def!(50741, "MakerNoteSafety"),
    tag_def!(50778, "CalibrationIlluminant1"),
    tag_def!(50779, "CalibrationIlluminant2"),
    tag_def!(50780, "BestQualityScale"),
    tag_def!(50781, "RawDataUniqueID"),
    tag_def!(50784, "AliasLayerMetadata"),
    tag_def!(50827, "OriginalRawFileName"),
    tag_def!(50828, "OriginalRawFileData"),
    tag_def!(50829, "ActiveArea"),
    tag_def!(50830, "MaskedAreas"),
    tag_def!(50838, "ImageJMetadataByteCounts", { altnames: &["IJMetadataByteCounts"], datatypes: &[Short, Long, Long8] }),
    tag_def!(50839, "ImageJMetadata", { datatypes: &[Byte] }),
    tag_def!(50844, "RPCCoefficient"),
    tag_def!(50908, "TIFF_RSID"),
    tag_def!(50909, "GEO_METADATA"),
    // Aperio tags found in sample files but may not be official
    tag_def!(55000, "AperioUnknown55000", { datatypes: &[SLong] }),
    tag_def!(55001, "AperioMagnification"),
    tag_def!(55002, "AperioMPP", { datatypes: &[Double] }),
    tag_def!(55003, "AperioScanScopeID"),
    tag_def!(55004, "AperioDate"),
    // Hamamatsu tags
    tag_def!(65324, "NDPI_OffsetHighBytes", { ndpi_offset: true }),
    tag_def!(65325, "NDPI_ByteCountHighBytes", { ndpi_offset: true }),
    tag_def!(65420, "NDPI_FORMAT_FLAG"),
    tag_def!(65421, "NDPI_SOURCELENS", { altnames: &["NDPI_Magnification"] }),
    tag_def!(65422, "NDPI_XOFFSET"),
    tag_def!(65423, "NDPI_YOFFSET"),
    tag_def!(65424, "NDPI_FOCAL_PLANE", { altnames: &["NDPI_ZOFFSET"] }),
    tag_def!(65425, "NDPI_TissueIndex"),
    tag_def!(65426, "NDPI_MCU_STARTS", { ndpi_offset: true }),
    tag_def!(65427, "NDPI_REFERENCE", { altnames: &["NDPI_SlideLabel"] }),
    tag_def!(65428, "NDPI_AuthCode"),
    tag_def!(65432, "NDPI_McuStartsHighBytes", { ndpi_offset: true }),
    tag_def!(65434, "NDPI_CHANNEL", { altnames: &["NDPI_Fluorescence"] }),
    tag_def!(65435, "NDPI_ExposureRatio"),
    tag_def!(65436, "NDPI_RedMultiplier"),
    tag_def!(65437, "NDPI_GreenMultiplier"),
    tag_def!(65438, "NDPI_BlueMultiplier"),
    tag_def!(65439, "NDPI_FocusPoints"),
    tag_def!(65440, "NDPI_FocusPointRegions"),
    tag_def!(65441, "NDPI_CaptureMode"),
    tag_def!(65442, "NDPI_NDPSN", { altnames: &["NDPI_ScannerSerialNumber"] }),
    tag_def!(65444, "NDPI_JpegQuality"),
    tag_def!(65445, "NDPI_RefocusInterval"),
    tag_def!(65446, "NDPI_FocusOffset"),
    tag_def!(65447, "NDPI_BlankLines"),
    tag_def!(65448, "NDPI_FirmwareVersion"),
    tag_def!(65449, "NDPI_PROPERTY_MAP"),
    tag_def!(65450, "NDPI_LabelObscured"),
    tag_def!(65451, "NDPI_EMISSION_WAVELENGTH"),
    tag_def!(65453, "NDPI_LampAge"),
    tag_def!(65454, "NDPI_ExposureTime"),
    tag_def!(65455, "NDPI_FocusTime"),
    tag_def!(65456, "NDPI_ScanTime"),
    tag_def!(65457, "NDPI_WriteTime"),
    tag_def!(65458, "NDPI_FullyAutoFocus"),
    tag_def!(65500, "NDPI_DefaultGamma"),
    tag_def!(65535, "DCSHueShiftValues"),
];

/// The EXIF sub-IFD vocabulary
pub static EXIF_TAG_DEFS: &[TagDef] = &[
    tag_def!(33434, "ExposureTime", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(33437, "FNumber", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(34850, "ExposureProgram", { datatypes: &[Short], count: Some(1) }),
    tag_def!(34852, "SpectralSensitivity", { datatypes: &[Ascii] }),
    tag_def!(34855, "ISOSpeedRatings", { altnames: &["PhotographicSensitivity"], datatypes: &[Short] }),
    tag_def!(34856, "OECF", { datatypes: &[Undefined] }),
    tag_def!(34858, "TimeZoneOffset", { datatypes: &[SShort] }),
    tag_def!(34859, "SelfTimerMode", { datatypes: &[Short] }),
    tag_def!(34864, "SensitivityType"),
    tag_def!(34865, "StandardOutputSensitivity", { datatypes: &[Long] }),
    tag_def!(34866, "RecommendedExposureIndex", { datatypes: &[Long] }),
    tag_def!(34867, "ISOSpeed"),
    tag_def!(34868, "ISOSpeedLatitudeyyy"),
    tag_def!(34869, "ISOSpeedLatitudezzz", { datatypes: &[Long] }),
    tag_def!(36864, "ExifVersion"),
    tag_def!(36867, "DateTimeOriginal", { datatypes: &[Ascii], count: Some(20) }),
    tag_def!(36868, "CreateDate", { altnames: &["DateTimeDigitized"], datatypes: &[Ascii] }),
    tag_def!(36873, "GooglePlusUploadCode"),
    tag_def!(36880, "OffsetTime", { datatypes: &[Ascii] }),
    tag_def!(36881, "OffsetTimeOriginal", { datatypes: &[Ascii] }),
    tag_def!(36882, "OffsetTimeDigitized", { datatypes: &[Ascii] }),
    tag_def!(37121, "ComponentsConfiguration", { datatypes: &[Undefined], count: Some(4) }),
    tag_def!(37122, "CompressedBitsPerPixel", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(37377, "ShutterSpeedValue", { datatypes: &[SRational], count: Some(1) }),
    tag_def!(37378, "ApertureValue", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(37379, "BrightnessValue", { datatypes: &[SRational], count: Some(1) }),
    tag_def!(37380, "ExposureBiasValue", { datatypes: &[SRational], count: Some(1) }),
    tag_def!(37381, "MaxApertureValue", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(37382, "SubjectDistance", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(37383, "MeteringMode", { datatypes: &[Short], count: Some(1) }),
    tag_def!(37384, "LightSource", { datatypes: &[Short], count: Some(1) }),
    tag_def!(37385, "Flash", { datatypes: &[Short], count: Some(1) }),
    tag_def!(37386, "FocalLength", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(37393, "ImageNumber", { datatypes: &[Long] }),
    tag_def!(37394, "SecurityClassification", { datatypes: &[Ascii] }),
    tag_def!(37395, "ImageHistory", { datatypes: &[Ascii] }),
    tag_def!(37396, "SubjectArea", { datatypes: &[Short] }),
    tag_def!(37500, "MakerNote", { datatypes: &[Undefined] }),
    tag_def!(37510, "UserComment", { datatypes: &[Undefined] }),
    tag_def!(37520, "SubSecTime", { datatypes: &[Ascii] }),
    tag_def!(37521, "SubSecTimeOriginal", { datatypes: &[Ascii] }),
    tag_def!(37522, "SubSecTimeDigitized", { datatypes: &[Ascii] }),
    tag_def!(37888, "AmbientTemperature", { altnames: &["Temperature"], datatypes: &[SRational] }),
    tag_def!(37889, "Humidity", { datatypes: &[Rational] }),
    tag_def!(37890, "Pressure", { datatypes: &[Rational] }),
    tag_def!(37891, "WaterDepth", { datatypes: &[SRational] }),
    tag_def!(37892, "Acceleration", { datatypes: &[Rational] }),
    tag_def!(37893, "CameraElevationAngle", { datatypes: &[SRational] }),
    tag_def!(40960, "FlashpixVersion", { datatypes: &[Undefined], count: Some(4) }),
    tag_def!(40961, "ColorSpace", { datatypes: &[Short], count: Some(1) }),
    tag_def!(40962, "PixelXDimension", { datatypes: &[Short, Long], count: Some(1) }),
    tag_def!(40963, "PixelYDimension", { datatypes: &[Short, Long], count: Some(1) }),
    tag_def!(40964, "RelatedSoundFile", { datatypes: &[Ascii], count: Some(13) }),
    tag_def!(41483, "FlashEnergy", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(41484, "SpatialFrequencyResponse", { datatypes: &[Undefined] }),
    tag_def!(41486, "FocalPlaneXResolution", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(41487, "FocalPlaneYResolution", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(41488, "FocalPlaneResolutionUnit", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41492, "SubjectLocation", { datatypes: &[Short], count: Some(2) }),
    tag_def!(41493, "ExposureIndex", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(41495, "SensingMethod", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41728, "FileSource", { datatypes: &[Undefined], count: Some(1) }),
    tag_def!(41729, "SceneType", { datatypes: &[Undefined], count: Some(1) }),
    tag_def!(41730, "CFAPattern", { datatypes: &[Undefined] }),
    tag_def!(41985, "CustomRendered", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41986, "ExposureMode", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41987, "WhiteBalance", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41988, "DigitalZoomRatio", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(41989, "FocalLengthIn35mmFilm", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41990, "SceneCaptureType", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41991, "GainControl", { datatypes: &[Rational], count: Some(1) }),
    tag_def!(41992, "Contrast", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41993, "Saturation", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41994, "Sharpness", { datatypes: &[Short], count: Some(1) }),
    tag_def!(41995, "DeviceSettingDescription", { datatypes: &[Undefined] }),
    tag_def!(41996, "SubjectDistanceRange", { datatypes: &[Short], count: Some(1) }),
    tag_def!(42016, "ImageUniqueID", { datatypes: &[Ascii], count: Some(33) }),
    tag_def!(42032, "OwnerName", { altnames: &["CameraOwnerName"], datatypes: &[Ascii] }),
    tag_def!(42033, "SerialNumber", { altnames: &["BodySerialNumber"], datatypes: &[Ascii] }),
    tag_def!(42034, "LensInfo", { altnames: &["LensSpecification"], datatypes: &[Rational] }),
    tag_def!(42035, "LensMake", { datatypes: &[Ascii] }),
    tag_def!(42036, "LensModel", { datatypes: &[Ascii] }),
    tag_def!(42037, "LensSerialNumber", { datatypes: &[Ascii] }),
    tag_def!(42080, "CompositeImage", { datatypes: &[Short] }),
    tag_def!(42081, "CompositeImageCount", { datatypes: &[Short] }),
    tag_def!(42082, "CompositeImageExposureTimes"),
    tag_def!(42240, "Gamma", { datatypes: &[Rational] }),
    tag_def!(59932, "Padding"),
    tag_def!(59933, "OffsetSchema", { datatypes: &[SLong] }),
    tag_def!(65000, "OwnerName", { datatypes: &[Ascii] }),
    tag_def!(65001, "SerialNumber", { datatypes: &[Ascii] }),
    tag_def!(65002, "Lens", { datatypes: &[Ascii] }),
    tag_def!(65100, "RawFile", { datatypes: &[Ascii] }),
    tag_def!(65101, "Converter", { datatypes: &[Ascii] }),
    tag_def!(65102, "WhiteBalance", { datatypes: &[Ascii] }),
    tag_def!(65105, "Exposure", { datatypes: &[Ascii] }),
    tag_def!(65106, "Shadows", { datatypes: &[Ascii] }),
    tag_def!(65107, "Brightness", { datatypes: &[Ascii] }),
    tag_def!(65108, "Contrast", { datatypes: &[Ascii] }),
    tag_def!(65109, "Saturation", { datatypes: &[Ascii] }),
    tag_def!(65110, "Sharpness", { datatypes: &[Ascii] }),
    tag_def!(65111, "Smoothness", { datatypes: &[Ascii] }),
    tag_def!(65112, "MoireFilter", { datatypes: &[Ascii] }),
];

/// The GPS sub-IFD vocabulary
pub static GPS_TAG_DEFS: &[TagDef] = &[
    tag_def!(0, "GPSVersionID", { altnames: &["VersionID"], datatypes: &[Byte], count: Some(4) }),
    tag_def!(1, "GPSLatitudeRef", { altnames: &["LatitudeRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(2, "GPSLatitude", { altnames: &["Latitude"], datatypes: &[Rational], count: Some(3) }),
    tag_def!(3, "GPSLongitudeRef", { altnames: &["LongitudeRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(4, "GPSLongitude", { altnames: &["Longitude"], datatypes: &[Rational], count: Some(3) }),
    tag_def!(5, "GPSAltitudeRef", { altnames: &["AltitudeRef"], datatypes: &[Byte], count: Some(1) }),
    tag_def!(6, "GPSAltitude", { altnames: &["Altitude"], datatypes: &[Rational], count: Some(1) }),
    tag_def!(7, "GPSTimeStamp", { altnames: &["TimeStamp"], datatypes: &[Rational], count: Some(3) }),
    tag_def!(8, "GPSSatellites", { altnames: &["Satellites"], datatypes: &[Ascii] }),
    tag_def!(9, "GPSStatus", { altnames: &["Status"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(10, "GPSMeasureMode", { altnames: &["MeasureMode"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(11, "GPSDOP", { altnames: &["DOP"], datatypes: &[Rational], count: Some(1) }),
    tag_def!(12, "GPSSpeedRef", { altnames: &["SpeedRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(13, "GPSSpeed", { altnames: &["Speed"], datatypes: &[Rational], count: Some(1) }),
    tag_def!(14, "GPSTrackRef", { altnames: &["TrackRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(15, "GPSTrack", { altnames: &["Track"], datatypes: &[Rational], count: Some(1) }),
    tag_def!(16, "GPSImgDirectionRef", { altnames: &["ImgDirectionRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(17, "GPSImgDirection", { altnames: &["ImgDirection"], datatypes: &[Rational], count: Some(1) }),
    tag_def!(18, "GPSMapDatum", { altnames: &["MapDatum"], datatypes: &[Ascii] }),
    tag_def!(19, "GPSDestLatitudeRef", { altnames: &["DestLatitudeRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(20, "GPSDestLatitude", { altnames: &["DestLatitude"], datatypes: &[Rational], count: Some(3) }),
    tag_def!(21, "GPSDestLongitudeRef", { altnames: &["DestLongitudeRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(22, "GPSDestLongitude", { altnames: &["DestLongitude"], datatypes: &[Rational], count: Some(3) }),
    tag_def!(23, "GPSDestBearingRef", { altnames: &["DestBearingRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(24, "GPSDestBearing", { altnames: &["DestBearing"], datatypes: &[Rational], count: Some(1) }),
    tag_def!(25, "GPSDestDistanceRef", { altnames: &["DestDistanceRef"], datatypes: &[Ascii], count: Some(2) }),
    tag_def!(26, "GPSDestDistance", { altnames: &["DestDistance"], datatypes: &[Rational], count: Some(1) }),
    tag_def!(27, "GPSProcessingMethod", { altnames: &["ProcessingMethod"], datatypes: &[Undefined] }),
    tag_def!(28, "GPSAreaInformation", { altnames: &["AreaInformation"], datatypes: &[Undefined] }),
    tag_def!(29, "GPSDateStamp", { altnames: &["DateStamp"], datatypes: &[Ascii], count: Some(11) }),
    tag_def!(30, "GPSDifferential", { altnames: &["Differential"], datatypes: &[Short], count: Some(1) }),
    tag_def!(31, "GPSPositioningError", { altnames: &["PositioningError", "GPSHPositioningError", "HPositioningError"] }),
];

/// The Interoperability sub-IFD vocabulary
pub static INTEROP_TAG_DEFS: &[TagDef] = &[
    tag_def!(1, "InteroperabilityIndex", { datatypes: &[Ascii] }),
];

/// A uniquely-keyed collection of tag definitions
///
/// Addressable by id, decimal string, hex string, case-insensitive name or
/// alias.
pub struct TagSet {
    pub kind: TagSetKind,
    defs: &'static [TagDef],
    by_value: HashMap<u32, &'static TagDef>,
    by_name: HashMap<String, &'static TagDef>,
}

impl TagSet {
    pub(crate) fn new(kind: TagSetKind, defs: &'static [TagDef]) -> Self {
        let mut by_value = HashMap::new();
        let mut by_name = HashMap::new();
        for def in defs {
            by_value.insert(def.value, def);
            by_name.insert(def.name.to_uppercase(), def);
            for alt in def.altnames {
                by_name.insert(alt.to_uppercase(), def);
            }
        }
        TagSet {
            kind,
            defs,
            by_value,
            by_name,
        }
    }

    /// Looks up a definition by numeric id
    pub fn get(&self, value: u32) -> Option<&'static TagDef> {
        self.by_value.get(&value).copied()
    }

    /// Resolves a textual-or-numeric key
    pub fn find(&self, key: &str) -> Option<&'static TagDef> {
        if let Some(value) = parse_int_key(key) {
            if (0..=u32::MAX as i64).contains(&value) {
                return self.get(value as u32);
            }
            return None;
        }
        self.by_name.get(&key.trim().to_uppercase()).copied()
    }

    /// True if the key resolves inside this set
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Iterates the definitions in declaration (ascending id) order
    pub fn iter(&self) -> impl Iterator<Item = &'static TagDef> {
        self.defs.iter()
    }
}

lazy_static! {
    /// The main TIFF vocabulary
    pub static ref TAG_SET: TagSet = TagSet::new(TagSetKind::Tag, TAG_DEFS);
    /// The EXIF vocabulary
    pub static ref EXIF_TAG_SET: TagSet = TagSet::new(TagSetKind::Exif, EXIF_TAG_DEFS);
    /// The GPS vocabulary
    pub static ref GPS_TAG_SET: TagSet = TagSet::new(TagSetKind::Gps, GPS_TAG_DEFS);
    /// The Interoperability vocabulary
    pub static ref INTEROP_TAG_SET: TagSet = TagSet::new(TagSetKind::Interop, INTEROP_TAG_DEFS);
    /// An empty set: every lookup fails, so all tags resolve anonymously
    pub static ref ANON_TAG_SET: TagSet = TagSet::new(TagSetKind::Tag, &[]);
}

/// Maps a set kind to its singleton registry
pub fn tag_set_for(kind: TagSetKind) -> &'static TagSet {
    match kind {
        TagSetKind::Tag => &TAG_SET,
        TagSetKind::Exif => &EXIF_TAG_SET,
        TagSetKind::Gps => &GPS_TAG_SET,
        TagSetKind::Interop => &INTEROP_TAG_SET,
        TagSetKind::GeoKey => &crate::tiff::geokeys::GEO_KEY_SET,
    }
}

/// A resolved tag: either a registry definition or an anonymous creation
#[derive(Clone, Debug)]
pub struct Tag {
    pub value: u32,
    def: Option<&'static TagDef>,
    datatype_hint: Option<Datatype>,
}

impl Tag {
    /// Wraps a registry definition
    pub fn from_def(def: &'static TagDef) -> Self {
        Tag {
            value: def.value,
            def: Some(def),
            datatype_hint: None,
        }
    }

    /// The registry definition, when this tag has one
    pub fn def(&self) -> Option<&'static TagDef> {
        self.def
    }

    /// Symbolic name, falling back to the decimal id
    pub fn name(&self) -> String {
        match self.def {
            Some(def) => def.name.to_string(),
            None => self.value.to_string(),
        }
    }

    /// "Name 256 (0x100)" style label used in diagnostics and dumps
    pub fn label(&self) -> String {
        match self.def {
            Some(def) => format!("{} {} (0x{:X})", def.name, self.value, self.value),
            None => format!("{} (0x{:X})", self.value, self.value),
        }
    }

    /// Accepted datatypes: the registry's, or the creation hint
    pub fn datatypes(&self) -> Vec<Datatype> {
        if let Some(def) = self.def {
            if !def.datatypes.is_empty() {
                return def.datatypes.to_vec();
            }
        }
        self.datatype_hint.into_iter().collect()
    }

    /// True when this tag's value locates one or more child directories
    pub fn is_ifd(&self) -> bool {
        match self.def {
            Some(def) => def.is_ifd(),
            None => self.datatype_hint.map(|dt| dt.is_ifd()).unwrap_or(false),
        }
    }

    /// True when the tag's data is an array of payload offsets
    pub fn is_offset_data(&self) -> bool {
        self.def.map(|def| def.is_offset_data()).unwrap_or(false)
    }

    /// Companion byte-count information for offset-bearing tags
    pub fn bytecounts(&self) -> Option<Bytecounts> {
        self.def.and_then(|def| def.bytecounts)
    }

    /// Enum vocabulary attached to the tag, if any
    pub fn enum_set(&self) -> Option<&'static ValueSet> {
        self.def.and_then(|def| def.enum_set)
    }

    /// Bitfield vocabulary attached to the tag, if any
    pub fn bitfield(&self) -> Option<&'static ValueSet> {
        self.def.and_then(|def| def.bitfield)
    }

    /// The nested tag set used when recursing through this tag
    pub fn nested_set(&self) -> Option<&'static TagSet> {
        self.def.and_then(|def| def.tag_set).map(tag_set_for)
    }

    /// NDPI high-bytes marker
    pub fn is_ndpi_offset(&self) -> bool {
        self.def.map(|def| def.ndpi_offset).unwrap_or(false)
    }

    /// Key interchangeability: id, decimal, hex, name or alias all match
    pub fn matches(&self, key: &str) -> bool {
        if let Some(value) = parse_int_key(key) {
            return value >= 0 && value as u32 == self.value;
        }
        let upper = key.trim().to_uppercase();
        match self.def {
            Some(def) => {
                def.name.to_uppercase() == upper
                    || def.altnames.iter().any(|alt| alt.to_uppercase() == upper)
            }
            None => false,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.name() == other.name()
    }
}

/// Gets a tag from a set, or fabricates an anonymous one by number
///
/// If `key` exists in the set the definition is returned.  Otherwise the
/// key must parse as a non-negative integer, limited to the 16-bit id
/// space unless `upper_limit` is false (libtiff-style pseudo-tags use
/// larger signaling values).  The optional datatype hint seeds the
/// anonymous tag the way a registered datatype would.
pub fn get_or_create_tag(
    key: &str,
    tag_set: &'static TagSet,
    upper_limit: bool,
    datatype_hint: Option<Datatype>,
) -> TiffResult<Tag> {
    if let Some(def) = tag_set.find(key) {
        let mut tag = Tag::from_def(def);
        tag.datatype_hint = datatype_hint;
        return Ok(tag);
    }
    let value = parse_int_key(key).unwrap_or(-1);
    if value < 0 || (upper_limit && value >= 65536) || value > u32::MAX as i64 {
        return Err(TiffError::UnknownTag(key.to_string()));
    }
    Ok(Tag {
        value: value as u32,
        def: None,
        datatype_hint,
    })
}

/// Resolves a numeric tag id against a set, fabricating when unknown
pub fn tag_for_id(id: u32, tag_set: &'static TagSet) -> Tag {
    match tag_set.get(id) {
        Some(def) => Tag::from_def(def),
        None => Tag {
            value: id,
            def: None,
            datatype_hint: None,
        },
    }
}
