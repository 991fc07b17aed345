use byteorder::{LittleEndian, WriteBytesExt};

use crate::io::source::DataSource;
use crate::tiff::reader::read_tiff_source;
use crate::tiff::types::TiffFile;

/// Creates a little-endian classic TIFF with one IFD holding
/// ImageWidth=100, ImageLength=200 and ImageDescription="hi"
pub fn classic_tiff_bytes() -> Vec<u8> {
    let mut buffer = Vec::new();

    // TIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap(); // first IFD offset

    // IFD at offset 8 with three entries
    buffer.write_u16::<LittleEndian>(3).unwrap();

    // ImageWidth (256) SHORT 100
    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(3).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(100).unwrap();

    // ImageLength (257) SHORT 200
    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(3).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(200).unwrap();

    // ImageDescription (270) ASCII "hi\0", stored inline
    buffer.write_u16::<LittleEndian>(270).unwrap();
    buffer.write_u16::<LittleEndian>(2).unwrap();
    buffer.write_u32::<LittleEndian>(3).unwrap();
    buffer.extend_from_slice(b"hi\0\0");

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u32::<LittleEndian>(0).unwrap();

    buffer
}

/// Creates a classic TIFF whose single IFD references a strip payload
///
/// Layout: header (8), IFD at 8 with five entries (70 bytes), strip
/// payload right after the trailer.
pub fn strip_tiff_bytes(payload: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    let payload_offset: u32 = 8 + 2 + 5 * 12 + 4;
    buffer.write_u16::<LittleEndian>(5).unwrap();

    // ImageWidth (256) LONG
    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(payload.len() as u32).unwrap();

    // ImageLength (257) LONG
    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();

    // RowsPerStrip (278) LONG
    buffer.write_u16::<LittleEndian>(278).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();

    // StripOffsets (273) LONG
    buffer.write_u16::<LittleEndian>(273).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(payload_offset).unwrap();

    // StripByteCounts (279) LONG
    buffer.write_u16::<LittleEndian>(279).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(payload.len() as u32).unwrap();

    buffer.write_u32::<LittleEndian>(0).unwrap();
    assert_eq!(buffer.len() as u32, payload_offset);
    buffer.extend_from_slice(payload);
    buffer
}

/// Creates a classic TIFF with a main IFD holding a two-chain SubIFD
///
/// Layout: header (8), main IFD at 8 (2 entries, 30 bytes), SubIFD
/// offsets array at 38, child A at 46, child B at 64.
pub fn subifd_tiff_bytes() -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    // Main IFD with ImageWidth and SubIFD
    buffer.write_u16::<LittleEndian>(2).unwrap();

    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(10).unwrap();

    // SubIFD (330) LONG x2 -> external array at 38
    buffer.write_u16::<LittleEndian>(330).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(2).unwrap();
    buffer.write_u32::<LittleEndian>(38).unwrap();

    buffer.write_u32::<LittleEndian>(0).unwrap();
    assert_eq!(buffer.len(), 38);

    // Child chain heads
    buffer.write_u32::<LittleEndian>(46).unwrap();
    buffer.write_u32::<LittleEndian>(64).unwrap();

    // Child A: ImageLength = 5
    buffer.write_u16::<LittleEndian>(1).unwrap();
    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(5).unwrap();
    buffer.write_u32::<LittleEndian>(0).unwrap();
    assert_eq!(buffer.len(), 64);

    // Child B: ImageLength = 6
    buffer.write_u16::<LittleEndian>(1).unwrap();
    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(6).unwrap();
    buffer.write_u32::<LittleEndian>(0).unwrap();

    buffer
}

/// Creates a little-endian BigTIFF with one IFD holding ImageWidth=1024
pub fn bigtiff_bytes() -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(1024).unwrap();
    buffer.write_u64::<LittleEndian>(0).unwrap();

    buffer
}

/// Parses an in-memory TIFF
pub fn read_bytes(bytes: Vec<u8>) -> TiffFile {
    read_tiff_source(DataSource::from_bytes(bytes)).expect("fixture parses")
}
