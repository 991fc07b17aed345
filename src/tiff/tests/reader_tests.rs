use byteorder::{LittleEndian, WriteBytesExt};

use crate::io::source::DataSource;
use crate::tiff::errors::TiffError;
use crate::tiff::reader::{limit_ifds, read_tiff_source, select_ifd_mut, split_path_spec};
use crate::tiff::tests::test_utils::{
    bigtiff_bytes, classic_tiff_bytes, read_bytes, strip_tiff_bytes, subifd_tiff_bytes,
};
use crate::tiff::types::TagData;

#[test]
fn classic_header_and_tags_parse() {
    let info = read_bytes(classic_tiff_bytes());
    assert!(!info.big_endian);
    assert!(!info.bigtiff);
    assert_eq!(info.first_ifd, 8);
    assert_eq!(info.ifds.len(), 1);

    let ifd = &info.ifds[0];
    assert_eq!(ifd.tag_count, 3);
    assert_eq!(
        ifd.entry(256).unwrap().data,
        TagData::Integers(vec![100])
    );
    assert_eq!(
        ifd.entry(257).unwrap().data,
        TagData::Integers(vec![200])
    );
    assert_eq!(
        ifd.entry(270).unwrap().data,
        TagData::Ascii("hi".to_string())
    );
}

#[test]
fn bigtiff_header_parses() {
    let info = read_bytes(bigtiff_bytes());
    assert!(info.bigtiff);
    assert_eq!(info.first_ifd, 16);
    assert_eq!(
        info.ifds[0].entry(256).unwrap().data,
        TagData::Integers(vec![1024])
    );
}

#[test]
fn unknown_headers_are_fatal() {
    let err = read_tiff_source(DataSource::from_bytes(b"PK\x03\x04junk".to_vec())).unwrap_err();
    assert!(matches!(err, TiffError::UnknownHeader));
}

#[test]
fn unknown_datatypes_drop_only_that_entry() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(2).unwrap();
    // Entry with an unrecognized datatype 14
    buffer.write_u16::<LittleEndian>(256).unwrap();
    buffer.write_u16::<LittleEndian>(14).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(7).unwrap();
    // A valid entry after it
    buffer.write_u16::<LittleEndian>(257).unwrap();
    buffer.write_u16::<LittleEndian>(3).unwrap();
    buffer.write_u32::<LittleEndian>(1).unwrap();
    buffer.write_u32::<LittleEndian>(9).unwrap();
    buffer.write_u32::<LittleEndian>(0).unwrap();

    let info = read_bytes(buffer);
    let ifd = &info.ifds[0];
    assert!(!ifd.has_tag(256));
    assert_eq!(ifd.entry(257).unwrap().data, TagData::Integers(vec![9]));
}

#[test]
fn duplicate_tags_keep_the_last() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(2).unwrap();
    for value in [11u32, 22u32] {
        buffer.write_u16::<LittleEndian>(256).unwrap();
        buffer.write_u16::<LittleEndian>(4).unwrap();
        buffer.write_u32::<LittleEndian>(1).unwrap();
        buffer.write_u32::<LittleEndian>(value).unwrap();
    }
    buffer.write_u32::<LittleEndian>(0).unwrap();

    let info = read_bytes(buffer);
    assert_eq!(
        info.ifds[0].entry(256).unwrap().data,
        TagData::Integers(vec![22])
    );
}

#[test]
fn out_of_range_offsets_leave_data_empty() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(1).unwrap();
    // LONG x4 pointing far past the end of the stream
    buffer.write_u16::<LittleEndian>(273).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(100_000).unwrap();
    buffer.write_u32::<LittleEndian>(0).unwrap();

    let info = read_bytes(buffer);
    let entry = info.ifds[0].entry(273).unwrap();
    assert_eq!(entry.offset, Some(100_000));
    assert!(entry.data.is_empty());
}

#[test]
fn subifd_chains_recurse() {
    let info = read_bytes(subifd_tiff_bytes());
    let entry = info.ifds[0].entry(330).unwrap();
    let chains = entry.ifds.as_ref().expect("subifd chains");
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].len(), 1);
    assert_eq!(chains[1].len(), 1);
    assert_eq!(
        chains[0][0].entry(257).unwrap().data,
        TagData::Integers(vec![5])
    );
    assert_eq!(
        chains[1][0].entry(257).unwrap().data,
        TagData::Integers(vec![6])
    );
}

#[test]
fn strip_offsets_stay_unloaded() {
    let payload = b"strip payload".to_vec();
    let info = read_bytes(strip_tiff_bytes(&payload));
    let offsets = info.ifds[0].entry(273).unwrap();
    assert_eq!(offsets.data, TagData::Integers(vec![74]));
    assert_eq!(
        info.ifds[0].entry(279).unwrap().data,
        TagData::Integers(vec![payload.len() as i64])
    );
}

#[test]
fn path_specs_split_from_the_right() {
    let (path, limits) = split_path_spec("plainpath.tif");
    assert_eq!(path, "plainpath.tif");
    assert!(limits.is_empty());
    // A missing prefix leaves the argument untouched.
    let (path, limits) = split_path_spec("no/such/file.tif,1");
    assert_eq!(path, "no/such/file.tif,1");
    assert!(limits.is_empty());
}

#[test]
fn limit_lists_reduce_the_view() {
    let info = read_bytes(subifd_tiff_bytes());
    let reduced = limit_ifds(info.clone(), &["0".to_string()]).unwrap();
    assert_eq!(reduced.ifds.len(), 1);
    assert_eq!(reduced.reduction, Some(vec!["0".to_string()]));

    let second_chain = limit_ifds(
        info.clone(),
        &["0".to_string(), "SubIFD:1".to_string()],
    )
    .unwrap();
    assert_eq!(second_chain.ifds.len(), 1);
    assert_eq!(
        second_chain.ifds[0].entry(257).unwrap().data,
        TagData::Integers(vec![6])
    );

    // Default tag for a bare index is SubIFD.
    let bare = limit_ifds(info.clone(), &["0".to_string(), "0".to_string()]).unwrap();
    assert_eq!(
        bare.ifds[0].entry(257).unwrap().data,
        TagData::Integers(vec![5])
    );

    let err = limit_ifds(info, &["3".to_string()]).unwrap_err();
    assert!(matches!(err, TiffError::GenericError(_)));
}

#[test]
fn limit_selection_is_idempotent() {
    let info = read_bytes(subifd_tiff_bytes());
    let once = limit_ifds(info, &["0".to_string()]).unwrap();
    let twice = limit_ifds(once.clone(), &["0".to_string()]).unwrap();
    assert_eq!(once.ifds.len(), twice.ifds.len());
    assert_eq!(once.ifds[0].offset, twice.ifds[0].offset);
}

#[test]
fn mutable_selection_aliases_the_tree() {
    let mut info = read_bytes(subifd_tiff_bytes());
    {
        let (dir, _) = select_ifd_mut(&mut info, &["0".to_string(), "1".to_string()]).unwrap();
        dir.tags.remove(&257);
    }
    let chains = info.ifds[0].entry(330).unwrap().ifds.as_ref().unwrap();
    assert!(!chains[1][0].has_tag(257));
    assert!(chains[0][0].has_tag(257));
}
