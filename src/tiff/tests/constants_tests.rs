use crate::tiff::constants::{
    get_or_create_tag, Datatype, COMPRESSION, NEW_SUBFILE_TYPE, TAG_SET,
};
use crate::tiff::errors::TiffError;

#[test]
fn tags_resolve_by_every_key_form() {
    let by_name = TAG_SET.find("ImageWidth").expect("known tag");
    assert_eq!(by_name.value, 256);
    assert_eq!(TAG_SET.find("imagewidth").unwrap().value, 256);
    assert_eq!(TAG_SET.find("256").unwrap().value, 256);
    assert_eq!(TAG_SET.find("0x100").unwrap().value, 256);
    assert_eq!(TAG_SET.get(256).unwrap().name, "ImageWidth");
}

#[test]
fn aliases_resolve_case_insensitively() {
    assert_eq!(TAG_SET.find("ImageHeight").unwrap().value, 257);
    assert_eq!(TAG_SET.find("IMAGEHEIGHT").unwrap().value, 257);
    assert_eq!(TAG_SET.find("Group3Options").unwrap().value, 292);
}

#[test]
fn offset_bearing_tags_know_their_partners() {
    let strips = TAG_SET.find("StripOffsets").unwrap();
    assert!(strips.is_offset_data());
    let tiles = TAG_SET.find("TileOffsets").unwrap();
    assert!(tiles.is_offset_data());
    assert!(!TAG_SET.find("ImageWidth").unwrap().is_offset_data());
}

#[test]
fn subifd_tags_are_pointer_typed() {
    assert!(TAG_SET.find("SubIFD").unwrap().is_ifd());
    assert!(TAG_SET.find("EXIFIFD").unwrap().is_ifd());
    assert!(!TAG_SET.find("Software").unwrap().is_ifd());
}

#[test]
fn unknown_numeric_tags_are_fabricated() {
    let tag = get_or_create_tag("23456", &TAG_SET, true, None).unwrap();
    assert_eq!(tag.value, 23456);
    assert!(tag.def().is_none());
    assert_eq!(tag.name(), "23456");
}

#[test]
fn unknown_named_tags_fail() {
    let err = get_or_create_tag("NoSuchTag", &TAG_SET, true, None).unwrap_err();
    assert!(matches!(err, TiffError::UnknownTag(_)));
}

#[test]
fn pseudo_tags_respect_the_upper_limit() {
    assert!(get_or_create_tag("70000", &TAG_SET, true, None).is_err());
    let tag = get_or_create_tag("70000", &TAG_SET, false, None).unwrap();
    assert_eq!(tag.value, 70000);
}

#[test]
fn datatype_table_matches_the_wire_codes() {
    assert_eq!(Datatype::from_code(3), Some(Datatype::Short));
    assert_eq!(Datatype::from_code(14), None);
    assert_eq!(Datatype::Rational.size(), 8);
    assert_eq!(Datatype::Short.size(), 2);
    assert!(Datatype::Ifd8.is_ifd());
    assert_eq!(Datatype::from_key("double"), Some(Datatype::Double));
    assert_eq!(Datatype::from_key("16"), Some(Datatype::Long8));
    assert_eq!(Datatype::from_key("DWORD"), Some(Datatype::Long));
    assert_eq!(Datatype::from_key("nope"), None);
}

#[test]
fn value_sets_decorate_and_validate() {
    assert_eq!(COMPRESSION.name_for(5), Some("LZW"));
    assert!(COMPRESSION.contains(7));
    assert!(!COMPRESSION.contains(12345));
    assert_eq!(COMPRESSION.find("lzw").unwrap().value, 5);
    assert_eq!(COMPRESSION.find("CCITTFAX3").unwrap().value, 3);
    assert_eq!(NEW_SUBFILE_TYPE.bit_names(5), vec!["ReducedImage", "Mask"]);
}

#[test]
fn datatype_hints_seed_anonymous_tags() {
    let tag = get_or_create_tag("51000", &TAG_SET, true, Some(Datatype::Short)).unwrap();
    assert_eq!(tag.datatypes(), vec![Datatype::Short]);
    assert!(tag.matches("51000"));
    assert!(tag.matches("0xC738"));
}
