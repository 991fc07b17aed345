use crate::tiff::constants::Datatype;
use crate::tiff::errors::TiffError;
use crate::tiff::types::TagData;

#[test]
fn shorts_decode_in_both_byte_orders() {
    let raw = [0x2c, 0x01, 0x01, 0x00];
    assert_eq!(
        TagData::decode(&raw, Datatype::Short, false),
        TagData::Integers(vec![300, 1])
    );
    assert_eq!(
        TagData::decode(&raw, Datatype::Short, true),
        TagData::Integers(vec![0x2c01, 0x0100])
    );
}

#[test]
fn signed_types_sign_extend() {
    let raw = [0xff, 0xff];
    assert_eq!(
        TagData::decode(&raw, Datatype::SShort, false),
        TagData::Integers(vec![-1])
    );
    assert_eq!(
        TagData::decode(&raw[..1], Datatype::SByte, false),
        TagData::Integers(vec![-1])
    );
}

#[test]
fn rationals_decode_as_pairs() {
    let mut raw = Vec::new();
    raw.extend_from_slice(&300u32.to_le_bytes());
    raw.extend_from_slice(&1u32.to_le_bytes());
    assert_eq!(
        TagData::decode(&raw, Datatype::Rational, false),
        TagData::Rationals(vec![(300, 1)])
    );
}

#[test]
fn ascii_strips_one_trailing_nul() {
    assert_eq!(
        TagData::decode(b"hi\0", Datatype::Ascii, false),
        TagData::Ascii("hi".to_string())
    );
    // Invalid UTF-8 is retained as raw bytes.
    assert_eq!(
        TagData::decode(&[0xff, 0xfe, 0x00], Datatype::Ascii, false),
        TagData::Bytes(vec![0xff, 0xfe, 0x00])
    );
}

#[test]
fn ascii_encoding_appends_the_nul() {
    let encoded = TagData::Ascii("hi".to_string())
        .encode(Datatype::Ascii, false)
        .unwrap();
    assert_eq!(encoded, b"hi\0");
    assert_eq!(
        TagData::Ascii("hi".to_string()).element_count(Datatype::Ascii),
        3
    );
}

#[test]
fn encode_round_trips_through_decode() {
    let data = TagData::Integers(vec![1, 70000, 3]);
    let encoded = data.encode(Datatype::Long, true).unwrap();
    assert_eq!(TagData::decode(&encoded, Datatype::Long, true), data);

    let floats = TagData::Floats(vec![1.5, -2.25]);
    let encoded = floats.encode(Datatype::Double, false).unwrap();
    assert_eq!(TagData::decode(&encoded, Datatype::Double, false), floats);
}

#[test]
fn out_of_range_values_are_rejected() {
    let err = TagData::Integers(vec![300])
        .encode(Datatype::Byte, false)
        .unwrap_err();
    assert!(matches!(err, TiffError::DatatypeMismatch(_)));
    let err = TagData::Integers(vec![-1])
        .encode(Datatype::Short, false)
        .unwrap_err();
    assert!(matches!(err, TiffError::DatatypeMismatch(_)));
    let err = TagData::Rationals(vec![(-1, 2)])
        .encode(Datatype::Rational, false)
        .unwrap_err();
    assert!(matches!(err, TiffError::DatatypeMismatch(_)));
}

#[test]
fn big_endian_rational_bytes_match_the_wire_format() {
    let encoded = TagData::Rationals(vec![(300, 1)])
        .encode(Datatype::Rational, true)
        .unwrap();
    assert_eq!(encoded, [0x00, 0x00, 0x01, 0x2c, 0x00, 0x00, 0x00, 0x01]);
}
