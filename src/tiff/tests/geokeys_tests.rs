use crate::io::source::DataSource;
use crate::tiff::geokeys::{
    decode_geokeys, encode_geokeys, GeoKeyValue, GEO_ASCII_PARAMS_TAG, GEO_DOUBLE_PARAMS_TAG,
    GEO_KEY_DIRECTORY_TAG, GEO_KEY_SET,
};
use crate::tiff::types::{Directory, TagData};

fn empty_dir() -> Directory {
    Directory::new(DataSource::from_bytes(Vec::new()), 0, false, false, 0)
}

fn dir_with_entries(entries: Vec<(u16, crate::tiff::types::TagEntry)>) -> Directory {
    let mut dir = empty_dir();
    for (tag_id, entry) in entries {
        dir.tags.insert(tag_id, entry);
    }
    dir
}

#[test]
fn keys_resolve_by_name_and_geokey_alias() {
    assert_eq!(GEO_KEY_SET.find("GTModelType").unwrap().value, 1024);
    assert_eq!(GEO_KEY_SET.find("GTModelTypeGeoKey").unwrap().value, 1024);
    assert_eq!(GEO_KEY_SET.find("3072").unwrap().value, 3072);
}

#[test]
fn encode_then_decode_round_trips() {
    let entries = vec![
        (
            "GTModelType".to_string(),
            GeoKeyValue::Shorts(vec![1]),
        ),
        (
            "GeogInvFlattening".to_string(),
            GeoKeyValue::Doubles(vec![298.257223563]),
        ),
        (
            "GTCitation".to_string(),
            GeoKeyValue::Text("WGS 84 / UTM zone 11N".to_string()),
        ),
        (
            "ProjectedCSType".to_string(),
            GeoKeyValue::Shorts(vec![32611]),
        ),
    ];
    let tags = encode_geokeys(&entries).unwrap();
    let dir = dir_with_entries(tags);

    let keys = match &dir.entry(GEO_KEY_DIRECTORY_TAG).unwrap().data {
        TagData::Integers(values) => values.clone(),
        other => panic!("unexpected directory data {:?}", other),
    };
    // Header plus four 4-tuples in ascending key order.
    assert_eq!(&keys[..4], &[1, 1, 1, 4]);
    assert_eq!(keys.len(), 20);

    let decoded = decode_geokeys(&keys, &dir);
    assert_eq!(decoded.len(), 4);
    assert_eq!(decoded[0].0, "GTModelType");
    assert_eq!(decoded[0].1, GeoKeyValue::Shorts(vec![1]));
    assert_eq!(decoded[1].0, "GTCitation");
    assert_eq!(
        decoded[1].1,
        GeoKeyValue::Text("WGS 84 / UTM zone 11N".to_string())
    );
    assert_eq!(
        decoded[2].1,
        GeoKeyValue::Doubles(vec![298.257223563])
    );
    assert_eq!(decoded[3].1, GeoKeyValue::Shorts(vec![32611]));
}

#[test]
fn integral_scalars_inline_and_wide_values_spill() {
    let entries = vec![
        (
            "GeographicType".to_string(),
            GeoKeyValue::Doubles(vec![4326.0]),
        ),
        (
            "GeogSemiMajorAxis".to_string(),
            GeoKeyValue::Doubles(vec![6378137.0]),
        ),
    ];
    let tags = encode_geokeys(&entries).unwrap();
    let dir = dir_with_entries(tags);
    let keys = match &dir.entry(GEO_KEY_DIRECTORY_TAG).unwrap().data {
        TagData::Integers(values) => values.clone(),
        _ => unreachable!(),
    };
    // GeographicType inlines (location 0); the axis goes to doubles.
    assert_eq!(&keys[4..8], &[2048, 0, 1, 4326]);
    assert_eq!(keys[8], 2057);
    assert_eq!(keys[9], GEO_DOUBLE_PARAMS_TAG as i64);
    assert!(dir.has_tag(GEO_DOUBLE_PARAMS_TAG));
    assert!(!dir.has_tag(GEO_ASCII_PARAMS_TAG));
}

#[test]
fn ascii_values_are_pipe_terminated() {
    let entries = vec![(
        "GTCitation".to_string(),
        GeoKeyValue::Text("hello".to_string()),
    )];
    let tags = encode_geokeys(&entries).unwrap();
    let dir = dir_with_entries(tags);
    assert_eq!(
        dir.entry(GEO_ASCII_PARAMS_TAG).unwrap().data,
        TagData::Ascii("hello|".to_string())
    );
    let keys = match &dir.entry(GEO_KEY_DIRECTORY_TAG).unwrap().data {
        TagData::Integers(values) => values.clone(),
        _ => unreachable!(),
    };
    let decoded = decode_geokeys(&keys, &dir);
    assert_eq!(decoded[0].1, GeoKeyValue::Text("hello".to_string()));
}

#[test]
fn invalid_headers_decode_to_nothing() {
    let dir = empty_dir();
    assert!(decode_geokeys(&[2, 0, 0, 0], &dir).is_empty());
    // Count disagrees with the array length.
    assert!(decode_geokeys(&[1, 1, 0, 2, 1024, 0, 1, 1], &dir).is_empty());
    // Unknown key ids are skipped.
    let decoded = decode_geokeys(&[1, 1, 0, 1, 9999, 0, 1, 7], &dir);
    assert!(decoded.is_empty());
}

#[test]
fn unknown_key_names_fail_to_encode() {
    let err = encode_geokeys(&[(
        "NotAGeoKey".to_string(),
        GeoKeyValue::Shorts(vec![1]),
    )])
    .unwrap_err();
    assert!(matches!(err, crate::tiff::errors::TiffError::UnknownTag(_)));
}
