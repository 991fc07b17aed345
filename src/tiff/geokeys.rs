//! GeoTIFF GeoKey registry and codec
//!
//! GeoTIFF stores its own key/value space inside three regular tags:
//! GeoKeyDirectoryTag holds a flat array of shorts (a 4-short header
//! followed by 4-tuples), GeoDoubleParamsTag holds doubles referenced by
//! offset, and GeoAsciiParamsTag holds a pipe-delimited string referenced
//! by offset and length.  These aren't TIFF tags, but the registry shape
//! is identical, so the key vocabulary reuses the tag-set machinery.

use lazy_static::lazy_static;
use log::warn;

use crate::tiff::constants::{Datatype, TagDef, TagSet, TagSetKind};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::types::{Directory, TagData, TagEntry};

/// Tag ids the GeoKey space is physically stored in
pub const GEO_KEY_DIRECTORY_TAG: u16 = 34735;
pub const GEO_DOUBLE_PARAMS_TAG: u16 = 34736;
pub const GEO_ASCII_PARAMS_TAG: u16 = 34737;

macro_rules! geo_key {
    ($value:expr, $name:expr, $datatype:expr) => {
        TagDef {
            value: $value,
            name: $name,
            datatypes: &[$datatype],
            ..TagDef::EMPTY
        }
    };
    ($value:expr, $name:expr, $datatype:expr, $alts:expr) => {
        TagDef {
            value: $value,
            name: $name,
            altnames: $alts,
            datatypes: &[$datatype],
            ..TagDef::EMPTY
        }
    };
}

use Datatype::{Ascii, Double, Short};

/// The GeoTIFF key vocabulary
pub static GEO_KEY_DEFS: &[TagDef] = &[
    geo_key!(1024, "GTModelType", Short, &["GTModelTypeGeoKey"]),
    geo_key!(1025, "GTRasterType", Short, &["GTRasterTypeGeoKey"]),
    geo_key!(1026, "GTCitation", Ascii, &["GTCitationGeoKey"]),
    geo_key!(2048, "GeographicType", Short, &["GeographicTypeGeoKey"]),
    geo_key!(2049, "GeogCitation", Ascii, &["GeogCitationGeoKey"]),
    geo_key!(2050, "GeogGeodeticDatum", Short, &["GeogGeodeticDatumGeoKey"]),
    geo_key!(2051, "GeogPrimeMeridian", Short, &["GeogPrimeMeridianGeoKey"]),
    geo_key!(2052, "GeogLinearUnits", Short, &["GeogLinearUnitsGeoKey"]),
    geo_key!(2053, "GeogLinearUnitSize", Double, &["GeogLinearUnitSizeGeoKey"]),
    geo_key!(2054, "GeogAngularUnits", Short, &["GeogAngularUnitsGeoKey"]),
    geo_key!(2055, "GeogAngularUnitSize", Double, &["GeogAngularUnitSizeGeoKey"]),
    geo_key!(2056, "GeogEllipsoid", Short, &["GeogEllipsoidGeoKey"]),
    geo_key!(2057, "GeogSemiMajorAxis", Double, &["GeogSemiMajorAxisGeoKey"]),
    geo_key!(2058, "GeogSemiMinorAxis", Double, &["GeogSemiMinorAxisGeoKey"]),
    geo_key!(2059, "GeogInvFlattening", Double, &["GeogInvFlatteningGeoKey"]),
    geo_key!(2060, "GeogAzimuthUnits", Short, &["GeogAzimuthUnitsGeoKey"]),
    geo_key!(2061, "GeogPrimeMeridianLong", Double, &["GeogPrimeMeridianLongGeoKey"]),
    geo_key!(2062, "GeogTOWGS84", Double, &["GeogTOWGS84GeoKey"]),
    geo_key!(3072, "ProjectedCSType", Short, &["ProjectedCSTypeGeoKey"]),
    geo_key!(3073, "PCSCitation", Ascii, &["PCSCitationGeoKey"]),
    geo_key!(3074, "Projection", Short, &["ProjectionGeoKey"]),
    geo_key!(3075, "ProjCoordTrans", Short, &["ProjCoordTransGeoKey"]),
    geo_key!(3076, "ProjLinearUnits", Short, &["ProjLinearUnitsGeoKey"]),
    geo_key!(3077, "ProjLinearUnitSize", Double, &["ProjLinearUnitSizeGeoKey"]),
    geo_key!(3078, "ProjStdParallel1", Double, &["ProjStdParallel1GeoKey", "ProjStdParallel", "ProjStdParallelGeoKey"]),
    geo_key!(3079, "ProjStdParallel2", Double, &["ProjStdParallel2GeoKey"]),
    geo_key!(3080, "ProjNatOriginLong", Double, &["ProjNatOriginLongGeoKey", "ProjOriginLong", "ProjOriginLongGeoKey"]),
    geo_key!(3081, "ProjNatOriginLat", Double, &["ProjNatOriginLatGeoKey", "ProjOriginLat", "ProjOriginLatGeoKey"]),
    geo_key!(3082, "ProjFalseEasting", Double, &["ProjFalseEastingGeoKey"]),
    geo_key!(3083, "ProjFalseNorthing", Double, &["ProjFalseNorthingGeoKey"]),
    geo_key!(3084, "ProjFalseOriginLong", Double, &["ProjFalseOriginLongGeoKey"]),
    geo_key!(3085, "ProjFalseOriginLat", Double, &["ProjFalseOriginLatGeoKey"]),
    geo_key!(3086, "ProjFalseOriginEasting", Double, &["ProjFalseOriginEastingGeoKey"]),
    geo_key!(3087, "ProjFalseOriginNorthing", Double, &["ProjFalseOriginNorthingGeoKey"]),
    geo_key!(3088, "ProjCenterLong", Double, &["ProjCenterLongGeoKey"]),
    geo_key!(3089, "ProjCenterLat", Double, &["ProjCenterLatGeoKey"]),
    geo_key!(3090, "ProjCenterEasting", Double, &["ProjCenterEastingGeoKey"]),
    geo_key!(3091, "ProjCenterNorthing", Double, &["ProjCenterNorthingGeoKey"]),
    geo_key!(3092, "ProjScaleAtNatOrigin", Double, &["ProjScaleAtNatOriginGeoKey", "ProjScaleAtOrigin", "ProjScaleAtOriginGeoKey"]),
    geo_key!(3093, "ProjScaleAtCenter", Double, &["ProjScaleAtCenterGeoKey"]),
    geo_key!(3094, "ProjAzimuthAngle", Double, &["ProjAzimuthAngleGeoKey"]),
    geo_key!(3095, "ProjStraightVertPoleLong", Double, &["ProjStraightVertPoleLongGeoKey"]),
    geo_key!(3096, "ProjRectifiedGridAngle", Double, &["ProjRectifiedGridAngleGeoKey"]),
    geo_key!(4096, "VerticalCSType", Short, &["VerticalCSTypeGeoKey"]),
    geo_key!(4097, "VerticalCitation", Ascii, &["VerticalCitationGeoKey"]),
    geo_key!(4098, "VerticalDatum", Short, &["VerticalDatumGeoKey"]),
    geo_key!(4099, "VerticalUnits", Short, &["VerticalUnitsGeoKey"]),
    geo_key!(5120, "CoordinateEpoch", Double, &["CoordinateEpochGeoKey"]),
];

lazy_static! {
    /// The GeoKey vocabulary as a tag set
    pub static ref GEO_KEY_SET: TagSet = TagSet::new(TagSetKind::GeoKey, GEO_KEY_DEFS);
}

/// A decoded GeoKey value
#[derive(Debug, Clone, PartialEq)]
pub enum GeoKeyValue {
    /// Inline shorts (the location field was 0)
    Shorts(Vec<i64>),
    /// A slice of the doubles parameter tag
    Doubles(Vec<f64>),
    /// A substring of the ASCII parameter tag, trailing pipe stripped
    Text(String),
}

impl std::fmt::Display for GeoKeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoKeyValue::Shorts(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
            GeoKeyValue::Doubles(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
            GeoKeyValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Decodes the GeoKey directory of a directory into named values
///
/// Returns the keys in directory order.  An invalid header or a count
/// that disagrees with the array length yields an empty result; unknown
/// key ids are skipped.
pub fn decode_geokeys(keys: &[i64], ifd: &Directory) -> Vec<(&'static str, GeoKeyValue)> {
    let mut result = Vec::new();
    if keys.len() < 4 {
        return result;
    }
    let version = (keys[0], keys[1], keys[2]);
    if version != (1, 1, 0) && version != (1, 1, 1) {
        return result;
    }
    if keys[3] as usize * 4 + 4 != keys.len() {
        return result;
    }
    let doubles: Vec<f64> = match ifd.entry(GEO_DOUBLE_PARAMS_TAG) {
        Some(entry) => match &entry.data {
            TagData::Floats(values) => values.clone(),
            _ => Vec::new(),
        },
        None => Vec::new(),
    };
    let asciis: String = match ifd.entry(GEO_ASCII_PARAMS_TAG) {
        Some(entry) => match &entry.data {
            TagData::Ascii(text) => text.clone(),
            _ => String::new(),
        },
        None => String::new(),
    };
    for chunk in keys[4..].chunks_exact(4) {
        let (key_id, location, count, value) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        let def = match GEO_KEY_SET.get(key_id as u32) {
            Some(def) => def,
            None => continue,
        };
        if location == 0 {
            result.push((def.name, GeoKeyValue::Shorts(vec![value])));
        } else if location == GEO_DOUBLE_PARAMS_TAG as i64 {
            let start = (value as usize).min(doubles.len());
            let end = (start + count as usize).min(doubles.len());
            result.push((def.name, GeoKeyValue::Doubles(doubles[start..end].to_vec())));
        } else if location == GEO_ASCII_PARAMS_TAG as i64 {
            let start = (value as usize).min(asciis.len());
            let end = (start + count as usize).min(asciis.len());
            let mut text = asciis[start..end].to_string();
            if text.ends_with('|') {
                text.pop();
            }
            result.push((def.name, GeoKeyValue::Text(text)));
        }
    }
    result
}

/// Encodes named GeoKey values into the three-tag representation
///
/// Accepts keys by name, alias or id.  Integral scalars in the signed
/// 16-bit range are inlined; other numerics go to the doubles tag and
/// strings to the ASCII tag with pipe terminators.  Entries are emitted
/// in ascending key-id order.
pub fn encode_geokeys(entries: &[(String, GeoKeyValue)]) -> TiffResult<Vec<(u16, TagEntry)>> {
    let mut doubles: Vec<f64> = Vec::new();
    let mut asciis = String::new();
    let mut records: Vec<[i64; 4]> = Vec::new();

    for (key, value) in entries {
        let key_id = match GEO_KEY_SET.find(key) {
            Some(def) => def.value as i64,
            None => match crate::tiff::constants::parse_int_key(key) {
                Some(id) if (0..=65535).contains(&id) => id,
                _ => return Err(TiffError::UnknownTag(key.clone())),
            },
        };
        let is_ascii_key = GEO_KEY_SET
            .get(key_id as u32)
            .map(|def| def.datatypes.first() == Some(&Datatype::Ascii))
            .unwrap_or(false);
        match value {
            GeoKeyValue::Text(text) => {
                if !is_ascii_key {
                    warn!("GeoKey {} is not an ASCII key; storing text anyway", key);
                }
                records.push([key_id, GEO_ASCII_PARAMS_TAG as i64, text.len() as i64, asciis.len() as i64]);
                asciis.push_str(text);
                asciis.push('|');
            }
            GeoKeyValue::Shorts(values) if values.len() == 1 && (-32768..=32767).contains(&values[0]) => {
                records.push([key_id, 0, 1, values[0]]);
            }
            GeoKeyValue::Shorts(values) => {
                records.push([key_id, GEO_DOUBLE_PARAMS_TAG as i64, values.len() as i64, doubles.len() as i64]);
                doubles.extend(values.iter().map(|&v| v as f64));
            }
            GeoKeyValue::Doubles(values)
                if values.len() == 1
                    && values[0].fract() == 0.0
                    && (-32768.0..=32767.0).contains(&values[0]) =>
            {
                records.push([key_id, 0, 1, values[0] as i64]);
            }
            GeoKeyValue::Doubles(values) => {
                records.push([key_id, GEO_DOUBLE_PARAMS_TAG as i64, values.len() as i64, doubles.len() as i64]);
                doubles.extend_from_slice(values);
            }
        }
    }

    records.sort();
    let mut keys: Vec<i64> = vec![1, 1, 1, records.len() as i64];
    for record in &records {
        keys.extend_from_slice(record);
    }

    let mut result = vec![(
        GEO_KEY_DIRECTORY_TAG,
        TagEntry::new(Datatype::Short, TagData::Integers(keys)),
    )];
    if !doubles.is_empty() {
        result.push((
            GEO_DOUBLE_PARAMS_TAG,
            TagEntry::new(Datatype::Double, TagData::Floats(doubles)),
        ));
    }
    if !asciis.is_empty() {
        result.push((
            GEO_ASCII_PARAMS_TAG,
            TagEntry::new(Datatype::Ascii, TagData::Ascii(asciis)),
        ));
    }
    Ok(result)
}
