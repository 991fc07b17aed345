//! Lexical tag-value parsing
//!
//! The set transform accepts values as text: raw bytes, `@path` /
//! `@-` indirection, or comma/whitespace separated numeric lists.  A
//! value is parsed once into every datatype that can represent it, and
//! the caller picks a datatype by preference or by the tag's registered
//! types.

use std::collections::HashMap;
use std::io::Read;

use lazy_static::lazy_static;
use regex::Regex;

use crate::tiff::constants::{parse_int_key, Datatype};
use crate::tiff::errors::TiffResult;
use crate::tiff::types::TagData;

lazy_static! {
    static ref HAS_DIGIT: Regex = Regex::new(r"\d").expect("static pattern");
}

/// Datatype preference order when nothing else constrains the choice
pub const DATATYPE_PREFERENCE: [Datatype; 10] = [
    Datatype::Byte,
    Datatype::Short,
    Datatype::Long,
    Datatype::Long8,
    Datatype::SByte,
    Datatype::SShort,
    Datatype::SLong,
    Datatype::SLong8,
    Datatype::Double,
    Datatype::Ascii,
];

/// A value parsed into every datatype that can hold it
pub struct ParsedValue {
    candidates: HashMap<Datatype, TagData>,
}

impl ParsedValue {
    /// Parses a textual value, resolving `@path` and `@-` indirection
    pub fn parse(value: &str) -> TiffResult<ParsedValue> {
        if value == "@-" {
            let mut bytes = Vec::new();
            std::io::stdin().lock().read_to_end(&mut bytes)?;
            return Ok(Self::from_bytes(bytes));
        }
        if let Some(path) = value.strip_prefix('@') {
            let bytes = std::fs::read(path)?;
            return Ok(Self::from_bytes(bytes));
        }
        Ok(Self::from_bytes(value.as_bytes().to_vec()))
    }

    /// Builds the candidate table from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> ParsedValue {
        let mut candidates = HashMap::new();
        let text = String::from_utf8(bytes.clone()).ok();
        if let Some(text) = &text {
            candidates.insert(Datatype::Ascii, TagData::Ascii(text.clone()));
            if HAS_DIGIT.is_match(text) {
                numeric_candidates(text, &mut candidates);
            }
        }
        candidates.insert(Datatype::Undefined, TagData::Bytes(bytes));
        ParsedValue { candidates }
    }

    /// The parsed payload for a datatype, when the value supports it
    pub fn get(&self, datatype: Datatype) -> Option<&TagData> {
        self.candidates.get(&datatype)
    }

    /// True when the value can be packed as the datatype
    pub fn supports(&self, datatype: Datatype) -> bool {
        self.candidates.contains_key(&datatype)
    }
}

/// Adds every numeric datatype whose range predicates accept the value
fn numeric_candidates(text: &str, candidates: &mut HashMap<Datatype, TagData>) {
    let normalized = text.replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.is_empty() {
        return;
    }
    let ints: Option<Vec<i64>> = parts.iter().map(|part| parse_int_key(part)).collect();
    let floats: Option<Vec<f64>> = parts
        .iter()
        .map(|part| {
            part.parse::<f64>()
                .ok()
                .or_else(|| parse_int_key(part).map(|v| v as f64))
        })
        .collect();

    if let Some(values) = &ints {
        let in_range = |lo: i64, hi: i64| values.iter().all(|&v| v >= lo && v <= hi);
        if in_range(0, u8::MAX as i64) {
            candidates.insert(Datatype::Byte, TagData::Integers(values.clone()));
        }
        if in_range(i8::MIN as i64, i8::MAX as i64) {
            candidates.insert(Datatype::SByte, TagData::Integers(values.clone()));
        }
        if in_range(0, u16::MAX as i64) {
            candidates.insert(Datatype::Short, TagData::Integers(values.clone()));
        }
        if in_range(i16::MIN as i64, i16::MAX as i64) {
            candidates.insert(Datatype::SShort, TagData::Integers(values.clone()));
        }
        if in_range(0, u32::MAX as i64) {
            candidates.insert(Datatype::Long, TagData::Integers(values.clone()));
            candidates.insert(Datatype::Ifd, TagData::Integers(values.clone()));
        }
        if in_range(i32::MIN as i64, i32::MAX as i64) {
            candidates.insert(Datatype::SLong, TagData::Integers(values.clone()));
        }
        if in_range(0, i64::MAX) {
            candidates.insert(Datatype::Long8, TagData::Integers(values.clone()));
            candidates.insert(Datatype::Ifd8, TagData::Integers(values.clone()));
        }
        candidates.insert(Datatype::SLong8, TagData::Integers(values.clone()));
        if values.len() % 2 == 0 && !values.is_empty() {
            let pairs: Vec<(i64, i64)> = values.chunks_exact(2).map(|c| (c[0], c[1])).collect();
            if in_range(0, u32::MAX as i64) {
                candidates.insert(Datatype::Rational, TagData::Rationals(pairs.clone()));
            }
            if in_range(i32::MIN as i64, i32::MAX as i64) {
                candidates.insert(Datatype::SRational, TagData::Rationals(pairs));
            }
        }
    }
    if let Some(values) = floats {
        if values
            .iter()
            .all(|v| v.is_infinite() || v.is_nan() || v.abs() <= f32::MAX as f64)
        {
            candidates.insert(Datatype::Float, TagData::Floats(values.clone()));
        }
        candidates.insert(Datatype::Double, TagData::Floats(values));
    }
}

#[cfg(test)]
mod tests {
    use super::{ParsedValue, DATATYPE_PREFERENCE};
    use crate::tiff::constants::Datatype;
    use crate::tiff::types::TagData;

    #[test]
    fn mixed_sign_shorts_prefer_sshort() {
        let parsed = ParsedValue::parse("123 -4567").unwrap();
        assert!(!parsed.supports(Datatype::Byte));
        assert!(!parsed.supports(Datatype::Short));
        assert!(parsed.supports(Datatype::SShort));
        let preferred = DATATYPE_PREFERENCE
            .iter()
            .copied()
            .find(|dt| parsed.supports(*dt))
            .unwrap();
        assert_eq!(preferred, Datatype::SShort);
        assert_eq!(
            parsed.get(Datatype::SShort),
            Some(&TagData::Integers(vec![123, -4567]))
        );
    }

    #[test]
    fn small_unsigned_values_prefer_byte() {
        let parsed = ParsedValue::parse("1 2 3").unwrap();
        let preferred = DATATYPE_PREFERENCE
            .iter()
            .copied()
            .find(|dt| parsed.supports(*dt))
            .unwrap();
        assert_eq!(preferred, Datatype::Byte);
    }

    #[test]
    fn fractions_only_fit_floats_and_text() {
        let parsed = ParsedValue::parse("1.5 2").unwrap();
        assert!(!parsed.supports(Datatype::Short));
        assert!(parsed.supports(Datatype::Float));
        assert!(parsed.supports(Datatype::Double));
        assert!(parsed.supports(Datatype::Ascii));
    }

    #[test]
    fn even_counts_offer_rationals() {
        let parsed = ParsedValue::parse("300 1").unwrap();
        assert_eq!(
            parsed.get(Datatype::Rational),
            Some(&TagData::Rationals(vec![(300, 1)]))
        );
        let odd = ParsedValue::parse("300 1 7").unwrap();
        assert!(!odd.supports(Datatype::Rational));
    }

    #[test]
    fn hex_parts_parse_as_integers() {
        let parsed = ParsedValue::parse("0x10").unwrap();
        assert_eq!(
            parsed.get(Datatype::Byte),
            Some(&TagData::Integers(vec![16]))
        );
    }

    #[test]
    fn text_without_digits_stays_textual() {
        let parsed = ParsedValue::parse("plain words").unwrap();
        assert!(!parsed.supports(Datatype::Short));
        assert_eq!(
            parsed.get(Datatype::Ascii),
            Some(&TagData::Ascii("plain words".to_string()))
        );
        assert_eq!(
            parsed.get(Datatype::Undefined),
            Some(&TagData::Bytes(b"plain words".to_vec()))
        );
    }

    #[test]
    fn huge_floats_reject_single_precision() {
        let parsed = ParsedValue::parse("1e300").unwrap();
        assert!(!parsed.supports(Datatype::Float));
        assert!(parsed.supports(Datatype::Double));
    }
}
