//! TIFF structure dump command
//!
//! Prints the directory tree of one or more TIFF files in human text,
//! JSON, or a shallow YAML-like form keyed by tag name.  Pixel payloads
//! are never loaded; offset-bearing tags print their offset arrays.

use std::io::Write;

use clap::ArgMatches;
use serde_json::{json, Map, Value};

use crate::commands::command_traits::Command;
use crate::tiff::constants::{tag_for_id, Tag, TagSet, ANON_TAG_SET, TAG_SET};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::geokeys::{decode_geokeys, GEO_KEY_DIRECTORY_TAG};
use crate::tiff::jpeg_quality::estimate_jpeg_quality;
use crate::tiff::reader::read_tiff;
use crate::tiff::types::{Directory, TagData, TagEntry, TiffFile};

const JPEG_TABLES_TAG: u16 = 347;

/// Output mode for the dump command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Text,
    Json,
    Yaml,
}

/// Command for printing TIFF file structure
pub struct DumpCommand {
    sources: Vec<String>,
    max_items: usize,
    max_text: usize,
    format: DumpFormat,
}

impl DumpCommand {
    /// Create a new dump command from CLI arguments
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        let sources: Vec<String> = args
            .get_many::<String>("source")
            .ok_or_else(|| TiffError::GenericError("Missing source file".to_string()))?
            .cloned()
            .collect();
        let max_items = *args.get_one::<usize>("max").expect("has default");
        let max_text = *args.get_one::<usize>("max-text").expect("has default");
        let format = if args.get_flag("json") {
            DumpFormat::Json
        } else if args.get_flag("yaml") {
            DumpFormat::Yaml
        } else {
            DumpFormat::Text
        };
        Ok(DumpCommand {
            sources,
            max_items,
            max_text,
            format,
        })
    }
}

impl Command for DumpCommand {
    fn execute(&self) -> TiffResult<()> {
        let stdout = std::io::stdout();
        let mut dest = stdout.lock();
        dump_sources(
            &mut dest,
            &self.sources,
            self.max_items,
            self.max_text,
            self.format,
        )
    }
}

/// Dumps each source, bannered per source in text mode or collected
/// into one object keyed by path in JSON mode
pub fn dump_sources(
    dest: &mut dyn Write,
    sources: &[String],
    max_items: usize,
    max_text: usize,
    format: DumpFormat,
) -> TiffResult<()> {
    match format {
        DumpFormat::Json => {
            let mut all = Map::new();
            for source in sources {
                let info = read_tiff(source)?;
                all.insert(source.clone(), file_to_json(&info, max_items));
            }
            writeln!(
                dest,
                "{}",
                serde_json::to_string_pretty(&Value::Object(all))?
            )?;
        }
        DumpFormat::Yaml => {
            for source in sources {
                let info = read_tiff(source)?;
                dump_yaml(dest, source, &info)?;
            }
        }
        DumpFormat::Text => {
            for source in sources {
                writeln!(dest, "-- {} --", source)?;
                let info = read_tiff(source)?;
                dump_text(dest, &info, max_items, max_text)?;
            }
        }
    }
    Ok(())
}

/// Human-readable text dump
pub fn dump_text(
    dest: &mut dyn Write,
    info: &TiffFile,
    max_items: usize,
    max_text: usize,
) -> TiffResult<()> {
    writeln!(
        dest,
        "Header: 0x{:02x}{:02x} <{}-endian> <{}TIFF>",
        info.header[0],
        info.header[1],
        if info.big_endian { "big" } else { "little" },
        if info.bigtiff { "Big" } else { "Classic" }
    )?;
    dump_ifds(dest, &info.ifds, max_items, max_text, "", "", &TAG_SET)?;
    Ok(())
}

fn dump_ifds(
    dest: &mut dyn Write,
    ifds: &[Directory],
    max_items: usize,
    max_text: usize,
    dir_prefix: &str,
    line_prefix: &str,
    tag_set: &'static TagSet,
) -> TiffResult<()> {
    for (idx, ifd) in ifds.iter().enumerate() {
        writeln!(
            dest,
            "{}Directory {}{}: offset {} (0x{:x})",
            line_prefix, dir_prefix, idx, ifd.offset, ifd.offset
        )?;
        let mut subifd_tags: Vec<(Tag, &TagEntry)> = Vec::new();
        for (&tag_id, entry) in &ifd.tags {
            let tag = tag_for_id(tag_id as u32, tag_set);
            if tag.is_ifd() || entry.datatype.is_ifd() {
                subifd_tags.push((tag, entry));
            } else {
                dump_tag(dest, &tag, entry, ifd, max_items, max_text, line_prefix)?;
            }
        }
        for (tag, entry) in subifd_tags {
            let sub_line_prefix = format!("{}  ", line_prefix);
            for (sub_idx, chain) in entry.ifds.as_deref().unwrap_or(&[]).iter().enumerate() {
                writeln!(dest, "{}{}:{}", sub_line_prefix, tag.label(), sub_idx)?;
                let sub_dir_prefix = format!("{}{},{}:{},", dir_prefix, idx, tag.name(), sub_idx);
                dump_ifds(
                    dest,
                    chain,
                    max_items,
                    max_text,
                    &sub_dir_prefix,
                    &format!("{}  ", sub_line_prefix),
                    tag.nested_set().unwrap_or(&ANON_TAG_SET),
                )?;
            }
        }
    }
    Ok(())
}

fn dump_tag(
    dest: &mut dyn Write,
    tag: &Tag,
    entry: &TagEntry,
    ifd: &Directory,
    max_items: usize,
    max_text: usize,
    line_prefix: &str,
) -> TiffResult<()> {
    write!(dest, "{}  {} {}:", line_prefix, tag.label(), entry.datatype.name())?;
    match &entry.data {
        TagData::Integers(values) => {
            if values.len() != 1 {
                write!(dest, " <{}>", values.len())?;
            }
            for &value in values.iter().take(max_items) {
                write!(dest, " {}", value)?;
                write_value_decorations(dest, tag, value)?;
            }
            if values.len() > max_items {
                write!(dest, " ...")?;
            }
        }
        TagData::Floats(values) => {
            if values.len() != 1 {
                write!(dest, " <{}>", values.len())?;
            }
            for value in values.iter().take(max_items) {
                write!(dest, " {}", value)?;
            }
            if values.len() > max_items {
                write!(dest, " ...")?;
            }
        }
        TagData::Rationals(values) => {
            if values.len() != 1 {
                write!(dest, " <{}>", values.len())?;
            }
            for &(num, den) in values.iter().take(max_items) {
                write!(dest, " {} {}", num, den)?;
                if den != 0 {
                    write!(dest, " ({})", num as f64 / den as f64)?;
                }
            }
            if values.len() > max_items {
                write!(dest, " ...")?;
            }
        }
        TagData::Ascii(text) => {
            if text.chars().count() > max_text {
                let truncated: String = text.chars().take(max_text).collect();
                write!(dest, " {}...", truncated)?;
            } else {
                write!(dest, " {}", text)?;
            }
        }
        TagData::Bytes(bytes) => {
            write!(dest, " <{}>", bytes.len())?;
            let shown = bytes.iter().take(max_items);
            let hex: String = shown.map(|b| format!("{:02x}", b)).collect();
            write!(dest, " 0x{}", hex)?;
            if bytes.len() > max_items {
                write!(dest, " ...")?;
            }
        }
    }
    if tag.value == JPEG_TABLES_TAG as u32 {
        if let TagData::Bytes(bytes) = &entry.data {
            if let Some(quality) = estimate_jpeg_quality(bytes) {
                write!(dest, " (estimated quality: {})", quality)?;
            }
        }
    }
    if tag.value == GEO_KEY_DIRECTORY_TAG as u32 {
        if let Some(keys) = entry.data.integers() {
            for (name, value) in decode_geokeys(keys, ifd) {
                write!(dest, "\n{}    {}: {}", line_prefix, name, value)?;
            }
        }
    }
    writeln!(dest)?;
    Ok(())
}

/// Enum and bitfield decorations after an integer value
fn write_value_decorations(dest: &mut dyn Write, tag: &Tag, value: i64) -> TiffResult<()> {
    if let Some(enum_set) = tag.enum_set() {
        if value >= 0 {
            if let Some(name) = enum_set.name_for(value as u64) {
                write!(dest, " ({})", name)?;
            }
        }
    }
    if let Some(bitfield) = tag.bitfield() {
        if value > 0 {
            let names = bitfield.bit_names(value as u64);
            if !names.is_empty() {
                write!(dest, " ({})", names.join(", "))?;
            }
        }
    }
    Ok(())
}

/// JSON rendering of a parsed file
pub fn file_to_json(info: &TiffFile, max_items: usize) -> Value {
    json!({
        "bigEndian": info.big_endian,
        "bigtiff": info.bigtiff,
        "ndpi": info.ndpi,
        "header": info.header.iter().map(|b| *b as u64).collect::<Vec<u64>>(),
        "firstifd": info.first_ifd,
        "size": info.size,
        "ifds": ifds_to_json(&info.ifds, max_items, &TAG_SET),
    })
}

fn ifds_to_json(ifds: &[Directory], max_items: usize, tag_set: &'static TagSet) -> Value {
    let list: Vec<Value> = ifds
        .iter()
        .map(|ifd| {
            let mut tags = Map::new();
            for (&tag_id, entry) in &ifd.tags {
                let tag = tag_for_id(tag_id as u32, tag_set);
                let mut record = Map::new();
                record.insert("datatype".to_string(), json!(entry.datatype.code()));
                record.insert("count".to_string(), json!(entry.count));
                record.insert("datapos".to_string(), json!(entry.data_pos));
                if let Some(offset) = entry.offset {
                    record.insert("offset".to_string(), json!(offset));
                }
                record.insert("data".to_string(), data_to_json(&entry.data));
                if tag_id == JPEG_TABLES_TAG {
                    if let TagData::Bytes(bytes) = &entry.data {
                        record.insert(
                            "estimated_quality".to_string(),
                            json!(estimate_jpeg_quality(bytes)),
                        );
                    }
                }
                if tag_id == GEO_KEY_DIRECTORY_TAG {
                    if let Some(keys) = entry.data.integers() {
                        let mut geo = Map::new();
                        for (name, value) in decode_geokeys(keys, ifd) {
                            geo.insert(name.to_string(), json!(value.to_string()));
                        }
                        record.insert("geokeys".to_string(), Value::Object(geo));
                    }
                }
                if let Some(chains) = &entry.ifds {
                    let child_set = tag.nested_set().unwrap_or(&ANON_TAG_SET);
                    let rendered: Vec<Value> = chains
                        .iter()
                        .map(|chain| ifds_to_json(chain, max_items, child_set))
                        .collect();
                    record.insert("ifds".to_string(), Value::Array(rendered));
                }
                tags.insert(tag_id.to_string(), Value::Object(record));
            }
            json!({
                "offset": ifd.offset,
                "tagcount": ifd.tag_count,
                "bigEndian": ifd.big_endian,
                "bigtiff": ifd.bigtiff,
                "size": ifd.size,
                "tags": Value::Object(tags),
            })
        })
        .collect();
    Value::Array(list)
}

fn data_to_json(data: &TagData) -> Value {
    match data {
        TagData::Integers(values) => json!(values),
        TagData::Floats(values) => json!(values),
        TagData::Rationals(values) => {
            json!(values.iter().flat_map(|&(n, d)| [n, d]).collect::<Vec<i64>>())
        }
        TagData::Ascii(text) => json!(text),
        TagData::Bytes(bytes) => json!(bytes),
    }
}

/// Shallow YAML-like rendering keyed by tag name
pub fn dump_yaml(dest: &mut dyn Write, source: &str, info: &TiffFile) -> TiffResult<()> {
    writeln!(dest, "{}:", yaml_quote(source))?;
    for (idx, ifd) in info.ifds.iter().enumerate() {
        writeln!(dest, "  ifd{}:", idx)?;
        for (&tag_id, entry) in &ifd.tags {
            let tag = tag_for_id(tag_id as u32, &TAG_SET);
            let rendered = match &entry.data {
                TagData::Integers(values) => join_numbers(values),
                TagData::Floats(values) => join_numbers(values),
                TagData::Rationals(values) => values
                    .iter()
                    .map(|&(n, d)| format!("{}/{}", n, d))
                    .collect::<Vec<String>>()
                    .join(" "),
                TagData::Ascii(text) => yaml_quote(text),
                TagData::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            };
            writeln!(dest, "    {}: {}", tag.name(), rendered)?;
        }
    }
    Ok(())
}

fn join_numbers<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

fn yaml_quote(text: &str) -> String {
    if text.is_empty()
        || text
            .chars()
            .any(|c| matches!(c, ':' | '#' | '"' | '\'' | '\n') || c.is_control())
    {
        format!("{:?}", text)
    } else {
        text.to_string()
    }
}
