//! Tag editing command
//!
//! Sets, unsets, or copies tags at a selected directory of a TIFF file
//! and rewrites the file.  Tag specifiers take the form
//! `TAG[:DATATYPE][,<IFD-#>[,[<tag>:]<SubIFD-#>...]]`; values may be
//! literal text, numeric lists, or `@path` / `@-` indirection.  The
//! `projection` and `gcps` pseudo-keys expand into the GeoTIFF tag
//! triple and ModelTiepointTag before the ordinary sets run.

use std::path::Path;

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::write_options;
use crate::tiff::constants::{get_or_create_tag, parse_int_key, Datatype};
use crate::tiff::errors::{warning, TiffError, TiffResult};
use crate::tiff::geokeys::{encode_geokeys, GeoKeyValue};
use crate::tiff::reader::{read_tiff, select_ifd_mut, split_path_spec};
use crate::tiff::types::{TagData, TagEntry, TiffFile};
use crate::tiff::writer::write_tiff;
use crate::utils::value_utils::{ParsedValue, DATATYPE_PREFERENCE};

const MODEL_TIEPOINT_TAG: u16 = 33922;

/// Command for editing tags in place or into a new file
pub struct SetCommand {
    source: String,
    output: Option<String>,
    overwrite: bool,
    set_list: Vec<(String, String)>,
    unset_list: Vec<String>,
    set_from: Vec<(String, String)>,
    args_snapshot: SnapshotOptions,
}

/// The writer flags captured from the CLI, minus allow_existing which
/// depends on the destination chosen at execute time
struct SnapshotOptions {
    big_endian: Option<bool>,
    bigtiff: Option<bool>,
    dedup: bool,
    ifds_first: bool,
}

impl SetCommand {
    /// Create a new set command from CLI arguments
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        let source = args
            .get_one::<String>("source")
            .ok_or_else(|| TiffError::GenericError("Missing source file".to_string()))?
            .clone();
        let output = args.get_one::<String>("output").cloned();

        let pairs = |name: &str| -> Vec<(String, String)> {
            args.get_occurrences::<String>(name)
                .map(|occurrences| {
                    occurrences
                        .map(|mut pair| {
                            let tag = pair.next().cloned().unwrap_or_default();
                            let value = pair.next().cloned().unwrap_or_default();
                            (tag, value)
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        let unset_list = args
            .get_many::<String>("unset")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let options = write_options(args, false);
        Ok(SetCommand {
            source,
            output,
            overwrite: args.get_flag("overwrite"),
            set_list: pairs("set"),
            unset_list,
            set_from: pairs("setfrom"),
            args_snapshot: SnapshotOptions {
                big_endian: options.big_endian,
                bigtiff: options.bigtiff,
                dedup: options.dedup,
                ifds_first: options.ifds_first,
            },
        })
    }

    /// Runs the edit pipeline and writes the result to `output`
    fn apply(&self, output: &str, allow_existing: bool) -> TiffResult<()> {
        let mut info = read_tiff(&self.source)?;

        for tagspec in &self.unset_list {
            self.apply_unset(&mut info, tagspec)?;
        }
        // Pseudo-keys expand ahead of the ordinary sets so later sets
        // can override the tags they produce.
        for (tagspec, value) in &self.set_list {
            let (base, _, limits) = parse_tagspec(tagspec);
            if base.eq_ignore_ascii_case("projection") {
                self.apply_projection(&mut info, &limits, value)?;
            } else if base.eq_ignore_ascii_case("gcps") {
                self.apply_gcps(&mut info, &limits, value)?;
            }
        }
        for (tagspec, value) in &self.set_list {
            let (base, _, _) = parse_tagspec(tagspec);
            if base.eq_ignore_ascii_case("projection") || base.eq_ignore_ascii_case("gcps") {
                continue;
            }
            self.apply_set(&mut info, tagspec, value)?;
        }
        for (tagspec, tiffpath) in &self.set_from {
            self.apply_set_from(&mut info, tagspec, tiffpath)?;
        }

        let options = crate::tiff::writer::WriteOptions {
            big_endian: self.args_snapshot.big_endian,
            bigtiff: self.args_snapshot.bigtiff,
            allow_existing,
            dedup: self.args_snapshot.dedup,
            ifds_first: self.args_snapshot.ifds_first,
        };
        write_tiff(&info.ifds, output, &options)
    }

    fn apply_unset(&self, info: &mut TiffFile, tagspec: &str) -> TiffResult<()> {
        let (base, _, limits) = parse_tagspec(tagspec);
        let (dir, tag_set) = select_ifd_mut(info, &limits)?;
        let tag = get_or_create_tag(&base, tag_set, true, None)?;
        if dir.tags.remove(&(tag.value as u16)).is_none() {
            info!("Tag {} is not present", tag.label());
        }
        Ok(())
    }

    fn apply_set(&self, info: &mut TiffFile, tagspec: &str, value: &str) -> TiffResult<()> {
        let (base, datatype_spec, limits) = parse_tagspec(tagspec);
        let datatype = match &datatype_spec {
            Some(spec) => Some(Datatype::from_key(spec).ok_or_else(|| {
                TiffError::GenericError(format!("Unknown datatype {}", spec))
            })?),
            None => None,
        };
        let parsed = ParsedValue::parse(value)?;
        if let Some(datatype) = datatype {
            if !parsed.supports(datatype) {
                return Err(TiffError::DatatypeMismatch(format!(
                    "Value {:?} cannot be converted to datatype {}",
                    value, datatype
                )));
            }
        }
        let (dir, tag_set) = select_ifd_mut(info, &limits)?;
        let tag = get_or_create_tag(&base, tag_set, true, datatype)?;
        let registered = tag.datatypes();

        let mut chosen = datatype;
        if chosen.is_none() && !registered.is_empty() {
            chosen = registered.iter().copied().find(|dt| parsed.supports(*dt));
        }
        if chosen.is_none() {
            chosen = DATATYPE_PREFERENCE
                .iter()
                .copied()
                .find(|dt| parsed.supports(*dt));
        }
        let chosen = chosen.unwrap_or(Datatype::Undefined);
        if !registered.is_empty() && !registered.contains(&chosen) {
            warning(format!(
                "Value is datatype {} which is not a known datatype for tag {}",
                chosen,
                tag.label()
            ))?;
        }
        match parsed.get(chosen).cloned() {
            Some(data) => {
                if let (Some(enum_set), Some(values)) = (tag.enum_set(), data.integers()) {
                    if values.iter().any(|&v| v < 0 || !enum_set.contains(v as u64)) {
                        warning(format!(
                            "Value {:?} is not in known values for tag {}",
                            values,
                            tag.label()
                        ))?;
                    }
                }
                info!("Setting tag {} as {}", tag.label(), chosen);
                dir.tags.insert(tag.value as u16, TagEntry::new(chosen, data));
            }
            None => warning(format!("Could not determine data for tag {}", tagspec))?,
        }
        Ok(())
    }

    fn apply_set_from(&self, info: &mut TiffFile, tagspec: &str, tiffpath: &str) -> TiffResult<()> {
        let setinfo = read_tiff(tiffpath)?;
        let (base, _, limits) = parse_tagspec(tagspec);
        let (dir, tag_set) = select_ifd_mut(info, &limits)?;
        let tag = get_or_create_tag(&base, tag_set, true, None)?;
        match setinfo
            .ifds
            .first()
            .and_then(|ifd| ifd.tags.get(&(tag.value as u16)))
        {
            Some(entry) => {
                dir.tags.insert(tag.value as u16, entry.clone());
            }
            None => warning(format!("Tag {} is not in {}", tagspec, tiffpath))?,
        }
        Ok(())
    }

    /// Expands `projection` into the GeoTIFF key-directory triple
    ///
    /// The value carries already-converted GeoKeys as semicolon
    /// separated `Key=value` pairs; values may be numbers, number
    /// lists, or text for ASCII keys.
    fn apply_projection(
        &self,
        info: &mut TiffFile,
        limits: &[String],
        value: &str,
    ) -> TiffResult<()> {
        let entries = parse_geokey_assignments(value)?;
        let tag_entries = encode_geokeys(&entries)?;
        let (dir, _) = select_ifd_mut(info, limits)?;
        for (tag_id, entry) in tag_entries {
            dir.tags.insert(tag_id, entry);
        }
        Ok(())
    }

    /// Expands `gcps` into ModelTiepointTag
    ///
    /// Accepts flat numbers in groups of four (`pixel_x pixel_y
    /// world_x world_y`) or six (raw `i j k x y z` tiepoints).
    fn apply_gcps(&self, info: &mut TiffFile, limits: &[String], value: &str) -> TiffResult<()> {
        let normalized = value.replace(',', " ");
        let numbers: Vec<f64> = normalized
            .split_whitespace()
            .map(|part| {
                part.parse::<f64>()
                    .map_err(|_| TiffError::GenericError(format!("Invalid GCP value {}", part)))
            })
            .collect::<TiffResult<_>>()?;
        let tiepoints: Vec<f64> = if !numbers.is_empty() && numbers.len() % 6 == 0 {
            numbers
        } else if !numbers.is_empty() && numbers.len() % 4 == 0 {
            numbers
                .chunks_exact(4)
                .flat_map(|c| [c[0], c[1], 0.0, c[2], c[3], 0.0])
                .collect()
        } else {
            return Err(TiffError::GenericError(
                "GCPs must be groups of four (or six) values".to_string(),
            ));
        };
        let (dir, _) = select_ifd_mut(info, limits)?;
        dir.tags.insert(
            MODEL_TIEPOINT_TAG,
            TagEntry::new(Datatype::Double, TagData::Floats(tiepoints)),
        );
        Ok(())
    }
}

impl Command for SetCommand {
    fn execute(&self) -> TiffResult<()> {
        let (src_path, _) = split_path_spec(&self.source);
        let output = self.output.clone().unwrap_or_else(|| src_path.clone());
        if output != "-" && Path::new(&output).exists() && !self.overwrite {
            return Err(TiffError::FileAlreadyExists(output));
        }
        let same_file = self.source != "-"
            && output != "-"
            && std::fs::canonicalize(&src_path).ok() == std::fs::canonicalize(&output).ok()
            && std::fs::canonicalize(&src_path).is_ok();
        if same_file {
            // Editing in place goes through a temporary sibling so a
            // concurrent reader of the path sees pre- or post-state.
            let temp = format!("{}.set{}", output, std::process::id());
            let result = self.apply(&temp, false).and_then(|_| {
                let mut src = std::fs::File::open(&temp)?;
                let mut dest = std::fs::OpenOptions::new()
                    .write(true)
                    .truncate(true)
                    .open(&output)?;
                std::io::copy(&mut src, &mut dest)?;
                Ok(())
            });
            let _ = std::fs::remove_file(&temp);
            result
        } else {
            self.apply(&output, self.overwrite)
        }
    }
}

/// Splits `TAG[:DATATYPE][,<IFD-#>...]` into its parts
fn parse_tagspec(tagspec: &str) -> (String, Option<String>, Vec<String>) {
    let (head, limits) = match tagspec.split_once(',') {
        Some((head, rest)) => (
            head,
            rest.split(',').map(|s| s.to_string()).collect::<Vec<String>>(),
        ),
        None => (tagspec, Vec::new()),
    };
    match head.split_once(':') {
        Some((base, datatype)) => (base.to_string(), Some(datatype.to_string()), limits),
        None => (head.to_string(), None, limits),
    }
}

/// Parses semicolon-separated `Key=value` GeoKey assignments
fn parse_geokey_assignments(value: &str) -> TiffResult<Vec<(String, GeoKeyValue)>> {
    let mut entries = Vec::new();
    for part in value.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, raw) = part.split_once('=').ok_or_else(|| {
            TiffError::GenericError(format!("projection entries must be Key=value, got {}", part))
        })?;
        let normalized = raw.replace(',', " ");
        let numbers: Option<Vec<f64>> = normalized
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<f64>()
                    .ok()
                    .or_else(|| parse_int_key(token).map(|v| v as f64))
            })
            .collect();
        let geo_value = match numbers {
            Some(numbers) if !numbers.is_empty() => GeoKeyValue::Doubles(numbers),
            _ => GeoKeyValue::Text(raw.trim().to_string()),
        };
        entries.push((name.trim().to_string(), geo_value));
    }
    Ok(entries)
}
