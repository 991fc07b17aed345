//! TIFF file reader implementation
//!
//! Parses the header, walks the top-level IFD chain, recurses through
//! SubIFD-style tags, and resolves every tag payload into the in-memory
//! tree.  Pixel payloads referenced by offset-bearing tags are not
//! loaded; their offsets stay in the tree and the bytes stay in the
//! source stream.

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::io::source::DataSource;
use crate::tiff::constants::{
    header, tag_for_id, get_or_create_tag, TagSet, ANON_TAG_SET, TAG_SET,
};
use crate::tiff::errors::{warning, TiffError, TiffResult};
use crate::tiff::types::{Directory, TagData, TagEntry, TiffFile};

/// Checks whether a byte range can be read from the source
///
/// The minimum offset is the length of the TIFF header.  A violation is
/// a warning, not a failure; the affected data is skipped and rewrites
/// as a zero-offset placeholder.
pub fn check_offset(filelen: u64, offset: u64, length: u64) -> TiffResult<bool> {
    let allowed = offset >= 8 && offset.checked_add(length).map_or(false, |end| end <= filelen);
    if !allowed {
        warning(format!(
            "Cannot read {} (0x{:x}) bytes from desired offset {} (0x{:x})",
            length, length, offset, offset
        ))?;
    }
    Ok(allowed)
}

struct ReaderState {
    handler: Box<dyn ByteOrderHandler>,
    big_endian: bool,
    bigtiff: bool,
    ndpi: bool,
    size: u64,
    source: DataSource,
}

impl ReaderState {
    fn entry_slot_len(&self) -> u64 {
        if self.bigtiff {
            8
        } else {
            4
        }
    }
}

/// Reads the structure of a TIFF from a path argument
///
/// The path may carry a selection suffix of the form
/// `file,<IFD #>[,[<tag>:]<SubIFD #>[,<IFD #>...]]`.  Because file names
/// can themselves contain commas, progressively shorter prefixes are
/// tried until one matches an existing file; the remaining components
/// select a subtree of the result.  `-` reads from stdin.
pub fn read_tiff(path_spec: &str) -> TiffResult<TiffFile> {
    let (path, limits) = split_path_spec(path_spec);
    let source = DataSource::from_arg(&path)?;
    let info = read_tiff_source(source)?;
    if limits.is_empty() {
        Ok(info)
    } else {
        limit_ifds(info, &limits)
    }
}

/// Splits a path-plus-suffix argument into a path and selection components
pub fn split_path_spec(path_spec: &str) -> (String, Vec<String>) {
    if path_spec == "-" || !path_spec.contains(',') {
        return (path_spec.to_string(), Vec::new());
    }
    let parts: Vec<&str> = path_spec.split(',').collect();
    for splits in 1..parts.len() {
        let prefix = parts[..parts.len() - splits].join(",");
        if Path::new(&prefix).exists() {
            let limits = parts[parts.len() - splits..]
                .iter()
                .map(|s| s.to_string())
                .collect();
            return (prefix, limits);
        }
    }
    (path_spec.to_string(), Vec::new())
}

/// Reads the structure of a TIFF from an already-located source
pub fn read_tiff_source(source: DataSource) -> TiffResult<TiffFile> {
    let mut stream = source.open_reader()?;
    let size = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(0))?;

    let mut header_bytes = [0u8; 4];
    stream.read_exact(&mut header_bytes)?;
    let (big_endian, bigtiff) = match &header_bytes {
        b"II\x2a\x00" => (false, false),
        b"MM\x00\x2a" => (true, false),
        b"II\x2b\x00" => (false, true),
        b"MM\x00\x2b" => (true, true),
        _ => return Err(TiffError::UnknownHeader),
    };
    debug!(
        "Detected {} {}",
        ByteOrder::from_big_endian(big_endian).name(),
        if bigtiff { "BigTIFF" } else { "classic TIFF" }
    );

    let handler = ByteOrder::from_big_endian(big_endian).create_handler();
    let first_ifd = if bigtiff {
        let offset_size = handler.read_u16(&mut *stream)?;
        let zero = handler.read_u16(&mut *stream)?;
        if offset_size != header::BIGTIFF_OFFSET_SIZE || zero != 0 {
            return Err(TiffError::GenericError("Unexpected offset size".to_string()));
        }
        handler.read_u64(&mut *stream)?
    } else {
        handler.read_u32(&mut *stream)? as u64
    };

    let mut state = ReaderState {
        handler,
        big_endian,
        bigtiff,
        ndpi: false,
        size,
        source: source.clone(),
    };

    let mut ifds = Vec::new();
    let mut next_ifd = first_ifd;
    let mut seen = HashSet::new();
    while next_ifd != 0 {
        if !seen.insert(next_ifd) {
            warning(format!("IFD chain loops at offset {}", next_ifd))?;
            break;
        }
        match read_ifd(&mut state, &mut *stream, next_ifd, &TAG_SET)? {
            Some((dir, next)) => {
                ifds.push(dir);
                next_ifd = next;
            }
            None => break,
        }
    }
    info!("Read {} IFDs from {}", ifds.len(), source.describe());

    Ok(TiffFile {
        header: header_bytes,
        big_endian,
        bigtiff,
        ndpi: state.ndpi,
        first_ifd,
        size,
        ifds,
        source,
        reduction: None,
    })
}

/// Reads one IFD and everything hanging off it
///
/// Returns the directory plus the next-directory pointer from its
/// trailer, or None when the offset fails its bounds check and the
/// chain should stop.
fn read_ifd(
    state: &mut ReaderState,
    stream: &mut dyn SeekableReader,
    ifd_offset: u64,
    tag_set: &'static TagSet,
) -> TiffResult<Option<(Directory, u64)>> {
    let min_size = if state.bigtiff { 16 } else { 6 };
    if !check_offset(state.size, ifd_offset, min_size)? {
        return Ok(None);
    }
    stream.seek(SeekFrom::Start(ifd_offset))?;

    let mut dir = Directory::new(
        state.source.clone(),
        state.size,
        state.big_endian,
        state.bigtiff,
        ifd_offset,
    );
    dir.tag_count = if state.bigtiff {
        state.handler.read_u64(stream)?
    } else {
        state.handler.read_u16(stream)? as u64
    };
    debug!("IFD at {} with {} entries", ifd_offset, dir.tag_count);

    for _ in 0..dir.tag_count {
        let tag_id = state.handler.read_u16(stream)?;
        let datatype_id = state.handler.read_u16(stream)?;
        let count = if state.bigtiff {
            state.handler.read_u64(stream)?
        } else {
            state.handler.read_u32(stream)? as u64
        };
        let data_pos = stream.seek(SeekFrom::Current(0))?;
        let data_value = if state.bigtiff {
            state.handler.read_u64(stream)?
        } else {
            state.handler.read_u32(stream)? as u64
        };

        let datatype = match crate::tiff::constants::Datatype::from_code(datatype_id) {
            Some(datatype) => datatype,
            None => {
                warning(format!(
                    "Unknown datatype {} (0x{:X}) in tag {} (0x{:X})",
                    datatype_id, datatype_id, tag_id, tag_id
                ))?;
                continue;
            }
        };
        let total_len = count.checked_mul(datatype.size()).unwrap_or(u64::MAX);
        let offset = if total_len > state.entry_slot_len() {
            Some(data_value)
        } else {
            None
        };
        if let Some(existing) = dir.tags.get(&tag_id) {
            warning(format!(
                "Duplicate tag {}: data at {} and {}",
                tag_id, existing.data_pos, data_pos
            ))?;
        }
        let tag = tag_for_id(tag_id as u32, tag_set);
        if tag.is_ndpi_offset() && state.size >= 1 << 32 {
            if !state.ndpi {
                info!("Treating file as NDPI with 64-bit offsets");
            }
            state.ndpi = true;
        }
        dir.tags.insert(
            tag_id,
            TagEntry {
                datatype,
                count,
                data_pos,
                offset,
                data: TagData::Bytes(Vec::new()),
                ifds: None,
            },
        );
    }

    // NDPI-extended files carry a 64-bit next pointer despite the
    // classic header.
    let next_ifd = if state.bigtiff || state.ndpi {
        state.handler.read_u64(stream)?
    } else {
        state.handler.read_u32(stream)? as u64
    };

    read_ifd_tag_data(state, stream, &mut dir, tag_set)?;
    Ok(Some((dir, next_ifd)))
}

/// Resolves tag payloads and recurses into child directories
fn read_ifd_tag_data(
    state: &mut ReaderState,
    stream: &mut dyn SeekableReader,
    dir: &mut Directory,
    tag_set: &'static TagSet,
) -> TiffResult<()> {
    let tag_ids: Vec<u16> = dir.tags.keys().copied().collect();
    for tag_id in tag_ids {
        let tag = tag_for_id(tag_id as u32, tag_set);
        let (datatype, count, data_pos, offset) = {
            let entry = dir.tags.get(&tag_id).expect("tag id just listed");
            (entry.datatype, entry.count, entry.data_pos, entry.offset)
        };
        let total_len = count.checked_mul(datatype.size()).unwrap_or(u64::MAX);
        let mut pos = offset.unwrap_or(data_pos);
        if state.ndpi && offset.is_some() && pos < dir.offset {
            // Recover the true 64-bit offset from its 32-bit-wrapped field.
            pos = dir.offset - ((dir.offset - pos) % (1 << 32));
        }
        if !check_offset(state.size, pos, total_len)? {
            continue;
        }
        stream.seek(SeekFrom::Start(pos))?;
        let mut raw = vec![0u8; total_len as usize];
        stream.read_exact(&mut raw)?;
        let data = TagData::decode(&raw, datatype, state.big_endian);

        let is_ifd = tag.is_ifd() || datatype.is_ifd();
        if is_ifd {
            let child_offsets: Vec<u64> = data
                .integers()
                .map(|values| values.iter().map(|&v| v as u64).collect())
                .unwrap_or_default();
            let child_set = tag.nested_set().unwrap_or(&ANON_TAG_SET);
            let mut chains: Vec<Vec<Directory>> = Vec::new();
            for (sub_idx, &sub_offset) in child_offsets.iter().enumerate() {
                let mut chain = Vec::new();
                let mut next = sub_offset;
                while next != 0 {
                    match read_ifd(state, stream, next, child_set)? {
                        Some((child, next_offset)) => {
                            chain.push(child);
                            next = next_offset;
                        }
                        None => break,
                    }
                    if sub_idx + 1 < child_offsets.len() && next == child_offsets[sub_idx + 1] {
                        warning("SubIFDs are double referenced".to_string())?;
                        break;
                    }
                }
                chains.push(chain);
            }
            let entry = dir.tags.get_mut(&tag_id).expect("tag id just listed");
            entry.data = data;
            entry.ifds = Some(chains);
        } else {
            let entry = dir.tags.get_mut(&tag_id).expect("tag id just listed");
            entry.data = data;
        }
    }
    Ok(())
}

/// Reduces a file's view to the subtree a limit list selects
///
/// The list alternates between `<IFD #>` and `[tag:]<SubIFD #>`
/// components.  Applying the same selection twice yields the same view.
pub fn limit_ifds(info: TiffFile, limits: &[String]) -> TiffResult<TiffFile> {
    let (mut reduced, _) = limit_ifds_inner(info, limits, &TAG_SET)?;
    reduced.reduction = Some(limits.to_vec());
    Ok(reduced)
}

fn limit_ifds_inner(
    mut info: TiffFile,
    limits: &[String],
    tag_set: &'static TagSet,
) -> TiffResult<(TiffFile, &'static TagSet)> {
    if limits.is_empty() {
        return Ok((info, tag_set));
    }
    let index: usize = limits[0]
        .trim()
        .parse()
        .map_err(|_| TiffError::GenericError(format!("Invalid IFD index {}", limits[0])))?;
    let ifd = info
        .ifds
        .get(index)
        .ok_or_else(|| TiffError::GenericError(format!("No IFD {} in file", index)))?;
    let (ifds, next_set) = if limits.len() > 1 {
        let (tag_name, sub_index) = match limits[1].split_once(':') {
            Some((name, idx)) => (name.to_string(), idx.to_string()),
            None => ("SubIFD".to_string(), limits[1].clone()),
        };
        let sub_index: usize = sub_index.trim().parse().map_err(|_| {
            TiffError::GenericError(format!("Invalid SubIFD index {}", limits[1]))
        })?;
        let tag = get_or_create_tag(&tag_name, tag_set, true, None)?;
        let chains = ifd
            .tags
            .get(&(tag.value as u16))
            .and_then(|entry| entry.ifds.as_ref())
            .ok_or_else(|| {
                TiffError::GenericError(format!("IFD {} has no {} directories", index, tag.name()))
            })?;
        let chain = chains.get(sub_index).ok_or_else(|| {
            TiffError::GenericError(format!(
                "No {} chain {} in IFD {}",
                tag.name(),
                sub_index,
                index
            ))
        })?;
        (chain.clone(), tag.nested_set().unwrap_or(&ANON_TAG_SET))
    } else {
        (vec![ifd.clone()], tag_set)
    };
    info.ifds = ifds;
    limit_ifds_inner(info, limits.get(2..).unwrap_or(&[]), next_set)
}

/// Resolves a limit list into a mutable reference to one directory
///
/// This is the selector the set transform uses: the returned directory
/// aliases the tree, so edits land in place.  An empty list selects the
/// first top-level IFD.
pub fn select_ifd_mut<'a>(
    info: &'a mut TiffFile,
    limits: &[String],
) -> TiffResult<(&'a mut Directory, &'static TagSet)> {
    descend_mut(&mut info.ifds, limits, &TAG_SET)
}

fn descend_mut<'a>(
    list: &'a mut Vec<Directory>,
    limits: &[String],
    tag_set: &'static TagSet,
) -> TiffResult<(&'a mut Directory, &'static TagSet)> {
    let index: usize = match limits.first() {
        Some(record) => record
            .trim()
            .parse()
            .map_err(|_| TiffError::GenericError(format!("Invalid IFD index {}", record)))?,
        None => 0,
    };
    let list_len = list.len();
    let dir = list.get_mut(index).ok_or_else(|| {
        TiffError::GenericError(format!("No IFD {} (of {}) in file", index, list_len))
    })?;
    let rest = limits.get(1..).unwrap_or(&[]);
    if rest.is_empty() {
        return Ok((dir, tag_set));
    }

    let (tag_name, sub_index) = match rest[0].split_once(':') {
        Some((name, idx)) => (name.to_string(), idx.to_string()),
        None => ("SubIFD".to_string(), rest[0].clone()),
    };
    let sub_index: usize = sub_index
        .trim()
        .parse()
        .map_err(|_| TiffError::GenericError(format!("Invalid SubIFD index {}", rest[0])))?;
    let tag = get_or_create_tag(&tag_name, tag_set, true, None)?;
    let child_set = tag.nested_set().unwrap_or(&ANON_TAG_SET);
    let tag_label = tag.label();
    let chains = dir
        .tags
        .get_mut(&(tag.value as u16))
        .and_then(|entry| entry.ifds.as_mut())
        .ok_or_else(|| TiffError::GenericError(format!("IFD has no {} directories", tag_label)))?;
    let chain = chains.get_mut(sub_index).ok_or_else(|| {
        TiffError::GenericError(format!("No {} chain {}", tag_label, sub_index))
    })?;
    descend_mut(chain, rest.get(1..).unwrap_or(&[]), child_set)
}
