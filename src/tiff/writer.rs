//! TIFF file writer implementation
//!
//! Serializes a list of directories into a self-contained TIFF, copying
//! pixel payloads verbatim from each directory's source stream.  The
//! writer starts in the caller's preferred dialect and, when a classic
//! serialization hits a 64-bit requirement, truncates the destination
//! and retries once with BigTIFF forced on.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::hash::Hasher;
use std::io::{BufWriter, Cursor, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::{SeekableReader, SeekableStream};
use crate::tiff::constants::{
    header, tag_for_id, Bytecounts, Datatype, TagSet, ANON_TAG_SET, TAG_SET,
};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::reader::check_offset;
use crate::tiff::types::{Directory, TagData, TagEntry};

const COPY_CHUNK: u64 = 1024 * 1024;

/// Caller preferences for a write pass
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Force big- or little-endian output; None keeps the first
    /// directory's byte order
    pub big_endian: Option<bool>,
    /// Force BigTIFF or classic output; None keeps the first directory's
    /// dialect, and classic promotes itself when it must
    pub bigtiff: Option<bool>,
    /// Permit overwriting an existing destination
    pub allow_existing: bool,
    /// Collapse identical payload blocks to one stored copy
    pub dedup: bool,
    /// Cluster directory records ahead of their data
    pub ifds_first: bool,
}

struct WriterState {
    handler: Box<dyn ByteOrderHandler>,
    big_endian: bool,
    bigtiff: bool,
    dedup: bool,
    ifds_first: bool,
    /// content hash -> destination offset of the stored copy
    dedup_table: HashMap<u64, u64>,
    /// (source identity, offset, length) -> content hash
    hash_memo: HashMap<(String, u64, u64), u64>,
    dedup_count: u64,
}

impl WriterState {
    fn new(big_endian: bool, bigtiff: bool, options: &WriteOptions) -> Self {
        WriterState {
            handler: ByteOrder::from_big_endian(big_endian).create_handler(),
            big_endian,
            bigtiff,
            dedup: options.dedup,
            ifds_first: options.ifds_first,
            dedup_table: HashMap::new(),
            hash_memo: HashMap::new(),
            dedup_count: 0,
        }
    }

    fn ptr_size(&self) -> u64 {
        if self.bigtiff {
            8
        } else {
            4
        }
    }

    /// Writes a value-or-offset pointer, failing over to BigTIFF when a
    /// classic pointer cannot hold it
    fn write_ptr(&self, dest: &mut dyn SeekableStream, value: u64) -> TiffResult<()> {
        if self.bigtiff {
            self.handler.write_u64(dest, value)?;
        } else {
            if value > u32::MAX as u64 {
                return Err(TiffError::MustBeBigTiff);
            }
            self.handler.write_u32(dest, value as u32)?;
        }
        Ok(())
    }

    fn append_ptr(&self, buffer: &mut Vec<u8>, value: u64) -> TiffResult<()> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_ptr(&mut cursor, value)?;
        buffer.extend_from_slice(cursor.get_ref());
        Ok(())
    }
}

/// Writes directories to a path, `-` meaning stdout
///
/// When the destination exists and overwriting is allowed, the write
/// goes to a temporary sibling which is then copied into place, so the
/// target inode is preserved and a concurrent reader sees either the
/// old or the new contents.
pub fn write_tiff(ifds: &[Directory], path: &str, options: &WriteOptions) -> TiffResult<()> {
    if path == "-" {
        let bytes = write_tiff_bytes(ifds, options)?;
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(&bytes)?;
        lock.flush()?;
        return Ok(());
    }

    let exists = Path::new(path).exists();
    if exists && !options.allow_existing {
        return Err(TiffError::FileAlreadyExists(path.to_string()));
    }
    if !exists {
        return write_tiff_file(ifds, path, options);
    }

    let temp_path = format!("{}.tmp{}", path, std::process::id());
    let result = write_tiff_file(ifds, &temp_path, options).and_then(|_| {
        let mut src = File::open(&temp_path)?;
        let mut dest = OpenOptions::new().write(true).truncate(true).open(path)?;
        std::io::copy(&mut src, &mut dest)?;
        Ok(())
    });
    let _ = std::fs::remove_file(&temp_path);
    result
}

fn write_tiff_file(ifds: &[Directory], path: &str, options: &WriteOptions) -> TiffResult<()> {
    let (big_endian, mut bigtiff) = resolve_flags(ifds, options)?;
    loop {
        // A fresh create truncates whatever the failed attempt left.
        let file = File::create(path)?;
        let mut dest = BufWriter::with_capacity(1024 * 1024, file);
        match serialize(ifds, &mut dest, big_endian, bigtiff, options) {
            Ok(()) => {
                dest.flush()?;
                return Ok(());
            }
            Err(TiffError::MustBeBigTiff) if !bigtiff => {
                info!("Classic serialization needs 64-bit storage; rewriting as BigTIFF");
                bigtiff = true;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Serializes directories into an in-memory buffer
pub fn write_tiff_bytes(ifds: &[Directory], options: &WriteOptions) -> TiffResult<Vec<u8>> {
    let (big_endian, mut bigtiff) = resolve_flags(ifds, options)?;
    loop {
        let mut dest = Cursor::new(Vec::new());
        match serialize(ifds, &mut dest, big_endian, bigtiff, options) {
            Ok(()) => return Ok(dest.into_inner()),
            Err(TiffError::MustBeBigTiff) if !bigtiff => {
                info!("Classic serialization needs 64-bit storage; rewriting as BigTIFF");
                bigtiff = true;
            }
            Err(err) => return Err(err),
        }
    }
}

fn resolve_flags(ifds: &[Directory], options: &WriteOptions) -> TiffResult<(bool, bool)> {
    let first = ifds
        .first()
        .ok_or_else(|| TiffError::GenericError("No IFDs to write".to_string()))?;
    Ok((
        options.big_endian.unwrap_or(first.big_endian),
        options.bigtiff.unwrap_or(first.bigtiff),
    ))
}

fn serialize(
    ifds: &[Directory],
    dest: &mut dyn SeekableStream,
    big_endian: bool,
    bigtiff: bool,
    options: &WriteOptions,
) -> TiffResult<()> {
    let mut state = WriterState::new(big_endian, bigtiff, options);

    dest.write_all(if big_endian { b"MM" } else { b"II" })?;
    let ifd_ptr = if bigtiff {
        state.handler.write_u16(dest, header::BIG_TIFF_VERSION)?;
        state.handler.write_u16(dest, header::BIGTIFF_OFFSET_SIZE)?;
        state.handler.write_u16(dest, 0)?;
        state.handler.write_u64(dest, 0)?;
        8
    } else {
        state.handler.write_u16(dest, header::TIFF_VERSION)?;
        state.handler.write_u32(dest, 0)?;
        4
    };

    let mut next_ptr = ifd_ptr;
    for dir in ifds {
        next_ptr = write_ifd(&mut state, dest, dir, next_ptr, &TAG_SET)?;
    }
    if state.dedup_count > 0 {
        debug!("Deduplicated {} payload blocks", state.dedup_count);
    }
    Ok(())
}

/// Writes one directory, returning the patch location for the next one
///
/// The default layout is data-first: each oversized value and each
/// offset-bearing payload is emitted ahead of the directory record.  In
/// IFDs-first mode the record's span is reserved up front and patched
/// afterwards, so records cluster near the start of the file.
fn write_ifd(
    state: &mut WriterState,
    dest: &mut dyn SeekableStream,
    dir: &Directory,
    ifd_ptr: u64,
    tag_set: &'static TagSet,
) -> TiffResult<u64> {
    let ptr_size = state.ptr_size();
    dest.seek(SeekFrom::End(0))?;

    // Entries serialize in ascending tag order; child-IFD tags with no
    // chains are dropped entirely.
    let mut entry_ids: Vec<u16> = Vec::with_capacity(dir.tags.len());
    for (&id, entry) in &dir.tags {
        let tag = tag_for_id(id as u32, tag_set);
        if tag.is_ifd() || entry.datatype.is_ifd() {
            let empty = entry
                .ifds
                .as_ref()
                .map(|chains| chains.is_empty())
                .unwrap_or(true);
            if empty {
                continue;
            }
        }
        entry_ids.push(id);
    }

    let count_len: u64 = if state.bigtiff { 8 } else { 2 };
    let entry_len: u64 = if state.bigtiff { 20 } else { 12 };
    let record_len = count_len + entry_len * entry_ids.len() as u64 + ptr_size;

    // In IFDs-first mode the record span is reserved before its data.
    let reserved_pos = if state.ifds_first {
        let mut pos = dest.seek(SeekFrom::End(0))?;
        if pos % 2 == 1 {
            dest.write_all(&[0])?;
            pos += 1;
        }
        dest.write_all(&vec![0u8; record_len as usize])?;
        Some(pos)
    } else {
        None
    };

    let mut record: Vec<u8> = Vec::with_capacity(record_len as usize);
    if state.bigtiff {
        let mut cursor = Cursor::new(Vec::new());
        state.handler.write_u64(&mut cursor, entry_ids.len() as u64)?;
        record.extend_from_slice(cursor.get_ref());
    } else {
        let mut cursor = Cursor::new(Vec::new());
        state.handler.write_u16(&mut cursor, entry_ids.len() as u16)?;
        record.extend_from_slice(cursor.get_ref());
    }

    // tag id -> patch location for the first child pointer; negative
    // values are relative to the directory-record start.
    let mut subifd_ptrs: Vec<(u16, i64)> = Vec::new();
    let mut src = dir.source.open_reader()?;

    for &tag_id in &entry_ids {
        let entry = &dir.tags[&tag_id];
        let tag = tag_for_id(tag_id as u32, tag_set);
        let is_ifd_tag = tag.is_ifd() || entry.datatype.is_ifd();

        let (datatype, data_bytes) = if is_ifd_tag {
            let chains = entry.ifds.as_ref().expect("checked above");
            let datatype = if state.bigtiff { Datatype::Ifd8 } else { Datatype::Ifd };
            (datatype, vec![0u8; chains.len() * ptr_size as usize])
        } else if tag.is_offset_data() {
            let offsets: Vec<i64> = entry.data.integers().map(|v| v.to_vec()).unwrap_or_default();
            let lengths: Vec<i64> = match tag.bytecounts() {
                Some(Bytecounts::Tag(name)) => {
                    let partner = tag_set.find(name).ok_or_else(|| {
                        TiffError::GenericError(format!("Unknown byte-count tag {}", name))
                    })?;
                    dir.tags
                        .get(&(partner.value as u16))
                        .and_then(|partner_entry| partner_entry.data.integers())
                        .map(|values| values.to_vec())
                        .ok_or_else(|| {
                            TiffError::GenericError(format!(
                                "Tag {} has no {} data",
                                tag.label(),
                                name
                            ))
                        })?
                }
                Some(Bytecounts::Fixed(length)) => vec![length as i64; offsets.len()],
                None => unreachable!("offset data implies bytecounts"),
            };
            let new_offsets =
                write_tag_data(state, dest, &mut *src, &offsets, &lengths, dir)?;
            if !state.bigtiff && new_offsets.iter().any(|&o| o > u32::MAX as i64) {
                return Err(TiffError::MustBeBigTiff);
            }
            let datatype = if state.bigtiff { Datatype::Long8 } else { Datatype::Long };
            let encoded = TagData::Integers(new_offsets).encode(datatype, state.big_endian)?;
            (datatype, encoded)
        } else {
            let datatype = downgrade_datatype(state, entry)?;
            (datatype, entry.data.encode(datatype, state.big_endian)?)
        };

        let count = data_bytes.len() as u64 / datatype.size();
        let mut tag_record: Vec<u8> = Vec::with_capacity(entry_len as usize);
        {
            let mut cursor = Cursor::new(Vec::new());
            state.handler.write_u16(&mut cursor, tag_id)?;
            state.handler.write_u16(&mut cursor, datatype.code())?;
            if state.bigtiff {
                state.handler.write_u64(&mut cursor, count)?;
            } else {
                if count > u32::MAX as u64 {
                    return Err(TiffError::MustBeBigTiff);
                }
                state.handler.write_u32(&mut cursor, count as u32)?;
            }
            tag_record.extend_from_slice(cursor.get_ref());
        }

        if data_bytes.len() as u64 <= ptr_size {
            if is_ifd_tag {
                subifd_ptrs.push((tag_id, -((record.len() + tag_record.len()) as i64)));
            }
            tag_record.extend_from_slice(&data_bytes);
            tag_record.resize((entry_len) as usize, 0);
        } else {
            let mut pos = dest.seek(SeekFrom::End(0))?;
            if pos % 2 == 1 {
                dest.write_all(&[0])?;
                pos += 1;
            }
            if is_ifd_tag {
                subifd_ptrs.push((tag_id, pos as i64));
                state.append_ptr(&mut tag_record, pos)?;
                dest.write_all(&data_bytes)?;
            } else if state.dedup {
                // Out-of-line values participate in dedup too.
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                hasher.write(&data_bytes);
                let digest = hasher.finish();
                if let Some(&existing) = state.dedup_table.get(&digest) {
                    state.dedup_count += 1;
                    state.append_ptr(&mut tag_record, existing)?;
                } else {
                    state.dedup_table.insert(digest, pos);
                    state.append_ptr(&mut tag_record, pos)?;
                    dest.write_all(&data_bytes)?;
                }
            } else {
                state.append_ptr(&mut tag_record, pos)?;
                dest.write_all(&data_bytes)?;
            }
        }
        record.extend_from_slice(&tag_record);
    }

    // Place the record, patch the incoming pointer, write the trailer.
    let record_pos = match reserved_pos {
        Some(pos) => pos,
        None => {
            let mut pos = dest.seek(SeekFrom::End(0))?;
            if pos % 2 == 1 {
                dest.write_all(&[0])?;
                pos += 1;
            }
            pos
        }
    };
    dest.seek(SeekFrom::Start(ifd_ptr))?;
    state.write_ptr(dest, record_pos)?;
    dest.seek(SeekFrom::Start(record_pos))?;
    dest.write_all(&record)?;
    let next_ifd_ptr = dest.seek(SeekFrom::Current(0))?;
    state.write_ptr(dest, 0)?;
    dest.seek(SeekFrom::End(0))?;

    write_sub_ifds(state, dest, dir, record_pos, &subifd_ptrs, tag_set)?;

    if !state.bigtiff && dest.seek(SeekFrom::End(0))? >= 1 << 32 {
        return Err(TiffError::MustBeBigTiff);
    }
    Ok(next_ifd_ptr)
}

/// Narrows 64-bit datatypes to 32-bit ones in classic output
fn downgrade_datatype(state: &WriterState, entry: &TagEntry) -> TiffResult<Datatype> {
    if state.bigtiff {
        return Ok(entry.datatype);
    }
    match entry.datatype {
        Datatype::Long8 => {
            let values = entry.data.integers().unwrap_or(&[]);
            if values.iter().all(|&v| (0..=u32::MAX as i64).contains(&v)) {
                Ok(Datatype::Long)
            } else {
                Err(TiffError::MustBeBigTiff)
            }
        }
        Datatype::SLong8 => {
            let values = entry.data.integers().unwrap_or(&[]);
            if values
                .iter()
                .all(|&v| (i32::MIN as i64..=i32::MAX as i64).contains(&v))
            {
                Ok(Datatype::SLong)
            } else {
                Err(TiffError::MustBeBigTiff)
            }
        }
        datatype => Ok(datatype),
    }
}

/// Writes every chain of child directories a directory carries
///
/// The recorded patch locations receive each chain's first-IFD offset;
/// successive chains advance the patch location by one pointer width.
fn write_sub_ifds(
    state: &mut WriterState,
    dest: &mut dyn SeekableStream,
    dir: &Directory,
    parent_pos: u64,
    subifd_ptrs: &[(u16, i64)],
    tag_set: &'static TagSet,
) -> TiffResult<()> {
    let ptr_size = state.ptr_size();
    for &(tag_id, ptr) in subifd_ptrs {
        let mut patch_pos = if ptr < 0 {
            parent_pos + (-ptr) as u64
        } else {
            ptr as u64
        };
        let tag = tag_for_id(tag_id as u32, tag_set);
        let child_set = tag.nested_set().unwrap_or(&ANON_TAG_SET);
        let chains = match dir.tags.get(&tag_id).and_then(|entry| entry.ifds.as_ref()) {
            Some(chains) => chains,
            None => continue,
        };
        for chain in chains {
            let mut next_ptr = patch_pos;
            for child in chain {
                next_ptr = write_ifd(state, dest, child, next_ptr, child_set)?;
            }
            patch_pos += ptr_size;
        }
    }
    Ok(())
}

/// Copies payload blocks from a source to the destination
///
/// Blocks are visited in ascending source order so the source streams
/// sequentially, but the returned offsets preserve the original index
/// order.  Adjacent source ranges merge into one copy, an exactly
/// repeated block reuses the previous destination, unreadable blocks
/// become zero offsets, and (with dedup on) identical contents collapse
/// to a single stored copy.
fn write_tag_data(
    state: &mut WriterState,
    dest: &mut dyn SeekableStream,
    src: &mut dyn SeekableReader,
    offsets: &[i64],
    lengths: &[i64],
    dir: &Directory,
) -> TiffResult<Vec<i64>> {
    if offsets.len() != lengths.len() {
        return Err(TiffError::OffsetsAndCountsMismatch(
            offsets.len(),
            lengths.len(),
        ));
    }
    let mut dest_offsets = vec![0i64; offsets.len()];
    let mut order: Vec<(u64, usize)> = offsets
        .iter()
        .enumerate()
        .filter(|(_, &offset)| offset != 0)
        .map(|(idx, &offset)| (offset as u64, idx))
        .collect();
    order.sort();

    let src_id = dir.source.identity();
    let mut i = 0;
    while i < order.len() {
        let (offset, idx) = order[i];
        let length = lengths[idx].max(0) as u64;
        if i > 0 {
            let (prev_offset, prev_idx) = order[i - 1];
            if prev_offset == offset
                && lengths[prev_idx] == lengths[idx]
                && dest_offsets[prev_idx] != 0
            {
                dest_offsets[idx] = dest_offsets[prev_idx];
                i += 1;
                continue;
            }
        }
        if !check_offset(dir.size, offset, length)? {
            i += 1;
            continue;
        }

        if state.dedup {
            let digest = block_hash(state, src, &src_id, offset, length)?;
            if let Some(&existing) = state.dedup_table.get(&digest) {
                dest_offsets[idx] = existing as i64;
                state.dedup_count += 1;
                i += 1;
                continue;
            }
            let dest_pos = dest.seek(SeekFrom::End(0))?;
            dest_offsets[idx] = dest_pos as i64;
            copy_block(dest, src, offset, length)?;
            state.dedup_table.insert(digest, dest_pos);
            i += 1;
            continue;
        }

        // Merge the run of adjacent source ranges into one copy.
        let run_dest = dest.seek(SeekFrom::End(0))?;
        dest_offsets[idx] = run_dest as i64;
        let mut run_end = offset + length;
        let mut j = i + 1;
        while j < order.len() {
            let (next_offset, next_idx) = order[j];
            let next_length = lengths[next_idx].max(0) as u64;
            if next_offset != run_end || !check_offset(dir.size, next_offset, next_length)? {
                break;
            }
            dest_offsets[next_idx] = (run_dest + (next_offset - offset)) as i64;
            run_end += next_length;
            j += 1;
        }
        copy_block(dest, src, offset, run_end - offset)?;
        i = j;
    }
    Ok(dest_offsets)
}

fn copy_block(
    dest: &mut dyn SeekableStream,
    src: &mut dyn SeekableReader,
    offset: u64,
    length: u64,
) -> TiffResult<()> {
    src.seek(SeekFrom::Start(offset))?;
    let mut remaining = length;
    let mut buffer = vec![0u8; COPY_CHUNK.min(remaining.max(1)) as usize];
    while remaining > 0 {
        let chunk = COPY_CHUNK.min(remaining) as usize;
        src.read_exact(&mut buffer[..chunk])?;
        dest.write_all(&buffer[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}

/// Hashes a source block, memoized per (source, offset, length)
fn block_hash(
    state: &mut WriterState,
    src: &mut dyn SeekableReader,
    src_id: &str,
    offset: u64,
    length: u64,
) -> TiffResult<u64> {
    let key = (src_id.to_string(), offset, length);
    if let Some(&digest) = state.hash_memo.get(&key) {
        return Ok(digest);
    }
    src.seek(SeekFrom::Start(offset))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    let mut remaining = length;
    let mut buffer = vec![0u8; COPY_CHUNK.min(remaining.max(1)) as usize];
    while remaining > 0 {
        let chunk = COPY_CHUNK.min(remaining) as usize;
        src.read_exact(&mut buffer[..chunk])?;
        hasher.write(&buffer[..chunk]);
        remaining -= chunk as u64;
    }
    let digest = hasher.finish();
    state.hash_memo.insert(key, digest);
    Ok(digest)
}
