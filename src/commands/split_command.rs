//! Directory splitting command
//!
//! Writes each directory of a source file (optionally recursing through
//! SubIFDs) into its own single-directory output file.  Output names
//! share a prefix and append a fixed-width lowercase base-26 counter
//! before `.tif`.

use std::path::Path;

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::write_options;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::reader::read_tiff;
use crate::tiff::types::Directory;
use crate::tiff::writer::{write_tiff, WriteOptions};

const SUBIFD_TAG: u16 = 330;

/// Command for splitting a file into per-directory files
pub struct SplitCommand {
    source: String,
    prefix: Option<String>,
    subifds: bool,
    overwrite: bool,
    options: WriteOptions,
}

impl SplitCommand {
    /// Create a new split command from CLI arguments
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        let source = args
            .get_one::<String>("source")
            .ok_or_else(|| TiffError::GenericError("Missing source file".to_string()))?
            .clone();
        let prefix = args.get_one::<String>("prefix").cloned();
        let overwrite = args.get_flag("overwrite");
        Ok(SplitCommand {
            source,
            prefix,
            subifds: args.get_flag("subifds"),
            overwrite,
            options: write_options(args, overwrite),
        })
    }
}

impl Command for SplitCommand {
    fn execute(&self) -> TiffResult<()> {
        let info = read_tiff(&self.source)?;
        let mut selected: Vec<&Directory> = Vec::new();
        collect_ifds(&info.ifds, self.subifds, &mut selected);
        if selected.is_empty() {
            return Err(TiffError::GenericError(
                "No directories to split".to_string(),
            ));
        }
        let prefix = self.prefix.as_deref().unwrap_or("./");
        let width = counter_width(selected.len());

        if !self.overwrite {
            for idx in 0..selected.len() {
                let path = make_split_name(prefix, idx, width);
                if Path::new(&path).exists() {
                    return Err(TiffError::FileAlreadyExists(path));
                }
            }
        }

        for (idx, ifd) in selected.into_iter().enumerate() {
            let path = make_split_name(prefix, idx, width);
            let mut single = ifd.clone();
            if self.subifds {
                // Children become top-level files of their own.
                single.tags.remove(&SUBIFD_TAG);
            }
            info!("Writing {}", path);
            write_tiff(&[single], &path, &self.options)?;
        }
        Ok(())
    }
}

/// Collects directories in order, recursing SubIFD chains when asked
fn collect_ifds<'a>(ifds: &'a [Directory], subifds: bool, out: &mut Vec<&'a Directory>) {
    for ifd in ifds {
        out.push(ifd);
        if subifds {
            if let Some(chains) = ifd.tags.get(&SUBIFD_TAG).and_then(|entry| entry.ifds.as_ref()) {
                for chain in chains {
                    collect_ifds(chain, subifds, out);
                }
            }
        }
    }
}

/// The counter width needed for uniqueness, at least three characters
fn counter_width(count: usize) -> usize {
    let mut width = 1;
    let mut capacity = 26usize;
    while capacity < count {
        width += 1;
        capacity = capacity.saturating_mul(26);
    }
    width.max(3)
}

/// Builds `<prefix><base-26 counter>.tif`
fn make_split_name(prefix: &str, mut num: usize, width: usize) -> String {
    let mut suffix = String::from(".tif");
    for _ in 0..width {
        suffix.insert(0, (b'a' + (num % 26) as u8) as char);
        num /= 26;
    }
    format!("{}{}", prefix, suffix)
}
