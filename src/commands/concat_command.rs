//! Directory concatenation command
//!
//! Reads each source file and writes a single output whose IFD list is
//! the concatenation of the source IFD lists in order.  Every output
//! directory keeps its back-reference to the file it came from, so
//! pixel payloads are copied from the correct source.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::write_options;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::reader::read_tiff;
use crate::tiff::types::Directory;
use crate::tiff::writer::{write_tiff, WriteOptions};

/// Command for concatenating the directories of several files
pub struct ConcatCommand {
    sources: Vec<String>,
    output: String,
    options: WriteOptions,
}

impl ConcatCommand {
    /// Create a new concat command from CLI arguments
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        let sources: Vec<String> = args
            .get_many::<String>("source")
            .ok_or_else(|| TiffError::GenericError("Missing source files".to_string()))?
            .cloned()
            .collect();
        let output = args
            .get_one::<String>("output")
            .ok_or_else(|| TiffError::GenericError("Missing output file".to_string()))?
            .clone();
        let options = write_options(args, args.get_flag("overwrite"));
        Ok(ConcatCommand {
            sources,
            output,
            options,
        })
    }
}

impl Command for ConcatCommand {
    fn execute(&self) -> TiffResult<()> {
        let mut ifds: Vec<Directory> = Vec::new();
        for source in &self.sources {
            let info = read_tiff(source)?;
            ifds.extend(info.ifds);
        }
        info!(
            "Concatenating {} directories into {}",
            ifds.len(),
            self.output
        );
        write_tiff(&ifds, &self.output, &self.options)
    }
}
