//! CLI command implementations
//!
//! This module contains implementations of the subcommands supported by
//! the CLI application using the Command pattern.

pub mod command_traits;
pub mod concat_command;
pub mod dump_command;
pub mod set_command;
pub mod split_command;

pub use command_traits::{Command, CommandFactory};
pub use concat_command::ConcatCommand;
pub use dump_command::DumpCommand;
pub use set_command::SetCommand;
pub use split_command::SplitCommand;

use clap::ArgMatches;

use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::writer::WriteOptions;

/// Factory for creating command instances based on CLI arguments
pub struct TiffkitCommandFactory;

impl TiffkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        TiffkitCommandFactory
    }
}

impl Default for TiffkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for TiffkitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> TiffResult<Box<dyn Command>> {
        match args.subcommand() {
            Some(("dump", sub)) => Ok(Box::new(DumpCommand::new(sub)?)),
            Some(("split", sub)) => Ok(Box::new(SplitCommand::new(sub)?)),
            Some(("concat", sub)) => Ok(Box::new(ConcatCommand::new(sub)?)),
            Some(("set", sub)) => Ok(Box::new(SetCommand::new(sub)?)),
            _ => Err(TiffError::GenericError("No subcommand given".to_string())),
        }
    }
}

/// Builds writer options from the global output flags
pub fn write_options(args: &ArgMatches, allow_existing: bool) -> WriteOptions {
    WriteOptions {
        big_endian: flag_pair(args, "bigendian", "littleendian"),
        bigtiff: flag_pair(args, "bigtiff", "classic"),
        allow_existing,
        dedup: args.get_flag("dedup"),
        ifds_first: args.get_flag("ifds-first"),
    }
}

/// Resolves a pair of opposing boolean flags into an override
fn flag_pair(args: &ArgMatches, on: &str, off: &str) -> Option<bool> {
    if args.get_flag(on) {
        Some(true)
    } else if args.get_flag(off) {
        Some(false)
    } else {
        None
    }
}
