//! Interfaces shared by the CLI subcommands
//!
//! Each subcommand (dump, split, concat, set) captures its arguments
//! into a command object up front, so argument problems surface before
//! any TIFF is opened and the transforms themselves stay testable
//! without a terminal.

use crate::tiff::errors::TiffResult;

/// One runnable TIFF operation with its arguments already validated
///
/// Executing a command reads the source tree(s), applies the
/// transform, and writes or prints the result; any failure is
/// reported through the ordinary error taxonomy.
pub trait Command {
    /// Run the operation to completion
    fn execute(&self) -> TiffResult<()>;
}

/// Maps parsed CLI matches onto the command that should run
///
/// Keeping construction behind a factory lets the binary stay a thin
/// shell: it parses arguments, asks for a command, and executes it.
pub trait CommandFactory {
    /// Build the command selected by the given subcommand matches
    fn create_command(&self, args: &clap::ArgMatches) -> TiffResult<Box<dyn Command>>;
}
