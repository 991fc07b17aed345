use clap::{Arg, ArgAction, Command as ClapCommand};
use log::{error, LevelFilter};
use std::process;

use tiffkit::commands::{CommandFactory, TiffkitCommandFactory};
use tiffkit::tiff::errors::set_stop_on_warning;

/// Flags recognized on every subcommand
fn global_args(command: ClapCommand) -> ClapCommand {
    command
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase output")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('q')
                .long("silent")
                .visible_alias("quiet")
                .help("Decrease output")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("bigtiff")
                .short('8')
                .long("bigtiff")
                .help("Output as BigTIFF")
                .action(ArgAction::SetTrue)
                .overrides_with("classic")
                .global(true),
        )
        .arg(
            Arg::new("classic")
                .short('4')
                .long("classic")
                .help("Output as classic TIFF if small enough")
                .action(ArgAction::SetTrue)
                .overrides_with("bigtiff")
                .global(true),
        )
        .arg(
            Arg::new("bigendian")
                .short('B')
                .long("bigendian")
                .visible_alias("big-endian")
                .help("Output as big-endian")
                .action(ArgAction::SetTrue)
                .overrides_with("littleendian")
                .global(true),
        )
        .arg(
            Arg::new("littleendian")
                .short('L')
                .long("littleendian")
                .visible_alias("little-endian")
                .help("Output as little-endian")
                .action(ArgAction::SetTrue)
                .overrides_with("bigendian")
                .global(true),
        )
        .arg(
            Arg::new("ifds-first")
                .long("ifds-first")
                .help("Cluster directory records ahead of their data")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("dedup")
                .long("dedup")
                .help("Store identical data blocks only once")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("stop-on-warning")
                .short('X')
                .long("stop-on-warning")
                .help("Treat warnings as errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}

fn build_cli() -> ClapCommand {
    let epilog = "All inputs can specify specific IFDs and sub-IFDs by appending \
[,<IFD-#>[,[<tag-name-or-number>:]<SubIFD-#>[,<IFD-#>...]] to the source path. \
For instance, to only use the second IFD of sample.tiff, use 'sample.tiff,1'.";

    global_args(
        ClapCommand::new("tiffkit")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Inspect and restructure TIFF/BigTIFF files without touching pixel data")
            .after_help(epilog)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(
                ClapCommand::new("dump")
                    .visible_alias("info")
                    .about("Print the directory structure of TIFF files")
                    .after_help(epilog)
                    .arg(
                        Arg::new("source")
                            .help("Source file(s), - for stdin")
                            .required(true)
                            .num_args(1..),
                    )
                    .arg(
                        Arg::new("max")
                            .short('m')
                            .long("max")
                            .help("Maximum items to display per list")
                            .value_parser(clap::value_parser!(usize))
                            .default_value("20"),
                    )
                    .arg(
                        Arg::new("max-text")
                            .long("max-text")
                            .help("Maximum characters to display per string")
                            .value_parser(clap::value_parser!(usize))
                            .default_value("80"),
                    )
                    .arg(
                        Arg::new("json")
                            .long("json")
                            .help("Output as JSON")
                            .action(ArgAction::SetTrue)
                            .overrides_with("yaml"),
                    )
                    .arg(
                        Arg::new("yaml")
                            .long("yaml")
                            .help("Output as a shallow YAML-like listing")
                            .action(ArgAction::SetTrue)
                            .overrides_with("json"),
                    ),
            )
            .subcommand(
                ClapCommand::new("split")
                    .about("Split IFDs into separate files")
                    .after_help(epilog)
                    .arg(
                        Arg::new("source")
                            .help("Source file to split, - for stdin")
                            .required(true),
                    )
                    .arg(Arg::new("prefix").help("Prefix of split files"))
                    .arg(
                        Arg::new("subifds")
                            .long("subifds")
                            .help(
                                "Split all subifds.  If not specified, each split file is a \
single IFD with all of its subifds included in it.  If specified, each subifd \
is split to its own file.",
                            )
                            .action(ArgAction::SetTrue),
                    )
                    .arg(
                        Arg::new("overwrite")
                            .short('y')
                            .long("overwrite")
                            .help("Allow overwriting an existing output file")
                            .action(ArgAction::SetTrue),
                    ),
            )
            .subcommand(
                ClapCommand::new("concat")
                    .visible_alias("merge")
                    .about("Concatenate multiple files into a single TIFF")
                    .after_help(epilog)
                    .arg(
                        Arg::new("source")
                            .help("Source files to concatenate, - for one file on stdin")
                            .required(true)
                            .num_args(1..),
                    )
                    .arg(
                        Arg::new("output")
                            .help("Output file, - for stdout")
                            .required(true),
                    )
                    .arg(
                        Arg::new("overwrite")
                            .short('y')
                            .long("overwrite")
                            .help("Allow overwriting an existing output file")
                            .action(ArgAction::SetTrue),
                    ),
            )
            .subcommand(
                ClapCommand::new("set")
                    .about("Set tags in a TIFF file")
                    .after_help(epilog)
                    .arg(
                        Arg::new("source")
                            .help("Source file, - for stdin")
                            .required(true),
                    )
                    .arg(
                        Arg::new("output")
                            .help("Output file, - for stdout.  If no output file is specified, the source file is rewritten"),
                    )
                    .arg(
                        Arg::new("overwrite")
                            .short('y')
                            .long("overwrite")
                            .help("Allow overwriting an existing output file")
                            .action(ArgAction::SetTrue),
                    )
                    .arg(
                        Arg::new("set")
                            .short('s')
                            .long("set")
                            .help(
                                "Set a tag.  The tag can be a case-insensitive name or integer, \
optionally with a datatype and a specific IFD appended \
(TAG[:DATATYPE][,<IFD-#>]).  Separate multiple numeric values with commas or \
whitespace.  Specify \"@PATH\" for a value to load the value from a file.",
                            )
                            .num_args(2)
                            .value_names(["TAG", "VALUE"])
                            .action(ArgAction::Append),
                    )
                    .arg(
                        Arg::new("unset")
                            .short('u')
                            .long("unset")
                            .help("Unset a tag.  The tag can be a case-insensitive name or integer")
                            .value_name("TAG")
                            .action(ArgAction::Append),
                    )
                    .arg(
                        Arg::new("setfrom")
                            .short('f')
                            .long("setfrom")
                            .visible_alias("set-from")
                            .help("Set a tag, reading the value from another TIFF file")
                            .num_args(2)
                            .value_names(["TAG", "TIFFPATH"])
                            .action(ArgAction::Append),
                    ),
            ),
    )
}

fn main() {
    let matches = build_cli().get_matches();

    let verbosity = matches.get_count("verbose") as i32 - matches.get_count("silent") as i32;
    let level = match verbosity {
        i32::MIN..=-2 => LevelFilter::Off,
        -1 => LevelFilter::Error,
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
    set_stop_on_warning(matches.get_flag("stop-on-warning"));

    let factory = TiffkitCommandFactory::new();
    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(err) = command.execute() {
                error!("Command execution error: {}", err);
                eprintln!("Error: {}", err);
                process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}
