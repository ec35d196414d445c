//! Command-line interface

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::{CliOverrides, LogFormat};

/// What the binary was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// Run the HTTP service
    Serve,
    /// Insert the default charities into an empty hosted collection
    Seed,
    /// Print the effective configuration and exit
    CheckConfig,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    /// Subcommand, `Serve` when omitted
    pub command: CliCommand,
    /// Flag values layered over file and environment
    pub overrides: CliOverrides,
}

/// Build the clap command
#[must_use]
pub fn command() -> Command {
    Command::new("ttc-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Trace the Change donation service")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .global(true)
                .value_parser(value_parser!(SocketAddr))
                .help("Listen address, e.g. 0.0.0.0:3000"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory for the local donations file"),
        )
        .arg(
            Arg::new("memory-only")
                .long("memory-only")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Keep local donations in memory only"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(value_parser!(LogFormat))
                .help("Log output format"),
        )
        .arg(
            Arg::new("log-filter")
                .long("log-filter")
                .global(true)
                .help("Log filter directives used when RUST_LOG is unset"),
        )
        .subcommand(Command::new("serve").about("Run the HTTP service (default)"))
        .subcommand(Command::new("seed").about("Seed the hosted charity collection"))
        .subcommand(Command::new("check-config").about("Print the effective configuration"))
}

/// Parse the process arguments, exiting on `--help` or bad input
#[must_use]
pub fn parse() -> Cli {
    from_matches(&command().get_matches())
}

/// Parse an explicit argument list
///
/// # Errors
/// Returns the clap error for unknown flags or unparsable values.
pub fn try_parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(from_matches(&command().try_get_matches_from(args)?))
}

fn from_matches(matches: &ArgMatches) -> Cli {
    let command = match matches.subcommand_name() {
        Some("seed") => CliCommand::Seed,
        Some("check-config") => CliCommand::CheckConfig,
        _ => CliCommand::Serve,
    };

    Cli {
        command,
        overrides: CliOverrides {
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            bind: matches.get_one::<SocketAddr>("bind").copied(),
            data_dir: matches.get_one::<PathBuf>("data-dir").cloned(),
            memory_only: matches.get_flag("memory-only"),
            log_format: matches.get_one::<LogFormat>("log-format").copied(),
            log_filter: matches.get_one::<String>("log-filter").cloned(),
        },
    }
}
