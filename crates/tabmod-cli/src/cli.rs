//! CLI argument definitions for tabmod.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tabmod",
    version,
    about = "Apply configured rules to spreadsheet exports",
    long_about = "Load an HTML-as-XLS, XLSX or CSV table, apply the ordered rules of a YAML\n\
                  configuration and write the result as XLSX or delimited text.\n\n\
                  Without --output the result is written next to the input as\n\
                  <stem>_mod.<ext>, <stem>_mod2.<ext>, ... so nothing is overwritten."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Transform one input file with a configuration.
    Run(RunArgs),

    /// List the configurations available in a directory.
    Configs(ConfigDirArgs),

    /// Print a named configuration.
    ShowConfig(ShowConfigArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Input table (.xls/.html, .xlsx or .csv).
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,

    /// YAML configuration with the rules to apply.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// Output path (default: derived from the input name).
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ConfigDirArgs {
    /// Directory holding *.yaml / *.yml configurations.
    #[arg(long = "dir", value_name = "DIR", default_value = "configs")]
    pub dir: PathBuf,
}

#[derive(Parser)]
pub struct ShowConfigArgs {
    /// Configuration name, without extension.
    #[arg(value_name = "NAME")]
    pub name: String,

    #[command(flatten)]
    pub location: ConfigDirArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
