//! CLI argument definitions for the collector.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "collector",
    version,
    about = "Normalize analytics provider records into data set documents",
    long_about = "Normalize analytics provider records into data set documents.\n\n\
                  Records are bucketed into day, week or month windows, merged with\n\
                  job constants, renamed, given a deterministic id and post-processed\n\
                  by the job's plugin chain before being published as JSON lines."
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
    /// Assemble a records file with a job's configuration and publish it.
    Run(RunArgs),

    /// Show the time windows a frequency and range bucket into.
    Windows(WindowsArgs),

    /// Parse and validate a plugin chain.
    Plugins(PluginsArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Job configuration (JSON).
    #[arg(value_name = "JOB")]
    pub job: PathBuf,

    /// Provider records (JSON list, or an object with `records` and
    /// `special_fields`).
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Write JSON lines here instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Only publish records starting inside windows from this date.
    #[arg(long = "start", value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Only publish records starting inside windows up to this date.
    #[arg(long = "end", value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,
}

#[derive(Parser)]
pub struct WindowsArgs {
    /// day, week or month (also daily, weekly, monthly).
    #[arg(long = "frequency", default_value = "weekly")]
    pub frequency: String,

    /// First date of the range (default: derived from the frequency).
    #[arg(long = "start", value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last date of the range (default: derived from the frequency).
    #[arg(long = "end", value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,
}

#[derive(Parser)]
pub struct PluginsArgs {
    /// Plugin specifications in chain order, e.g. 'ComputeIdFrom("date")'.
    #[arg(value_name = "SPEC", required = true)]
    pub specs: Vec<String>,
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
