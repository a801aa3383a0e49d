// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `testrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "testrun",
    version,
    about = "Run built test and benchmark binaries and report their results.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build manifest (TOML).
    #[arg(long, value_name = "PATH", default_value = "Testrun.toml")]
    pub manifest: PathBuf,

    /// Tool options as a comma-separated list, e.g.
    /// `run_always,run_cmd=valgrind %s`. Applied over `[options]`.
    #[arg(long, value_name = "LIST")]
    pub options: Option<String>,

    /// Run every test binary even if its inputs are unchanged.
    #[arg(long)]
    pub run_always: bool,

    /// Wrap each executable with this template (`%s` is the executable).
    #[arg(long, value_name = "TEMPLATE")]
    pub run_cmd: Option<String>,

    /// Run in benchmark mode.
    #[arg(long)]
    pub run_benchmark: bool,

    /// Benchmark result file, passed as `--pyfile=<PATH>` in benchmark mode.
    #[arg(long, value_name = "PATH")]
    pub python_result: Option<String>,

    /// Maximum number of test binaries running at once.
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print what would run, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
