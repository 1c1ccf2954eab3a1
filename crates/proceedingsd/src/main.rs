//! Command line front-end for the proceedings paper collector.
//!
//! This crate provides the `proceedings` binary on top of the [`proceedings`] library. It
//! supports:
//! - Searching accepted papers of machine learning conferences by keyword
//! - Downloading the selected papers, resuming where a previous run stopped
//! - Counting accepted, selected and awarded papers
//! - Writing a configuration file and cleaning up run artifacts
//!
//! # Usage
//!
//! ```bash
//! # Write a configuration file with the defaults
//! proceedings init
//!
//! # List NeurIPS 2020 papers about graphs
//! proceedings search --conferences neurips --years 2020 --title graph
//!
//! # Download every ICML and ICLR paper from 2019 to 2021 by a DeepMind first author
//! proceedings download -c icml,iclr -y 2019:2021 --affiliation deepmind
//!
//! # Count awarded papers across every conference and year
//! proceedings stats -c '*' -y '*' --title '*'
//!
//! # Remove empty downloads, snapshots and the checkpoint database
//! proceedings clean
//! ```
//!
//! Logging verbosity is raised with `-v` (repeatable) and can be mirrored to a file
//! with `--log-file`.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use proceedings::{
  collector::{CollectReport, CollectRequest, Mode},
  config::Config,
  prelude::*,
};
use tracing::{debug, trace};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Collect and download machine learning conference papers")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. If not specified, uses the default platform-specific
  /// configuration directory.
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Also write logs to this file
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// The configuration file this invocation reads and writes.
  pub fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used
/// * `log_file` - Optional file receiving the same events, without colors
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set. The returned guard flushes the file writer
/// when dropped and must be kept alive for the whole run.
fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true);

  let Some(log_file) = log_file else {
    builder.init();
    return Ok(None);
  };

  let directory = match log_file.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  };
  let file_name = log_file
    .file_name()
    .ok_or_else(|| ProceedingsdError::InvalidArgument(format!("{}", log_file.display())))?;
  std::fs::create_dir_all(&directory)?;

  let (writer, guard) =
    tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
  builder.with_writer(writer).with_ansi(false).init();
  Ok(Some(guard))
}

/// Entry point for the proceedings CLI application
///
/// Parses arguments, sets up logging and executes the requested command.
///
/// # Errors
///
/// Returns a [`ProceedingsdError`] for configuration problems (unsupported conference,
/// malformed years, unreadable configuration, unreachable cache), file system errors and
/// failed prompts. Problems with individual conference years or papers are reported in
/// the output and do not fail the command.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let _guard = setup_logging(cli.verbose, cli.log_file.as_deref())?;
  trace!("Using configuration file {}", cli.config_path().display());

  let result = match &cli.command {
    Commands::Search(selection) => run(&cli, Mode::Search, selection).await,
    Commands::Download(selection) => run(&cli, Mode::Download, selection).await,
    Commands::Stats(selection) => run(&cli, Mode::Stats, selection).await,
    Commands::Init(options) => init(&cli, options),
    Commands::Clean(options) => clean(&cli, options).await,
  };

  if let Err(e) = &result {
    cli.reply(ResponseContent::Error(&e.to_string()))?;
  }
  result
}
