use super::*;

pub mod clean;
pub mod init;
pub mod run;

pub use clean::{clean, CleanOptions};
pub use init::{init, InitOptions};
pub use run::{run, SelectionArgs};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// List the titles of the selected papers
  Search(SelectionArgs),

  /// Download the selected papers, skipping the ones already downloaded
  Download(SelectionArgs),

  /// Count accepted, selected and awarded papers
  Stats(SelectionArgs),

  /// Write a configuration file
  Init(InitOptions),

  /// Remove empty downloads and, after confirmation, snapshots and the checkpoint database
  Clean(CleanOptions),
}
