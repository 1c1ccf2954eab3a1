//! Error types for the proceedings CLI.

use proceedings::error::ProceedingsError;
use thiserror::Error;

/// Error type alias used for the `proceedingsd` crate.
pub type Result<T> = core::result::Result<T, ProceedingsdError>;

/// Errors that can occur while running a CLI command.
#[derive(Error, Debug)]
pub enum ProceedingsdError {
  /// An error from the proceedings library.
  #[error(transparent)]
  Proceedings(#[from] ProceedingsError),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// An interactive prompt failed.
  #[error(transparent)]
  Dialog(#[from] dialoguer::Error),

  /// A file pattern could not be built.
  #[error(transparent)]
  Glob(#[from] glob::PatternError),

  /// A command line argument has an unusable value.
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),
}
