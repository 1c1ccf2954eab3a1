//! Error types for the proceedings library.
//!
//! Errors fall into two families that callers treat very differently:
//!
//! - Configuration errors (unsupported conference, malformed years, invalid mode, an
//!   unreachable cache backend) abort a run before any network activity.
//! - Everything else is scoped to a single conference/year pair or a single paper and is
//!   logged by the orchestrator rather than surfaced.
//!
//! # Examples
//!
//! ```
//! use proceedings::{conference::Conference, error::ProceedingsError};
//!
//! let err = "nonexistent".parse::<Conference>().unwrap_err();
//! assert!(matches!(err, ProceedingsError::UnsupportedConference(_)));
//! assert!(err.is_config());
//! ```

use thiserror::Error;

/// Error type alias used for the [`proceedings`](crate) crate.
pub type Result<T> = core::result::Result<T, ProceedingsError>;

/// Errors that can occur while collecting and downloading papers.
#[derive(Error, Debug)]
pub enum ProceedingsError {
  /// A conference name is not part of the supported set.
  ///
  /// The string parameter holds the rejected name as given by the user.
  #[error("Conference \"{0}\" is not supported, see `proceedings::conference::Conference`")]
  UnsupportedConference(String),

  /// The year selection could not be parsed.
  ///
  /// Accepted forms are a single year, a comma separated list, an inclusive `a:b` range
  /// or `*` for every supported year.
  #[error("Invalid year selection \"{0}\"")]
  InvalidYears(String),

  /// The requested run mode is not one of `search`, `download` or `stats`.
  #[error("Invalid mode \"{0}\", expected one of: search, download, stats")]
  InvalidMode(String),

  /// The checkpoint backend could not be reached at startup.
  ///
  /// Without a working cache the run cannot be resumed, so it is not started.
  #[error("Cache backend unavailable: {0}")]
  CacheUnavailable(String),

  /// A request completed with a non-success status code.
  #[error("Request to {url} failed with status {status}")]
  Http {
    /// The requested location
    url:    String,
    /// The HTTP status code returned by the server
    status: u16,
  },

  /// A paper record carried an empty title and cannot be keyed in the cache.
  #[error("Paper record has an empty title")]
  EmptyTitle,

  /// A network request failed.
  ///
  /// This can occur when:
  /// - The network is unavailable
  /// - The server is unreachable
  /// - The URL is malformed
  /// - TLS errors occur
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// A JSON document could not be decoded or encoded.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A SQLite operation failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// The configuration file is not valid TOML for [`Config`](crate::config::Config).
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be serialized.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// Any other configuration problem.
  #[error("{0}")]
  Config(String),
}

impl ProceedingsError {
  /// Whether this error is a configuration error that must stop a run before it starts.
  pub fn is_config(&self) -> bool {
    matches!(
      self,
      Self::UnsupportedConference(_)
        | Self::InvalidYears(_)
        | Self::InvalidMode(_)
        | Self::CacheUnavailable(_)
        | Self::Config(_)
        | Self::TomlDe(_)
    )
  }
}
