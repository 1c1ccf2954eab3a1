//! On-disk run configuration.
//!
//! A [`Config`] is a TOML file with the defaults a run starts from. Every field is
//! optional in the file; missing fields take their default value, and a missing file is
//! the same as an empty one.
//!
//! ```toml
//! output_dir = "papers"
//! cache_dir = ".cache"
//! cache_backend = "sqlite"
//! database_path = "/home/me/.local/share/proceedings/checkpoints.db"
//! batch_size = 16
//! template = "year-author-title"
//! checkpoint = true
//! request_timeout_secs = 60
//!
//! [sources]
//! icml = "http://mirror.local/metadata/icml"
//! ```

use std::time::Duration;

use super::*;
use crate::{
  batch::DEFAULT_BATCH_SIZE,
  cache::{MemoryCache, SqliteCache, DEFAULT_CACHE_DIR},
  collector::{Collector, CollectorBuilder, DEFAULT_OUTPUT_DIR},
  download::HttpFetcher,
  source::HttpMetadataSource,
};

/// Which [`CacheStore`] adapter a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
  /// Outcomes live only as long as the process; snapshots carry them across runs
  Memory,
  /// Outcomes are kept in a SQLite database
  #[default]
  Sqlite,
}

/// Defaults for a collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Where papers are downloaded to
  pub output_dir:           PathBuf,
  /// Where cache snapshots are read from and written to
  pub cache_dir:            PathBuf,
  /// Checkpoint backend
  pub cache_backend:        CacheBackend,
  /// Database file of the SQLite backend
  pub database_path:        PathBuf,
  /// Concurrent downloads per batch
  pub batch_size:           usize,
  /// Filename template of downloaded papers
  pub template:             Template,
  /// Whether a snapshot is written after a download run
  pub checkpoint:           bool,
  /// Per request timeout, none when absent
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_timeout_secs: Option<u64>,
  /// Conference name to metadata base URL overrides
  pub sources:              BTreeMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      output_dir:           PathBuf::from(DEFAULT_OUTPUT_DIR),
      cache_dir:            PathBuf::from(DEFAULT_CACHE_DIR),
      cache_backend:        CacheBackend::default(),
      database_path:        SqliteCache::default_path(),
      batch_size:           DEFAULT_BATCH_SIZE,
      template:             Template::default(),
      checkpoint:           true,
      request_timeout_secs: None,
      sources:              BTreeMap::new(),
    }
  }
}

impl Config {
  /// Returns the default location of the configuration file.
  ///
  /// - On Unix: `~/.config/proceedings/config.toml`
  /// - On macOS: `~/Library/Application Support/proceedings/config.toml`
  /// - On Windows: `%APPDATA%\proceedings\config.toml`
  /// - Fallback: `./proceedings/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join("proceedings")
      .join("config.toml")
  }

  /// Reads the configuration at `path`, falling back to defaults when the file does not
  /// exist.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!("No configuration at {}, using defaults", path.display());
        return Ok(Self::default());
      },
      Err(e) => return Err(e.into()),
    };

    let config: Self = toml::from_str(&content)?;
    config.validate()?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
  }

  /// Writes the configuration to `path`, creating parent directories.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    info!("Saved configuration to {}", path.display());
    Ok(())
  }

  /// Checks values that deserialize fine but cannot drive a run.
  pub fn validate(&self) -> Result<()> {
    if self.batch_size == 0 {
      return Err(ProceedingsError::Config("batch_size must be at least 1".to_owned()));
    }
    self.registry().map(|_| ())
  }

  /// The conference registry with the `[sources]` overrides applied.
  pub fn registry(&self) -> Result<ConferenceRegistry> {
    ConferenceRegistry::default().with_overrides(&self.sources)
  }

  /// Opens the configured cache backend.
  pub async fn open_cache(&self) -> Result<Arc<dyn CacheStore>> {
    Ok(match self.cache_backend {
      CacheBackend::Memory => Arc::new(MemoryCache::new()),
      CacheBackend::Sqlite => Arc::new(SqliteCache::open(&self.database_path).await?),
    })
  }

  /// An HTTP client honoring the configured timeout.
  pub fn http_client(&self) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = self.request_timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
  }

  /// A collector builder preloaded with every configured value.
  ///
  /// The cache backend is opened here, so an unreachable database is reported before
  /// anything else happens.
  pub async fn collector(&self) -> Result<CollectorBuilder> {
    self.validate()?;
    let registry = self.registry()?;
    let client = self.http_client()?;

    Ok(
      Collector::builder()
        .with_cache(self.open_cache().await?)
        .with_source(Arc::new(HttpMetadataSource::with_client(registry.clone(), client.clone())))
        .with_fetcher(Arc::new(HttpFetcher::new(client)))
        .with_registry(registry)
        .with_output_dir(&self.output_dir)
        .with_cache_dir(&self.cache_dir)
        .with_batch_size(self.batch_size)
        .with_checkpoint(self.checkpoint),
    )
  }
}
