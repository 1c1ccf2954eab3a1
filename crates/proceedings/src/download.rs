//! Downloading the artifacts of a single paper.
//!
//! A paper may list several artifact locations (mirrors, supplements). The [`Downloader`]
//! fetches each of them into the output directory under a name derived from the
//! configured [`Template`]:
//!
//! - the first artifact is written to `{stem}.pdf`
//! - the `i`-th following one to `{stem}_{i}.pdf`
//!
//! Bytes are written to a `.part` sibling first and renamed into place, so a file with
//! the final name is always complete. A paper counts as downloaded only when every one
//! of its artifacts ended up on disk with a non-zero length.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use proceedings::{
//!   download::{Downloader, HttpFetcher},
//!   paper::Paper,
//!   template::Template,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(Arc::new(HttpFetcher::default()));
//! let paper = Paper::new("Attention Is All You Need", "https://papers.example/3f5ee243.pdf");
//! let outcome = downloader.fetch(&paper, &Template::default(), 2017, "papers".as_ref()).await?;
//! println!("downloaded: {}", outcome.success);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use super::*;

/// Extension given to every artifact.
pub const PDF_EXTENSION: &str = "pdf";

/// Retrieves the raw bytes behind an artifact location.
#[async_trait]
pub trait Fetch: Send + Sync {
  /// Fetches the body at `url`.
  ///
  /// Errors are per location: unreachable hosts, malformed URLs and non-success statuses
  /// all fail only this location.
  async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetch`] implementation over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
  /// Shared HTTP client
  client: reqwest::Client,
}

impl HttpFetcher {
  /// Wraps a preconfigured client.
  pub fn new(client: reqwest::Client) -> Self { Self { client } }

  /// Builds a client whose requests are aborted after `timeout`.
  pub fn with_timeout(timeout: Duration) -> Result<Self> {
    Ok(Self { client: reqwest::Client::builder().timeout(timeout).build()? })
  }
}

#[async_trait]
impl Fetch for HttpFetcher {
  async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
    let response = self.client.get(url).send().await?;

    if response.status().is_success() {
      Ok(response.bytes().await?.to_vec())
    } else {
      trace!("{url} response: {response:?}");
      Err(ProceedingsError::Http { url: url.to_owned(), status: response.status().as_u16() })
    }
  }
}

/// Result of downloading one paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
  /// Whether every artifact of the paper is on disk
  pub success: bool,
  /// Artifacts persisted, in artifact order
  pub files:   Vec<PathBuf>,
  /// Human readable reasons for each artifact that could not be persisted
  pub errors:  Vec<String>,
}

impl DownloadOutcome {
  /// A failed outcome with a single reason and no files.
  pub fn failed(reason: impl Into<String>) -> Self {
    Self { success: false, files: Vec::new(), errors: vec![reason.into()] }
  }
}

/// Downloads every artifact of a paper.
#[derive(Clone)]
pub struct Downloader {
  /// How artifact bytes are retrieved
  fetcher: Arc<dyn Fetch>,
}

impl Downloader {
  /// Creates a downloader retrieving artifacts through `fetcher`.
  pub fn new(fetcher: Arc<dyn Fetch>) -> Self { Self { fetcher } }

  /// The artifact paths a paper maps to under `template`, in artifact order.
  pub fn destinations(
    paper: &Paper,
    template: &Template,
    year: i32,
    output_dir: &Path,
  ) -> Vec<PathBuf> {
    let stem = template.render(paper, year);
    (0..paper.url.locations().len())
      .map(|index| output_dir.join(artifact_name(&stem, index)))
      .collect()
  }

  /// Downloads the paper's artifacts into `output_dir`.
  ///
  /// When every destination already holds a non-empty file nothing is fetched and the
  /// existing files are reported. Otherwise each artifact is fetched in turn; a failed
  /// fetch is recorded in the outcome and the remaining artifacts are still attempted.
  ///
  /// # Errors
  ///
  /// Failing to write to the output directory is returned as an error: it is not
  /// specific to one artifact and will not get better for the next one.
  pub async fn fetch(
    &self,
    paper: &Paper,
    template: &Template,
    year: i32,
    output_dir: &Path,
  ) -> Result<DownloadOutcome> {
    let urls = paper.url.locations();
    if urls.is_empty() {
      return Ok(DownloadOutcome::failed("no artifact location"));
    }

    let destinations = Self::destinations(paper, template, year, output_dir);
    if all_present(&destinations).await {
      debug!("\"{paper}\" already on disk, not fetching");
      return Ok(DownloadOutcome { success: true, files: destinations, errors: Vec::new() });
    }

    tokio::fs::create_dir_all(output_dir).await?;

    let mut outcome = DownloadOutcome::default();
    for (url, destination) in urls.iter().zip(destinations.iter()) {
      let bytes = match self.fetcher.fetch(url).await {
        Ok(bytes) if bytes.is_empty() => {
          outcome.errors.push(format!("{url}: empty response"));
          continue;
        },
        Ok(bytes) => bytes,
        Err(e) => {
          debug!("Failed to fetch {url} for \"{paper}\": {e}");
          outcome.errors.push(format!("{url}: {e}"));
          continue;
        },
      };

      write_atomic(destination, &bytes).await?;
      trace!("Wrote {} bytes to {}", bytes.len(), destination.display());
      outcome.files.push(destination.clone());
    }

    outcome.success = outcome.files.len() == urls.len() && all_present(&outcome.files).await;
    Ok(outcome)
  }
}

/// File name of the `index`-th artifact for a rendered stem.
pub fn artifact_name(stem: &str, index: usize) -> String {
  match index {
    0 => format!("{stem}.{PDF_EXTENSION}"),
    i => format!("{stem}_{i}.{PDF_EXTENSION}"),
  }
}

/// Whether every path is a non-empty regular file.
async fn all_present(paths: &[PathBuf]) -> bool {
  if paths.is_empty() {
    return false;
  }
  for path in paths {
    match tokio::fs::metadata(path).await {
      Ok(metadata) if metadata.is_file() && metadata.len() > 0 => {},
      _ => return false,
    }
  }
  true
}

/// Writes `bytes` to a sibling `.part` file and renames it onto `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
  let mut partial = path.as_os_str().to_owned();
  partial.push(".part");
  let partial = PathBuf::from(partial);

  if let Err(e) = tokio::fs::write(&partial, bytes).await {
    let _ = tokio::fs::remove_file(&partial).await;
    return Err(e.into());
  }
  tokio::fs::rename(&partial, path).await?;
  Ok(())
}

/// Deletes every zero-byte regular file directly inside `dir`, returning how many were
/// removed.
///
/// Files that disappear while the directory is scanned are ignored.
pub async fn remove_zero_byte_files(dir: &Path) -> Result<usize> {
  let mut entries = match tokio::fs::read_dir(dir).await {
    Ok(entries) => entries,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
    Err(e) => return Err(e.into()),
  };

  let mut removed = 0;
  while let Some(entry) = entries.next_entry().await? {
    let path = entry.path();
    let Ok(metadata) = tokio::fs::metadata(&path).await else { continue };
    if !metadata.is_file() || metadata.len() > 0 {
      continue;
    }

    match tokio::fs::remove_file(&path).await {
      Ok(()) => {
        trace!("Removed empty file {}", path.display());
        removed += 1;
      },
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
      Err(e) => return Err(e.into()),
    }
  }
  Ok(removed)
}

/// Counts the artifacts currently present in `dir`.
pub fn count_pdfs(dir: &Path) -> Result<usize> {
  if !dir.is_dir() {
    return Ok(0);
  }
  let mut count = 0;
  for entry in std::fs::read_dir(dir)? {
    let path = entry?.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == PDF_EXTENSION) {
      count += 1;
    }
  }
  Ok(count)
}
