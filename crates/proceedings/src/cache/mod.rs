//! Checkpoint store recording which papers were already downloaded.
//!
//! The cache maps a paper's normalized title to whether its last download attempt
//! succeeded. It is the only record of "already done" a run consults; the output
//! directory is never scanned to decide what to skip.
//!
//! The rest of the crate depends only on the [`CacheStore`] trait. Two adapters are
//! provided:
//!
//! - [`MemoryCache`]: process-local, used for tests and one-off runs
//! - [`SqliteCache`]: durable, backed by a SQLite database file
//!
//! Independently of the backend, a store can be exported to and restored from JSON
//! snapshots (`{"normalized title": 1, ...}`) kept in a cache directory, so a run can be
//! resumed on another machine or after the backend was wiped.
//!
//! # Examples
//!
//! ```no_run
//! use proceedings::{cache::MemoryCache, prelude::*};
//!
//! # async fn example() -> Result<(), ProceedingsError> {
//! let cache = MemoryCache::new();
//! cache.load_snapshot("cache/checkpoint-20240101T000000.000Z.json".as_ref()).await?;
//!
//! if cache.get("attention is all you need").await? != Some(true) {
//!   // download it
//! }
//! # Ok(())
//! # }
//! ```

use std::time::SystemTime;

use super::*;

mod memory;
mod sqlite;

pub use self::{memory::MemoryCache, sqlite::SqliteCache};

/// Directory used for snapshots when none is configured.
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Key/value checkpoint of per-paper download outcomes.
///
/// Implementations must tolerate concurrent [`set`](CacheStore::set) calls from every
/// in-flight download task; last writer wins per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
  /// Looks up the recorded outcome for a normalized title.
  async fn get(&self, key: &str) -> Result<Option<bool>>;

  /// Records the outcome for a normalized title.
  async fn set(&self, key: &str, downloaded: bool) -> Result<()>;

  /// Removes every recorded outcome.
  async fn clear(&self) -> Result<()>;

  /// Every recorded outcome, ordered by key.
  async fn entries(&self) -> Result<BTreeMap<String, bool>>;

  /// Checks that the backend is reachable.
  async fn ping(&self) -> Result<()> { Ok(()) }

  /// Loads a JSON snapshot into the store, returning how many entries were applied.
  ///
  /// A snapshot that cannot be parsed is logged and ignored: the store is left as it
  /// was and `Ok(0)` is returned. Failing to read the file at all is an error.
  async fn load_snapshot(&self, path: &Path) -> Result<usize> {
    let data = tokio::fs::read(path).await?;

    let snapshot = match serde_json::from_slice::<BTreeMap<String, serde_json::Value>>(&data) {
      Ok(snapshot) => snapshot,
      Err(e) => {
        warn!("Ignoring unreadable cache snapshot {}: {e}", path.display());
        return Ok(0);
      },
    };

    let mut applied = 0;
    for (key, value) in snapshot {
      match snapshot_flag(&value) {
        Some(downloaded) => {
          self.set(&key, downloaded).await?;
          applied += 1;
        },
        None => warn!("Ignoring cache snapshot entry {key:?} with value {value}"),
      }
    }

    info!("Loaded {applied} entries from cache snapshot {}", path.display());
    Ok(applied)
  }

  /// Writes every entry to a JSON snapshot at `path`.
  ///
  /// The snapshot is written next to its destination and renamed into place, so a
  /// reader never observes a partially written file.
  async fn dump_snapshot(&self, path: &Path) -> Result<()> {
    let snapshot: BTreeMap<String, u8> = self
      .entries()
      .await?
      .into_iter()
      .map(|(key, downloaded)| (key, u8::from(downloaded)))
      .collect();

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }

    let partial = path.with_extension("json.part");
    tokio::fs::write(&partial, serde_json::to_vec_pretty(&snapshot)?).await?;
    tokio::fs::rename(&partial, path).await?;

    info!("Wrote {} entries to cache snapshot {}", snapshot.len(), path.display());
    Ok(())
  }
}

/// Interprets a snapshot value as a download flag.
///
/// Integers (`0`/`1`), booleans and their string spellings are accepted.
fn snapshot_flag(value: &serde_json::Value) -> Option<bool> {
  match value {
    serde_json::Value::Bool(flag) => Some(*flag),
    serde_json::Value::Number(number) => number.as_i64().map(|n| n != 0),
    serde_json::Value::String(s) => match s.trim().to_lowercase().as_str() {
      "1" | "true" => Some(true),
      "0" | "false" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

/// Finds the most recently modified `*.json` snapshot in `dir`.
///
/// A missing directory simply has no snapshot.
pub fn latest_snapshot(dir: &Path) -> Result<Option<PathBuf>> {
  if !dir.is_dir() {
    return Ok(None);
  }

  let mut latest: Option<(SystemTime, PathBuf)> = None;
  for entry in std::fs::read_dir(dir)? {
    let path = entry?.path();
    if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
      continue;
    }

    let modified = std::fs::metadata(&path)?.modified()?;
    if latest.as_ref().map_or(true, |(newest, _)| modified > *newest) {
      latest = Some((modified, path));
    }
  }

  Ok(latest.map(|(_, path)| path))
}

/// Path of a new, timestamped snapshot inside `dir`.
pub fn snapshot_path(dir: &Path) -> PathBuf {
  dir.join(format!("checkpoint-{}.json", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")))
}

/// Brings a store into a consistent state for a new run.
///
/// When the output directory is missing or empty, previous outcomes describe files that
/// no longer exist: the store is cleared and snapshots are not consulted. Otherwise the
/// newest snapshot in `cache_dir`, if any, is loaded on top of the store. A snapshot
/// that cannot be read or parsed is skipped with a warning and the store keeps what it
/// already had.
///
/// Returns whether the run starts fresh.
pub async fn reload(cache: &dyn CacheStore, output_dir: &Path, cache_dir: &Path) -> Result<bool> {
  if dir_is_empty(output_dir)? {
    info!("Output directory {} is empty, starting from an empty cache", output_dir.display());
    cache.clear().await?;
    return Ok(true);
  }

  if let Some(snapshot) = latest_snapshot(cache_dir)? {
    match cache.load_snapshot(&snapshot).await {
      Ok(_) => {},
      Err(ProceedingsError::Path(e)) => {
        warn!("Could not read cache snapshot {}, continuing without it: {e}", snapshot.display())
      },
      Err(e) => return Err(e),
    }
  }
  Ok(false)
}

/// Whether a directory is missing or has no entries.
fn dir_is_empty(dir: &Path) -> Result<bool> {
  if !dir.exists() {
    return Ok(true);
  }
  Ok(std::fs::read_dir(dir)?.next().is_none())
}
