//! Bounded batches of concurrent downloads.
//!
//! The [`Batcher`] drains a list of papers in fixed-size batches. Each paper of a batch
//! runs in its own tokio task; the whole batch is joined before the next one starts, so
//! at most `batch_size` downloads are ever in flight. A failing or panicking task only
//! fails its own paper.
//!
//! After every task the outcome is written to the [`CacheStore`], and after every batch a
//! housekeeping pass removes zero-byte files left in the output directory. Both are
//! visible before the next batch is scheduled.

use std::sync::Mutex;

use futures::future::join_all;
use tokio::task::JoinHandle;

use super::*;
use crate::download::remove_zero_byte_files;

/// Number of concurrent downloads per batch when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Counters describing one [`Batcher::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
  /// Papers handed to a download task or rejected as a collision
  pub scheduled:       usize,
  /// Papers whose every artifact is on disk
  pub succeeded:       usize,
  /// Papers that did not fully download
  pub failed:          usize,
  /// Papers not scheduled because they were already downloaded or already attempted
  pub skipped:         usize,
  /// Artifacts written or found complete on disk
  pub files_persisted: usize,
  /// Titles of the papers that failed
  pub failures:        Vec<String>,
}

impl BatchReport {
  /// Adds another report's counters to this one.
  pub fn absorb(&mut self, other: BatchReport) {
    self.scheduled += other.scheduled;
    self.succeeded += other.succeeded;
    self.failed += other.failed;
    self.skipped += other.skipped;
    self.files_persisted += other.files_persisted;
    self.failures.extend(other.failures);
  }
}

/// Runs downloads in bounded concurrent batches.
///
/// A batcher remembers which destination stems it has handed out, so it should live for
/// exactly one collection run: two different papers rendering to the same stem within a
/// run are reported as a collision instead of overwriting each other.
pub struct Batcher {
  /// Single-paper downloader shared by every task
  downloader: Arc<Downloader>,
  /// Maximum number of concurrent downloads
  batch_size: usize,
  /// Destination stem to the cache key of the paper that claimed it
  claimed:    Mutex<HashMap<PathBuf, String>>,
}

impl Batcher {
  /// Creates a batcher running [`DEFAULT_BATCH_SIZE`] downloads at a time.
  pub fn new(downloader: Arc<Downloader>) -> Self {
    Self { downloader, batch_size: DEFAULT_BATCH_SIZE, claimed: Mutex::new(HashMap::new()) }
  }

  /// Sets the number of concurrent downloads. Zero is treated as one.
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size.max(1);
    self
  }

  /// The number of concurrent downloads per batch.
  pub fn batch_size(&self) -> usize { self.batch_size }

  /// Downloads `papers` into `output_dir`, skipping the ones already cached as
  /// downloaded.
  ///
  /// # Errors
  ///
  /// Per-paper problems never surface here; they are counted as failures. Only the
  /// housekeeping pass over `output_dir` can fail the run.
  pub async fn run(
    &self,
    papers: Vec<Paper>,
    template: &Template,
    year: i32,
    output_dir: &Path,
    cache: Arc<dyn CacheStore>,
  ) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let mut pending = Vec::with_capacity(papers.len());

    for paper in papers {
      let key = paper.key();
      match cache.get(&key).await {
        Ok(Some(true)) => {
          trace!("\"{paper}\" cached as downloaded, skipping");
          self.claim(&output_dir.join(template.render(&paper, year)), &key);
          report.skipped += 1;
        },
        Ok(_) => pending.push(paper),
        Err(e) => {
          warn!("Cache lookup for \"{paper}\" failed, downloading anyway: {e}");
          pending.push(paper);
        },
      }
    }

    let batches = pending.len().div_ceil(self.batch_size);
    info!(
      "Downloading {} papers in {batches} batches of up to {} ({} already downloaded)",
      pending.len(),
      self.batch_size,
      report.skipped
    );

    let mut pending = pending.into_iter().peekable();
    let mut index = 0;
    while pending.peek().is_some() {
      index += 1;
      let batch: Vec<Paper> = pending.by_ref().take(self.batch_size).collect();
      debug!("Starting batch {index}/{batches} with {} papers", batch.len());

      let mut tasks = Vec::with_capacity(batch.len());
      for paper in batch {
        let key = paper.key();
        let stem = output_dir.join(template.render(&paper, year));
        match self.claim(&stem, &key) {
          Claim::Granted => {},
          Claim::Repeated => {
            debug!("\"{paper}\" was already attempted in this run, skipping");
            report.skipped += 1;
            continue;
          },
          Claim::Taken(holder) => {
            let reason = format!("destination {} already used by \"{holder}\"", stem.display());
            report.scheduled += 1;
            if let Err(e) = cache.set(&key, false).await {
              warn!("Failed to record outcome for \"{paper}\": {e}");
            }
            self.tally(&mut report, paper.title, DownloadOutcome::failed(reason));
            continue;
          },
        }

        report.scheduled += 1;
        let title = paper.title.clone();
        let downloader = Arc::clone(&self.downloader);
        let template = template.clone();
        let output_dir = output_dir.to_path_buf();
        let handle: JoinHandle<Result<DownloadOutcome>> = tokio::spawn(async move {
          debug!("Downloading \"{paper}\"");
          downloader.fetch(&paper, &template, year, &output_dir).await
        });

        let cache = Arc::clone(&cache);
        tasks.push(async move {
          let outcome = match handle.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => DownloadOutcome::failed(e.to_string()),
            Err(e) => DownloadOutcome::failed(format!("download task aborted: {e}")),
          };
          if let Err(e) = cache.set(&key, outcome.success).await {
            warn!("Failed to record outcome for \"{title}\": {e}");
          }
          (title, outcome)
        });
      }

      for (title, outcome) in join_all(tasks).await {
        self.tally(&mut report, title, outcome);
      }

      match remove_zero_byte_files(output_dir).await {
        Ok(0) => {},
        Ok(removed) => debug!("Removed {removed} empty files from {}", output_dir.display()),
        Err(e) => warn!("Could not remove empty files from {}: {e}", output_dir.display()),
      }
    }

    info!(
      "Batches finished: {} downloaded, {} failed, {} skipped",
      report.succeeded, report.failed, report.skipped
    );
    Ok(report)
  }

  /// Reserves a destination stem for the paper keyed `key`.
  fn claim(&self, stem: &Path, key: &str) -> Claim {
    let mut claimed = match self.claimed.lock() {
      Ok(claimed) => claimed,
      Err(poisoned) => poisoned.into_inner(),
    };
    match claimed.get(stem) {
      None => {
        claimed.insert(stem.to_path_buf(), key.to_owned());
        Claim::Granted
      },
      Some(holder) if holder == key => Claim::Repeated,
      Some(holder) => Claim::Taken(holder.clone()),
    }
  }

  /// Folds one finished paper into the report.
  fn tally(&self, report: &mut BatchReport, title: String, outcome: DownloadOutcome) {
    if outcome.success {
      report.succeeded += 1;
      report.files_persisted += outcome.files.len();
    } else {
      warn!("Failed to download \"{title}\": {}", outcome.errors.join("; "));
      report.failed += 1;
      report.failures.push(title);
    }
  }
}

/// Result of reserving a destination stem.
enum Claim {
  /// The stem was free and now belongs to the paper.
  Granted,
  /// The same paper already holds the stem in this run.
  Repeated,
  /// Another paper holds the stem; its normalized title is attached.
  Taken(String),
}
