//! The orchestrator: conference and year pairs in, papers and files out.
//!
//! A [`Collector`] owns everything one run needs: the checkpoint cache, the metadata
//! source, the artifact fetcher and the destination directories. A [`CollectRequest`]
//! describes what to do with them: which conferences and years, which papers, how to name
//! files, and whether to search, download or only count.
//!
//! Runs proceed in three phases:
//!
//! 1. Validation. Conference names and the year selection are checked before any network
//!    activity, and the cache backend must answer a health check.
//! 2. Pairs. Each conference/year pair is processed strictly in sequence. An error while
//!    processing one pair is logged and the run moves on to the next.
//! 3. Wrap-up. The cache is optionally exported to a new snapshot and the output
//!    directory is summarized.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use proceedings::{
//!   cache::SqliteCache,
//!   collector::{CollectRequest, Collector, Mode},
//!   query::Criteria,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let collector = Collector::builder()
//!   .with_cache(Arc::new(SqliteCache::open(SqliteCache::default_path()).await?))
//!   .with_output_dir("papers")
//!   .with_batch_size(8)
//!   .build()?;
//!
//! let request = CollectRequest::new("iclr,icml", "2019:2021")
//!   .with_criteria(Criteria::from_lists("transformer", "", "deepmind"))
//!   .with_mode(Mode::Stats);
//!
//! let report = collector.collect(&request).await?;
//! println!("{} papers matched", report.matched());
//! # Ok(())
//! # }
//! ```

use crate::{
  batch::{BatchReport, Batcher, DEFAULT_BATCH_SIZE},
  cache::{self, MemoryCache, DEFAULT_CACHE_DIR},
  conference::{parse_conferences, YearSpec},
  download::{count_pdfs, HttpFetcher},
  source::HttpMetadataSource,
};

use super::*;

/// Output directory used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "papers";

/// What a run does with the papers it selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  /// Log the titles of the selected papers
  #[default]
  Search,
  /// Download the selected papers
  Download,
  /// Count accepted, selected and awarded papers
  Stats,
}

impl Mode {
  /// The lowercase name of the mode.
  pub fn as_str(&self) -> &'static str {
    match self {
      Mode::Search => "search",
      Mode::Download => "download",
      Mode::Stats => "stats",
    }
  }
}

impl Display for Mode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Mode {
  type Err = ProceedingsError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "search" => Ok(Mode::Search),
      "download" => Ok(Mode::Download),
      "stats" => Ok(Mode::Stats),
      _ => Err(ProceedingsError::InvalidMode(s.to_owned())),
    }
  }
}

/// One collection run's selection.
#[derive(Debug, Clone)]
pub struct CollectRequest {
  /// Conference selection, `*` or comma separated names
  pub conferences: String,
  /// Year selection, `*`, `a:b` or comma separated years
  pub years:       String,
  /// Which papers of each pair are selected
  pub criteria:    Criteria,
  /// What to do with the selected papers
  pub mode:        Mode,
  /// How downloaded files are named
  pub template:    Template,
}

impl CollectRequest {
  /// A search over every paper of the selected conferences and years.
  pub fn new(conferences: impl Into<String>, years: impl Into<String>) -> Self {
    Self {
      conferences: conferences.into(),
      years:       years.into(),
      criteria:    Criteria::all(),
      mode:        Mode::default(),
      template:    Template::default(),
    }
  }

  /// Sets the paper selection.
  pub fn with_criteria(mut self, criteria: Criteria) -> Self {
    self.criteria = criteria;
    self
  }

  /// Sets the run mode.
  pub fn with_mode(mut self, mode: Mode) -> Self {
    self.mode = mode;
    self
  }

  /// Sets the filename template.
  pub fn with_template(mut self, template: impl Into<Template>) -> Self {
    self.template = template.into();
    self
  }
}

/// What happened to one conference/year pair.
#[derive(Debug, Clone)]
pub struct PairSummary {
  /// The conference year processed
  pub descriptor: ConferenceDescriptor,
  /// Papers published for the pair
  pub accepted:   usize,
  /// Papers selected by the criteria
  pub matched:    usize,
  /// Selected papers that received an award
  pub awarded:    usize,
  /// Titles of the selected papers, kept in search mode
  pub titles:     Vec<String>,
  /// Download counters, present in download mode
  pub batch:      Option<BatchReport>,
  /// Why the pair could not be processed
  pub error:      Option<String>,
}

impl PairSummary {
  /// An empty summary for `descriptor`.
  fn new(descriptor: ConferenceDescriptor) -> Self {
    Self {
      descriptor,
      accepted: 0,
      matched: 0,
      awarded: 0,
      titles: Vec::new(),
      batch: None,
      error: None,
    }
  }
}

/// Result of a [`Collector::collect`] run.
#[derive(Debug, Clone)]
pub struct CollectReport {
  /// The mode the run executed in
  pub mode:         Mode,
  /// Per pair outcomes, in processing order
  pub pairs:        Vec<PairSummary>,
  /// Whether the run started from an empty cache
  pub fresh:        bool,
  /// Snapshot written at the end of the run, if any
  pub snapshot:     Option<PathBuf>,
  /// PDF files present in the output directory after the run
  pub pdfs_on_disk: usize,
}

impl CollectReport {
  /// Total papers published across pairs.
  pub fn accepted(&self) -> usize { self.pairs.iter().map(|pair| pair.accepted).sum() }

  /// Total papers selected across pairs.
  pub fn matched(&self) -> usize { self.pairs.iter().map(|pair| pair.matched).sum() }

  /// Total selected papers with an award.
  pub fn awarded(&self) -> usize { self.pairs.iter().map(|pair| pair.awarded).sum() }

  /// Papers handed to the downloader.
  pub fn files_attempted(&self) -> usize {
    self.batches().map(|batch| batch.scheduled).sum()
  }

  /// Artifacts persisted by the downloader.
  pub fn files_persisted(&self) -> usize {
    self.batches().map(|batch| batch.files_persisted).sum()
  }

  /// Pairs that could not be processed.
  pub fn failed_pairs(&self) -> impl Iterator<Item = &PairSummary> {
    self.pairs.iter().filter(|pair| pair.error.is_some())
  }

  /// Download counters summed over every pair.
  pub fn totals(&self) -> BatchReport {
    self.batches().cloned().fold(BatchReport::default(), |mut total, batch| {
      total.absorb(batch);
      total
    })
  }

  /// Download reports of the pairs that ran the downloader.
  fn batches(&self) -> impl Iterator<Item = &BatchReport> {
    self.pairs.iter().filter_map(|pair| pair.batch.as_ref())
  }
}

/// Collects papers for conference and year pairs.
pub struct Collector {
  /// Checkpoint of per-paper outcomes
  cache:       Arc<dyn CacheStore>,
  /// Where paper lists come from
  source:      Arc<dyn MetadataSource>,
  /// Where artifact bytes come from
  fetcher:     Arc<dyn Fetch>,
  /// Conferences the run may select
  registry:    ConferenceRegistry,
  /// Download destination
  output_dir:  PathBuf,
  /// Snapshot directory
  cache_dir:   PathBuf,
  /// Concurrent downloads per batch
  batch_size:  usize,
  /// Whether a snapshot is written after a download run
  checkpoint:  bool,
  /// Whether the cache is emptied before the run
  clear_cache: bool,
}

/// Builder for [`Collector`].
#[derive(Default)]
pub struct CollectorBuilder {
  /// See [`Collector::cache`]
  cache:       Option<Arc<dyn CacheStore>>,
  /// See [`Collector::source`]
  source:      Option<Arc<dyn MetadataSource>>,
  /// See [`Collector::fetcher`]
  fetcher:     Option<Arc<dyn Fetch>>,
  /// See [`Collector::registry`]
  registry:    Option<ConferenceRegistry>,
  /// See [`Collector::output_dir`]
  output_dir:  Option<PathBuf>,
  /// See [`Collector::cache_dir`]
  cache_dir:   Option<PathBuf>,
  /// See [`Collector::batch_size`]
  batch_size:  Option<usize>,
  /// See [`Collector::checkpoint`]
  checkpoint:  Option<bool>,
  /// See [`Collector::clear_cache`]
  clear_cache: bool,
}

impl CollectorBuilder {
  /// Uses `cache` as the checkpoint store. Defaults to a [`MemoryCache`].
  pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
    self.cache = Some(cache);
    self
  }

  /// Uses `source` for paper lists. Defaults to an [`HttpMetadataSource`] over the
  /// registry.
  pub fn with_source(mut self, source: Arc<dyn MetadataSource>) -> Self {
    self.source = Some(source);
    self
  }

  /// Uses `fetcher` for artifacts. Defaults to an [`HttpFetcher`].
  pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
    self.fetcher = Some(fetcher);
    self
  }

  /// Sets the conferences the collector accepts and where their metadata lives.
  pub fn with_registry(mut self, registry: ConferenceRegistry) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Sets the download destination. Defaults to [`DEFAULT_OUTPUT_DIR`].
  pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.output_dir = Some(dir.as_ref().to_path_buf());
    self
  }

  /// Sets the snapshot directory. Defaults to [`DEFAULT_CACHE_DIR`].
  pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.cache_dir = Some(dir.as_ref().to_path_buf());
    self
  }

  /// Sets the number of concurrent downloads. Defaults to [`DEFAULT_BATCH_SIZE`].
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = Some(batch_size);
    self
  }

  /// Whether a snapshot is written after a download run. Defaults to `true`.
  pub fn with_checkpoint(mut self, checkpoint: bool) -> Self {
    self.checkpoint = Some(checkpoint);
    self
  }

  /// Whether the cache is emptied before the run regardless of the output directory.
  pub fn with_clear_cache(mut self, clear_cache: bool) -> Self {
    self.clear_cache = clear_cache;
    self
  }

  /// Builds the collector.
  ///
  /// # Errors
  ///
  /// Returns [`ProceedingsError::Config`] when the batch size is zero.
  pub fn build(self) -> Result<Collector> {
    let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
      return Err(ProceedingsError::Config("batch size must be at least 1".to_owned()));
    }

    let registry = self.registry.unwrap_or_default();
    let source = self
      .source
      .unwrap_or_else(|| Arc::new(HttpMetadataSource::new(registry.clone())));

    Ok(Collector {
      cache: self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new())),
      source,
      fetcher: self.fetcher.unwrap_or_else(|| Arc::new(HttpFetcher::default())),
      registry,
      output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
      cache_dir: self.cache_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
      batch_size,
      checkpoint: self.checkpoint.unwrap_or(true),
      clear_cache: self.clear_cache,
    })
  }
}

impl Collector {
  /// Starts configuring a collector.
  pub fn builder() -> CollectorBuilder { CollectorBuilder::default() }

  /// The download destination.
  pub fn output_dir(&self) -> &Path { &self.output_dir }

  /// The snapshot directory.
  pub fn cache_dir(&self) -> &Path { &self.cache_dir }

  /// Resolves the request's selection into the pairs to process, in processing order.
  ///
  /// Conferences are the outer loop, years the inner one.
  ///
  /// # Errors
  ///
  /// Unsupported conferences, conferences missing from the registry and malformed
  /// years are configuration errors.
  pub fn plan(&self, request: &CollectRequest) -> Result<Vec<ConferenceDescriptor>> {
    let conferences = parse_conferences(&request.conferences)?;
    if let Some(missing) = conferences.iter().find(|c| !self.registry.contains(**c)) {
      return Err(ProceedingsError::UnsupportedConference(missing.to_string()));
    }
    let years = request.years.parse::<YearSpec>()?.years();

    Ok(
      conferences
        .into_iter()
        .flat_map(|conference| years.iter().map(move |year| conference.at(*year)))
        .collect(),
    )
  }

  /// Runs a collection.
  ///
  /// # Errors
  ///
  /// Only configuration problems and an unreachable cache fail the run; they are
  /// detected before any metadata is fetched. Problems with individual pairs are
  /// recorded in their [`PairSummary`].
  pub async fn collect(&self, request: &CollectRequest) -> Result<CollectReport> {
    let pairs = self.plan(request)?;

    if let Err(e) = self.cache.ping().await {
      error!("Cache backend is not reachable: {e}");
      return Err(match e {
        ProceedingsError::CacheUnavailable(_) => e,
        other => ProceedingsError::CacheUnavailable(other.to_string()),
      });
    }

    let fresh = if self.clear_cache {
      info!("Clearing cache on request");
      self.cache.clear().await?;
      true
    } else {
      cache::reload(self.cache.as_ref(), &self.output_dir, &self.cache_dir).await?
    };

    info!("Processing {} conference years in {} mode", pairs.len(), request.mode);
    let batcher = Batcher::new(Arc::new(Downloader::new(Arc::clone(&self.fetcher))))
      .with_batch_size(self.batch_size);

    let mut summaries = Vec::with_capacity(pairs.len());
    for descriptor in pairs {
      let mut summary = PairSummary::new(descriptor);
      if let Err(e) = self.process(&batcher, request, &mut summary).await {
        warn!("Skipping {descriptor}: {e}");
        summary.error = Some(e.to_string());
      }
      summaries.push(summary);
    }

    let snapshot = if self.checkpoint && request.mode == Mode::Download {
      let path = cache::snapshot_path(&self.cache_dir);
      match self.cache.dump_snapshot(&path).await {
        Ok(()) => Some(path),
        Err(e) => {
          warn!("Failed to write cache snapshot {}: {e}", path.display());
          None
        },
      }
    } else {
      None
    };

    let report = CollectReport {
      mode: request.mode,
      pairs: summaries,
      fresh,
      snapshot,
      pdfs_on_disk: count_pdfs(&self.output_dir)?,
    };

    match request.mode {
      Mode::Search => info!("{} of {} papers matched", report.matched(), report.accepted()),
      Mode::Stats => info!(
        "{} accepted, {} matched, {} awarded",
        report.accepted(),
        report.matched(),
        report.awarded()
      ),
      Mode::Download => info!(
        "Attempted {} papers, persisted {} files, {} PDFs in {}",
        report.files_attempted(),
        report.files_persisted(),
        report.pdfs_on_disk,
        self.output_dir.display()
      ),
    }
    Ok(report)
  }

  /// Processes one conference year into `summary`.
  async fn process(
    &self,
    batcher: &Batcher,
    request: &CollectRequest,
    summary: &mut PairSummary,
  ) -> Result<()> {
    let descriptor = summary.descriptor;
    let papers = self.source.accepted_papers(&descriptor).await?;
    summary.accepted = papers.len();
    if papers.is_empty() {
      info!("No papers for {descriptor}");
      return Ok(());
    }

    let selected = request.criteria.filter(papers);
    summary.matched = selected.len();
    summary.awarded = selected.iter().filter(|paper| paper.is_awarded()).count();
    info!("{descriptor}: {} of {} papers selected", summary.matched, summary.accepted);

    match request.mode {
      Mode::Search => {
        for paper in &selected {
          info!("{descriptor}: {paper}");
        }
        summary.titles = selected.into_iter().map(|paper| paper.title).collect();
      },
      Mode::Stats => {},
      Mode::Download => {
        let report = batcher
          .run(
            selected,
            &request.template,
            descriptor.year,
            &self.output_dir,
            Arc::clone(&self.cache),
          )
          .await?;
        summary.batch = Some(report);
      },
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::{conference::Conference, download::tests::StubFetcher, paper::Author};

  /// Serves canned paper lists and counts requests.
  #[derive(Default)]
  struct StubSource {
    papers:  HashMap<ConferenceDescriptor, Vec<Paper>>,
    failing: Vec<ConferenceDescriptor>,
    calls:   AtomicUsize,
  }

  impl StubSource {
    fn with(mut self, descriptor: ConferenceDescriptor, papers: Vec<Paper>) -> Self {
      self.papers.insert(descriptor, papers);
      self
    }

    fn failing(mut self, descriptor: ConferenceDescriptor) -> Self {
      self.failing.push(descriptor);
      self
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
  }

  #[async_trait]
  impl MetadataSource for StubSource {
    async fn accepted_papers(&self, descriptor: &ConferenceDescriptor) -> Result<Vec<Paper>> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.failing.contains(descriptor) {
        return Err(ProceedingsError::Http { url: descriptor.to_string(), status: 500 });
      }
      Ok(self.papers.get(descriptor).cloned().unwrap_or_default())
    }
  }

  fn neurips_2020() -> Vec<Paper> {
    vec![
      Paper::new("Graph Networks", "https://x/graph.pdf")
        .with_author(Author::new("Ada", "Lovelace").with_institution("DeepMind")),
      Paper::new("Vision Transformers", "https://x/vit.pdf")
        .with_author(Author::new("Alan", "Turing"))
        .with_award("Outstanding Paper"),
      Paper::new("Graph Attention", "https://x/gat.pdf")
        .with_author(Author::new("Grace", "Hopper"))
        .with_award("Best Paper"),
    ]
  }

  fn fetcher() -> Arc<StubFetcher> {
    Arc::new(StubFetcher::serving([
      ("https://x/graph.pdf", &b"%PDF graph"[..]),
      ("https://x/vit.pdf", &b"%PDF vit"[..]),
      ("https://x/gat.pdf", &b"%PDF gat"[..]),
    ]))
  }

  #[test]
  fn test_mode_parsing() {
    assert_eq!("Download".parse::<Mode>().unwrap(), Mode::Download);
    assert_eq!(" stats ".parse::<Mode>().unwrap(), Mode::Stats);
    assert!(matches!("scrape".parse::<Mode>(), Err(ProceedingsError::InvalidMode(_))));
    assert_eq!(Mode::Search.to_string(), "search");
  }

  #[test]
  fn test_plan_orders_conferences_then_years() {
    let collector = Collector::builder().build().unwrap();
    let plan = collector.plan(&CollectRequest::new("icml,iclr", "2019:2020")).unwrap();
    assert_eq!(plan, [
      Conference::Icml.at(2019),
      Conference::Icml.at(2020),
      Conference::Iclr.at(2019),
      Conference::Iclr.at(2020),
    ]);
  }

  #[test]
  fn test_plan_rejects_conference_missing_from_registry() {
    let collector = Collector::builder()
      .with_registry(ConferenceRegistry::empty().with_source(Conference::Icml, "http://m"))
      .build()
      .unwrap();
    assert!(collector.plan(&CollectRequest::new("icml", "2020")).is_ok());
    assert!(matches!(
      collector.plan(&CollectRequest::new("iclr", "2020")),
      Err(ProceedingsError::UnsupportedConference(_))
    ));
  }

  #[test]
  fn test_zero_batch_size_is_rejected() {
    assert!(matches!(
      Collector::builder().with_batch_size(0).build(),
      Err(ProceedingsError::Config(_))
    ));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_unsupported_conference_fetches_nothing() {
    let source = Arc::new(StubSource::default());
    let collector = Collector::builder().with_source(source.clone()).build().unwrap();

    let result = collector.collect(&CollectRequest::new("icml,nonexistent", "2020")).await;
    assert!(matches!(result, Err(ProceedingsError::UnsupportedConference(_))));
    assert_eq!(source.calls(), 0);
  }

  #[traced_test]
  #[tokio::test]
  async fn test_invalid_years_fetch_nothing() {
    let source = Arc::new(StubSource::default());
    let collector = Collector::builder().with_source(source.clone()).build().unwrap();

    let result = collector.collect(&CollectRequest::new("icml", "2021:2019")).await;
    assert!(matches!(result, Err(ProceedingsError::InvalidYears(_))));
    assert_eq!(source.calls(), 0);
  }

  #[traced_test]
  #[tokio::test]
  async fn test_search_reports_matching_titles() {
    let dir = tempdir().unwrap();
    let source = Arc::new(StubSource::default().with(Conference::Neurips.at(2020), neurips_2020()));
    let collector = Collector::builder()
      .with_source(source)
      .with_output_dir(dir.path().join("papers"))
      .with_cache_dir(dir.path().join("cache"))
      .build()
      .unwrap();

    let request = CollectRequest::new("neurips", "2020")
      .with_criteria(Criteria::from_lists("graph", "", ""));
    let report = collector.collect(&request).await.unwrap();

    assert_eq!(report.accepted(), 3);
    assert_eq!(report.pairs[0].titles, ["Graph Networks", "Graph Attention"]);
    assert_eq!(report.files_attempted(), 0);
    assert!(report.snapshot.is_none());
  }

  #[traced_test]
  #[tokio::test]
  async fn test_stats_counts_awards_among_matches() {
    let source = Arc::new(StubSource::default().with(Conference::Neurips.at(2020), neurips_2020()));
    let collector = Collector::builder().with_source(source).build().unwrap();

    let request = CollectRequest::new("neurips", "2020")
      .with_criteria(Criteria::from_lists("", "turing,hopper", ""))
      .with_mode(Mode::Stats);
    let report = collector.collect(&request).await.unwrap();

    assert_eq!((report.accepted(), report.matched(), report.awarded()), (3, 2, 2));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_pair_errors_do_not_stop_the_run() {
    let dir = tempdir().unwrap();
    let source = Arc::new(
      StubSource::default()
        .failing(Conference::Neurips.at(2019))
        .with(Conference::Neurips.at(2020), neurips_2020()),
    );
    let collector = Collector::builder()
      .with_source(source.clone())
      .with_fetcher(fetcher())
      .with_output_dir(dir.path().join("papers"))
      .with_cache_dir(dir.path().join("cache"))
      .build()
      .unwrap();

    let request = CollectRequest::new("neurips", "2019,2020").with_mode(Mode::Download);
    let report = collector.collect(&request).await.unwrap();

    assert_eq!(source.calls(), 2);
    assert_eq!(report.failed_pairs().count(), 1);
    assert_eq!(report.files_persisted(), 3);
    assert_eq!(report.pdfs_on_disk, 3);
    assert!(logs_contain("Skipping neurips 2019"));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_download_writes_snapshot() {
    let dir = tempdir().unwrap();
    let source = Arc::new(StubSource::default().with(Conference::Neurips.at(2020), neurips_2020()));
    let collector = Collector::builder()
      .with_source(source)
      .with_fetcher(fetcher())
      .with_output_dir(dir.path().join("papers"))
      .with_cache_dir(dir.path().join("cache"))
      .build()
      .unwrap();

    let report = collector
      .collect(&CollectRequest::new("neurips", "2020").with_mode(Mode::Download))
      .await
      .unwrap();

    let snapshot = report.snapshot.unwrap();
    let written: BTreeMap<String, u8> =
      serde_json::from_slice(&std::fs::read(snapshot).unwrap()).unwrap();
    assert_eq!(written.len(), 3);
    assert!(dir.path().join("papers").join("2020-lovelace-graph networks.pdf").exists());
  }

  #[traced_test]
  #[tokio::test]
  async fn test_clear_cache_forces_fresh_run() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("papers")).unwrap();
    std::fs::write(dir.path().join("papers").join("other.pdf"), b"%PDF").unwrap();

    let cache = Arc::new(MemoryCache::with_entries([("graph networks", true)]));
    let fetcher = fetcher();
    let source = Arc::new(StubSource::default().with(Conference::Neurips.at(2020), neurips_2020()));
    let collector = Collector::builder()
      .with_cache(cache)
      .with_source(source)
      .with_fetcher(fetcher.clone())
      .with_output_dir(dir.path().join("papers"))
      .with_cache_dir(dir.path().join("cache"))
      .with_checkpoint(false)
      .with_clear_cache(true)
      .build()
      .unwrap();

    let report = collector
      .collect(&CollectRequest::new("neurips", "2020").with_mode(Mode::Download))
      .await
      .unwrap();

    assert!(report.fresh);
    assert_eq!(fetcher.calls(), 3);
    assert!(report.snapshot.is_none());
  }

  /// A cache whose backend never answers.
  struct UnreachableCache;

  #[async_trait]
  impl CacheStore for UnreachableCache {
    async fn get(&self, _key: &str) -> Result<Option<bool>> { Ok(None) }

    async fn set(&self, _key: &str, _downloaded: bool) -> Result<()> { Ok(()) }

    async fn clear(&self) -> Result<()> { Ok(()) }

    async fn entries(&self) -> Result<BTreeMap<String, bool>> { Ok(BTreeMap::new()) }

    async fn ping(&self) -> Result<()> {
      Err(ProceedingsError::Path(std::io::Error::other("connection refused")))
    }
  }

  #[traced_test]
  #[tokio::test]
  async fn test_unreachable_cache_is_fatal() {
    let source = Arc::new(StubSource::default());
    let collector = Collector::builder()
      .with_cache(Arc::new(UnreachableCache))
      .with_source(source.clone())
      .build()
      .unwrap();

    let result = collector.collect(&CollectRequest::new("icml", "2020")).await;
    assert!(matches!(result, Err(ProceedingsError::CacheUnavailable(_))));
    assert_eq!(source.calls(), 0);
  }
}
