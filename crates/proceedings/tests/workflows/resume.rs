use super::*;

#[traced_test]
#[tokio::test]
async fn test_second_run_downloads_nothing() -> TestResult<()> {
  let dir = scratch();
  let source =
    Arc::new(CountingSource::default().with(Conference::Icml.at(2021), accepted_papers(5)));

  let fetcher = Arc::new(CountingFetcher::default());
  let first = collector(dir.path(), Arc::new(MemoryCache::new()), source.clone(), fetcher.clone());
  let report = first.collect(&download("icml", "2021")).await?;
  assert_eq!(report.files_persisted(), 5);
  assert_eq!(fetcher.calls(), 5);
  assert!(report.snapshot.is_some());

  // A new process: nothing in memory, only the snapshot and the files on disk.
  let fetcher = Arc::new(CountingFetcher::default());
  let second = collector(dir.path(), Arc::new(MemoryCache::new()), source.clone(), fetcher.clone());
  let report = second.collect(&download("icml", "2021")).await?;

  assert!(!report.fresh);
  assert_eq!(fetcher.calls(), 0);
  assert_eq!(report.totals().skipped, 5);
  assert_eq!(report.pdfs_on_disk, 5);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_failures_are_retried_on_next_run_only() -> TestResult<()> {
  let dir = scratch();
  let source =
    Arc::new(CountingSource::default().with(Conference::Neurips.at(2020), accepted_papers(16)));
  let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());

  let unreachable = [2, 9, 15].map(|i| format!("https://x/{i}.pdf"));
  let fetcher = Arc::new(CountingFetcher::unreachable(unreachable));
  let report = collector(dir.path(), Arc::clone(&cache), source.clone(), fetcher.clone())
    .collect(&download("neurips", "2020"))
    .await?;

  let totals = report.totals();
  assert_eq!((totals.succeeded, totals.failed), (13, 3));
  assert_eq!(fetcher.calls(), 16);
  let entries = cache.entries().await?;
  assert_eq!(entries.values().filter(|downloaded| **downloaded).count(), 13);
  assert_eq!(entries.get("learning problem 9"), Some(&false));

  let fetcher = Arc::new(CountingFetcher::default());
  let report = collector(dir.path(), Arc::clone(&cache), source, fetcher.clone())
    .collect(&download("neurips", "2020"))
    .await?;

  assert_eq!(fetcher.calls(), 3);
  assert_eq!(report.totals().succeeded, 3);
  assert_eq!(report.pdfs_on_disk, 16);
  assert!(cache.entries().await?.values().all(|downloaded| *downloaded));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_emptied_output_directory_starts_over() -> TestResult<()> {
  let dir = scratch();
  let source =
    Arc::new(CountingSource::default().with(Conference::Uai.at(2019), accepted_papers(3)));
  let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());

  collector(dir.path(), Arc::clone(&cache), source.clone(), Arc::new(CountingFetcher::default()))
    .collect(&download("uai", "2019"))
    .await?;
  std::fs::remove_dir_all(dir.path().join("papers"))?;

  let fetcher = Arc::new(CountingFetcher::default());
  let report = collector(dir.path(), cache, source, fetcher.clone())
    .collect(&download("uai", "2019"))
    .await?;

  assert!(report.fresh);
  assert_eq!(fetcher.calls(), 3);
  assert_eq!(report.pdfs_on_disk, 3);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_existing_files_are_recorded_without_fetching() -> TestResult<()> {
  let dir = scratch();
  let papers = dir.path().join("papers");
  std::fs::create_dir_all(&papers)?;
  std::fs::write(papers.join("2019-number0-learning problem 0.pdf"), b"%PDF kept")?;

  let source =
    Arc::new(CountingSource::default().with(Conference::Uai.at(2019), accepted_papers(2)));
  let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
  let fetcher = Arc::new(CountingFetcher::default());

  collector(dir.path(), Arc::clone(&cache), source, fetcher.clone())
    .collect(&download("uai", "2019"))
    .await?;

  assert_eq!(fetcher.calls(), 1);
  assert_eq!(cache.get("learning problem 0").await?, Some(true));
  assert_eq!(std::fs::read(papers.join("2019-number0-learning problem 0.pdf"))?, b"%PDF kept");
  Ok(())
}
