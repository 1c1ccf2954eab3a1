use super::*;

fn awarded_papers() -> Vec<Paper> {
  vec![
    Paper::new("Deep Residual Learning", "https://x/resnet.pdf")
      .with_author(Author::new("Kaiming", "He").with_institution("Microsoft Research"))
      .with_award("Best Paper"),
    Paper::new("Fully Convolutional Networks", "https://x/fcn.pdf")
      .with_author(Author::new("Jonathan", "Long").with_institution("UC Berkeley")),
    Paper::new("Spatial Transformer Networks", "https://x/stn.pdf")
      .with_author(Author::new("Max", "Jaderberg").with_institution("Google DeepMind")),
  ]
}

#[traced_test]
#[tokio::test]
async fn test_search_never_downloads() -> TestResult<()> {
  let dir = scratch();
  let source =
    Arc::new(CountingSource::default().with(Conference::Cvpr.at(2016), awarded_papers()));
  let fetcher = Arc::new(CountingFetcher::default());

  let request = CollectRequest::new("cvpr", "2016")
    .with_criteria(Criteria::from_lists("networks", "", "berkeley"))
    .with_mode(Mode::Search);
  let report = collector(dir.path(), Arc::new(MemoryCache::new()), source, fetcher.clone())
    .collect(&request)
    .await?;

  assert_eq!(
    report.pairs[0].titles,
    ["Fully Convolutional Networks", "Spatial Transformer Networks"]
  );
  assert_eq!(fetcher.calls(), 0);
  assert!(!dir.path().join("papers").exists());
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_stats_over_every_conference() -> TestResult<()> {
  let dir = scratch();
  let source = Arc::new(
    CountingSource::default()
      .with(Conference::Cvpr.at(2016), awarded_papers())
      .with(Conference::Iccv.at(2016), accepted_papers(4)),
  );

  let request = CollectRequest::new("*", "2016")
    .with_criteria(Criteria::from_lists("", "", "microsoft,mit"))
    .with_mode(Mode::Stats);
  let report = collector(
    dir.path(),
    Arc::new(MemoryCache::new()),
    source.clone(),
    Arc::new(CountingFetcher::default()),
  )
  .collect(&request)
  .await?;

  assert_eq!(source.calls(), Conference::ALL.len());
  assert_eq!(report.pairs.len(), Conference::ALL.len());
  assert_eq!((report.accepted(), report.matched(), report.awarded()), (7, 5, 1));
  assert!(report.snapshot.is_none());
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_configuration_errors_precede_metadata_requests() {
  let dir = scratch();
  let source = Arc::new(CountingSource::default());
  let collector = collector(
    dir.path(),
    Arc::new(MemoryCache::new()),
    source.clone(),
    Arc::new(CountingFetcher::default()),
  );

  for (conferences, years) in [("nonexistent", "2020"), ("icml", "20x0"), ("", "2020")] {
    let err = collector.collect(&download(conferences, years)).await.unwrap_err();
    assert!(err.is_config(), "{conferences} {years}: {err}");
  }
  assert_eq!(source.calls(), 0);
}
