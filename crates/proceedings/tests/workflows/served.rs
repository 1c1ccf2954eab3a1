use mockito::Server;
use proceedings::{
  cache::SqliteCache, conference::ConferenceRegistry, download::HttpFetcher,
  source::HttpMetadataSource,
};

use super::*;

#[traced_test]
#[tokio::test]
async fn test_download_from_metadata_server() -> TestResult<()> {
  let mut server = Server::new_async().await;
  let base = server.url();

  let metadata = server
    .mock("GET", "/iclr/iclr_2021.json")
    .with_status(200)
    .with_body(format!(
      r#"[
        {{"title": "Sparse Mixtures", "authors": [{{"given_name": ["Ada", "B."],
          "family_name": "Lovelace", "institution": "ETH"}}], "award": null, "hash": "s1",
          "url": ["{base}/pdf/s1.pdf", "{base}/pdf/s1-supp.pdf"]}},
        {{"title": "Missing Artifacts", "authors": [], "url": "{base}/pdf/gone.pdf"}},
        {{"title": null, "url": "{base}/pdf/none.pdf"}}
      ]"#
    ))
    .expect(2)
    .create_async()
    .await;
  let main = server
    .mock("GET", "/pdf/s1.pdf")
    .with_body("%PDF main")
    .expect(1)
    .create_async()
    .await;
  let supplement = server
    .mock("GET", "/pdf/s1-supp.pdf")
    .with_body("%PDF supplement")
    .expect(1)
    .create_async()
    .await;
  let gone = server.mock("GET", "/pdf/gone.pdf").with_status(404).expect(2).create_async().await;

  let dir = scratch();
  let registry = ConferenceRegistry::default().with_base_url(&base);
  let database = dir.path().join("db").join("checkpoints.db");

  for _ in 0..2 {
    let collector = Collector::builder()
      .with_cache(Arc::new(SqliteCache::open(&database).await?))
      .with_source(Arc::new(HttpMetadataSource::new(registry.clone())))
      .with_fetcher(Arc::new(HttpFetcher::default()))
      .with_registry(registry.clone())
      .with_output_dir(dir.path().join("papers"))
      .with_cache_dir(dir.path().join("cache"))
      .build()?;
    let report = collector.collect(&download("iclr", "2021").with_template("title")).await?;
    assert_eq!(report.accepted(), 2);
    assert_eq!(report.pdfs_on_disk, 2);
  }

  metadata.assert_async().await;
  main.assert_async().await;
  supplement.assert_async().await;
  gone.assert_async().await;

  let papers = dir.path().join("papers");
  assert_eq!(std::fs::read(papers.join("sparse mixtures.pdf"))?, b"%PDF main");
  assert_eq!(std::fs::read(papers.join("sparse mixtures_1.pdf"))?, b"%PDF supplement");
  assert!(!papers.join("missing artifacts.pdf").exists());

  let cache = SqliteCache::open(&database).await?;
  assert_eq!(cache.get("sparse mixtures").await?, Some(true));
  assert_eq!(cache.get("missing artifacts").await?, Some(false));
  Ok(())
}
