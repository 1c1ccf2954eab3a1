//! Integration tests for the proceedings CLI commands.
//!
//! Every test points `--config` at a temporary directory and uses the in-memory cache,
//! so nothing outside of it is touched and no request leaves the machine.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::{tempdir, TempDir};

// Helper function to create a clean command instance
fn proceedings() -> Command { Command::cargo_bin("proceedings").unwrap() }

// Helper writing a configuration whose every path lives in a temporary directory
fn temp_config() -> (TempDir, PathBuf) {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");
  proceedings()
    .arg("init")
    .arg("--config")
    .arg(&config)
    .arg("--output")
    .arg(dir.path().join("papers"))
    .arg("--cache-dir")
    .arg(dir.path().join("cache"))
    .arg("--db-path")
    .arg(dir.path().join("checkpoints.db"))
    .arg("--memory")
    .arg("--accept-defaults")
    .assert()
    .success();
  (dir, config)
}

fn with_config(config: &Path) -> Command {
  let mut command = proceedings();
  command.arg("--config").arg(config);
  command
}

#[test]
#[serial]
fn test_init_writes_config() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("nested").join("config.toml");

  proceedings()
    .arg("init")
    .arg("--config")
    .arg(&config)
    .arg("--memory")
    .arg("--batch-size")
    .arg("4")
    .arg("--accept-defaults")
    .assert()
    .success()
    .stdout(predicate::str::contains("Configuration written to"));

  let written = std::fs::read_to_string(&config).unwrap();
  assert!(written.contains("cache_backend = \"memory\""));
  assert!(written.contains("batch_size = 4"));

  // Overwriting is confirmed automatically with --accept-defaults
  proceedings()
    .arg("init")
    .arg("--config")
    .arg(&config)
    .arg("--accept-defaults")
    .assert()
    .success();
  assert!(std::fs::read_to_string(&config).unwrap().contains("cache_backend = \"sqlite\""));
}

#[test]
#[serial]
fn test_init_rejects_zero_batch_size() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");

  proceedings()
    .args(["init", "--batch-size", "0", "--accept-defaults", "--config"])
    .arg(&config)
    .assert()
    .failure()
    .stderr(predicate::str::contains("batch_size must be at least 1"));
  assert!(!config.exists());
}

#[test]
#[serial]
fn test_unsupported_conference_fails_before_any_work() {
  let (dir, config) = temp_config();

  with_config(&config)
    .args(["download", "--conferences", "icml,nonexistent", "--years", "2020"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("\"nonexistent\" is not supported"));

  assert!(!dir.path().join("papers").exists());
  assert!(!dir.path().join("cache").exists());
}

#[test]
#[serial]
fn test_invalid_years_fail() {
  let (_dir, config) = temp_config();

  with_config(&config)
    .args(["search", "-c", "icml", "-y", "2021:2019"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid year selection \"2021:2019\""));
}

// Helper writing a configuration that reads neurips metadata from `base`
fn served_config(dir: &Path, base: &str) -> PathBuf {
  let config = dir.join("config.toml");
  std::fs::write(
    &config,
    format!(
      "output_dir = '{}'\n\
       cache_dir = '{}'\n\
       cache_backend = \"memory\"\n\
       \n\
       [sources]\n\
       neurips = \"{base}\"\n",
      dir.join("papers").display(),
      dir.join("cache").display(),
    ),
  )
  .unwrap();
  config
}

#[test]
#[serial]
fn test_download_without_keywords_selects_nothing() {
  let mut server = mockito::Server::new();
  let metadata = format!(
    r#"[{{ "title": "Audio Synthesis", "url": "{}/audio.pdf" }}]"#,
    server.url()
  );
  let _metadata = server.mock("GET", "/neurips_2020.json").with_body(metadata).create();
  let pdf = server.mock("GET", "/audio.pdf").with_body("%PDF").expect(0).create();

  let dir = tempdir().unwrap();
  let config = served_config(dir.path(), &server.url());

  with_config(&config)
    .args(["download", "-c", "neurips", "-y", "2020"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No keywords given"))
    .stdout(predicate::str::contains("Attempted 0 papers"));

  pdf.assert();
  assert!(!dir.path().join("papers").join("2020-audio synthesis.pdf").exists());
}

#[test]
#[serial]
fn test_download_with_wildcard_title_selects_everything() {
  let mut server = mockito::Server::new();
  let metadata = format!(
    r#"[{{ "title": "Audio Synthesis", "url": "{}/audio.pdf" }}]"#,
    server.url()
  );
  let _metadata = server.mock("GET", "/neurips_2020.json").with_body(metadata).create();
  let pdf = server.mock("GET", "/audio.pdf").with_body("%PDF").expect(1).create();

  let dir = tempdir().unwrap();
  let config = served_config(dir.path(), &server.url());

  with_config(&config)
    .args(["download", "-c", "neurips", "-y", "2020", "--title", "*", "--no-checkpoint"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Attempted 1 papers"));

  pdf.assert();
  assert!(dir.path().join("papers").join("2020--audio synthesis.pdf").exists());
}

#[test]
#[serial]
fn test_selection_is_required() {
  proceedings().args(["stats", "--years", "2020"]).assert().failure();
}

#[test]
#[serial]
fn test_malformed_config_fails() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");
  std::fs::write(&config, "batch_size = \"many\"").unwrap();

  with_config(&config).args(["search", "-c", "icml", "-y", "2020"]).assert().failure();
}

#[test]
#[serial]
fn test_clean_removes_empty_files_and_snapshots() {
  let (dir, config) = temp_config();
  let papers = dir.path().join("papers");
  let cache = dir.path().join("cache");
  std::fs::create_dir_all(&papers).unwrap();
  std::fs::create_dir_all(&cache).unwrap();
  std::fs::write(papers.join("empty.pdf"), b"").unwrap();
  std::fs::write(papers.join("kept.pdf"), b"%PDF").unwrap();
  std::fs::write(cache.join("checkpoint-20240101T000000.000Z.json"), "{}").unwrap();

  with_config(&config)
    .args(["clean", "--accept-defaults"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 1 empty files"))
    .stdout(predicate::str::contains("Removed 1 cache files"));

  assert!(!papers.join("empty.pdf").exists());
  assert!(papers.join("kept.pdf").exists());
  assert!(!cache.join("checkpoint-20240101T000000.000Z.json").exists());
}

#[test]
#[serial]
fn test_clean_keep_cache() {
  let (dir, config) = temp_config();
  let cache = dir.path().join("cache");
  std::fs::create_dir_all(&cache).unwrap();
  std::fs::write(cache.join("checkpoint.json"), "{}").unwrap();

  with_config(&config)
    .args(["clean", "--keep-cache"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 0 empty files"));

  assert!(cache.join("checkpoint.json").exists());
}
