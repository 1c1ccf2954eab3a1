//! Conference paper harvesting and resumable PDF retrieval.
//!
//! `proceedings` turns per-conference metadata documents into a directory of downloaded
//! papers. It provides:
//!
//! - Paper metadata retrieval for supported machine learning conferences
//! - Keyword selection over titles, authors and affiliations
//! - Bounded, batched concurrent downloads with per-paper failure isolation
//! - A checkpoint cache so that re-runs skip everything already downloaded
//!
//! # Getting Started
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use proceedings::{
//!   cache::MemoryCache,
//!   collector::{CollectRequest, Collector, Mode},
//!   prelude::*,
//!   query::Criteria,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let collector = Collector::builder()
//!     .with_cache(Arc::new(MemoryCache::new()))
//!     .with_output_dir("papers")
//!     .build()?;
//!
//!   let request = CollectRequest::new("neurips", "2020")
//!     .with_criteria(Criteria::from_lists("graph", "", ""))
//!     .with_mode(Mode::Download);
//!
//!   let report = collector.collect(&request).await?;
//!   println!("persisted {} files", report.files_persisted());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: Paper and author records as published by the metadata source
//! - [`conference`]: Supported conferences, their registry and year selection
//! - [`query`]: Keyword selection of papers
//! - [`template`]: Destination filename templating
//! - [`cache`]: Checkpoint store trait, its adapters and snapshots
//! - [`source`]: Metadata source trait and its HTTP implementation
//! - [`download`]: Single-paper downloads and zero-byte housekeeping
//! - [`batch`]: Bounded batches of concurrent downloads
//! - [`collector`]: The orchestrator over conference and year pairs
//! - [`config`]: On-disk run configuration

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::{BTreeMap, HashMap},
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod batch;
pub mod cache;
pub mod collector;
pub mod conference;
pub mod config;
pub mod download;
pub mod error;
pub mod paper;
pub mod query;
pub mod source;
pub mod template;

use crate::{
  cache::CacheStore,
  conference::{Conference, ConferenceDescriptor, ConferenceRegistry},
  download::{DownloadOutcome, Downloader, Fetch},
  error::*,
  paper::Paper,
  query::Criteria,
  source::MetadataSource,
  template::Template,
};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use proceedings::prelude::*;
///
/// async fn example(cache: &dyn CacheStore) -> Result<(), ProceedingsError> {
///   cache.set("attention is all you need", true).await?;
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    cache::CacheStore, download::Fetch, error::ProceedingsError, source::MetadataSource,
  };
}
