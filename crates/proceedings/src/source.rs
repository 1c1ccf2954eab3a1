//! Metadata sources: where the list of accepted papers for a conference year comes from.
//!
//! The collector only sees the [`MetadataSource`] trait. The production implementation,
//! [`HttpMetadataSource`], downloads one JSON document per conference year from the
//! location given by a [`ConferenceRegistry`].
//!
//! A conference year that has no document (HTTP 404) simply has no papers. Records that
//! do not decode are skipped one by one, see [`decode_papers`](crate::paper::decode_papers).
//!
//! # Examples
//!
//! ```no_run
//! use proceedings::{
//!   conference::{Conference, ConferenceRegistry},
//!   prelude::*,
//!   source::HttpMetadataSource,
//! };
//!
//! # async fn example() -> Result<(), ProceedingsError> {
//! let source = HttpMetadataSource::new(ConferenceRegistry::default());
//! let papers = source.accepted_papers(&Conference::Icml.at(2020)).await?;
//! println!("{} accepted papers", papers.len());
//! # Ok(())
//! # }
//! ```

use reqwest::StatusCode;

use super::*;
use crate::paper::decode_papers;

/// Provides the accepted papers of one conference year.
#[async_trait]
pub trait MetadataSource: Send + Sync {
  /// Fetches every accepted paper of the given conference year.
  ///
  /// A conference year without published metadata yields an empty list, not an error.
  async fn accepted_papers(&self, descriptor: &ConferenceDescriptor) -> Result<Vec<Paper>>;
}

/// Fetches metadata documents over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMetadataSource {
  /// Where each conference's documents live
  registry: ConferenceRegistry,
  /// Shared HTTP client
  client:   reqwest::Client,
  /// Headers sent with every request
  headers:  BTreeMap<String, String>,
}

impl HttpMetadataSource {
  /// Creates a source resolving document locations through `registry`.
  pub fn new(registry: ConferenceRegistry) -> Self {
    Self::with_client(registry, reqwest::Client::new())
  }

  /// Creates a source using a preconfigured HTTP client (timeouts, proxies, ...).
  pub fn with_client(registry: ConferenceRegistry, client: reqwest::Client) -> Self {
    let mut headers = BTreeMap::new();
    headers.insert("Accept".to_owned(), "application/json".to_owned());
    Self { registry, client, headers }
  }

  /// Adds a header sent with every request.
  pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.insert(key.into(), value.into());
    self
  }

  /// The registry used to resolve document locations.
  pub fn registry(&self) -> &ConferenceRegistry { &self.registry }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
  async fn accepted_papers(&self, descriptor: &ConferenceDescriptor) -> Result<Vec<Paper>> {
    let url = self.registry.resolve(descriptor);
    debug!("Fetching metadata for {descriptor} from {url}");

    let mut request = self.client.get(&url);
    for (key, value) in &self.headers {
      request = request.header(key, value);
    }

    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
      info!("No metadata published for {descriptor}");
      return Ok(Vec::new());
    }

    if !status.is_success() {
      trace!("{descriptor} metadata response: {response:?}");
      return Err(ProceedingsError::Http { url, status: status.as_u16() });
    }

    let data = response.bytes().await?;
    decode_papers(&data)
  }
}
