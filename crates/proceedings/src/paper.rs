//! Paper and author records as published by a conference metadata source.
//!
//! Records arrive as JSON documents with a loose shape: a paper may list a single
//! artifact URL or several mirrors, an award may be a string or a list, and some sources
//! split an author's given name into parts. The types here accept all of those and expose
//! a uniform view to the rest of the crate.
//!
//! # Examples
//!
//! ```
//! use proceedings::paper::Paper;
//!
//! let paper: Paper = serde_json::from_str(
//!   r#"{
//!     "title": "  Graph Neural Networks ",
//!     "authors": [{ "given_name": "Jane", "family_name": "Doe", "institution": "MIT" }],
//!     "award": null,
//!     "hash": "abc123",
//!     "url": ["https://a.example/p.pdf", "https://b.example/p.pdf"]
//!   }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(paper.key(), "graph neural networks");
//! assert_eq!(paper.url.as_slice().len(), 2);
//! ```

use serde::Deserializer;

use super::*;

/// A single accepted-conference publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
  /// The paper's full title, as published
  pub title:   String,
  /// Ordered list of authors
  #[serde(default)]
  pub authors: Vec<Author>,
  /// Award designation, if any
  #[serde(default)]
  pub award:   Option<Award>,
  /// Source-site identifier for the paper
  #[serde(default)]
  pub hash:    Option<String>,
  /// One or more artifact locations
  #[serde(default)]
  pub url:     Urls,
}

/// Author information for a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Author {
  /// Given name(s); sources that split the name into parts are joined with spaces
  #[serde(default, deserialize_with = "deserialize_given_name")]
  pub given_name:  String,
  /// Family name
  #[serde(default, deserialize_with = "deserialize_nullable_string")]
  pub family_name: String,
  /// Institutional affiliation
  #[serde(default)]
  pub institution: Option<String>,
}

/// Award designation, published either as one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Award {
  /// A single award name
  One(String),
  /// Several award names
  Many(Vec<String>),
}

/// Artifact locations of a paper, published either as one string or a list of mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Urls {
  /// A single artifact location
  One(String),
  /// Several artifact locations
  Many(Vec<String>),
}

impl Paper {
  /// Creates a paper with the given title and a single artifact location.
  pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      title:   title.into(),
      authors: Vec::new(),
      award:   None,
      hash:    None,
      url:     Urls::One(url.into()),
    }
  }

  /// Adds an author to the end of the author list.
  pub fn with_author(mut self, author: Author) -> Self {
    self.authors.push(author);
    self
  }

  /// Replaces the artifact locations.
  pub fn with_urls(mut self, urls: Vec<String>) -> Self {
    self.url = Urls::Many(urls);
    self
  }

  /// Sets the award designation.
  pub fn with_award(mut self, award: impl Into<String>) -> Self {
    self.award = Some(Award::One(award.into()));
    self
  }

  /// The normalized title used as this paper's cache key.
  pub fn key(&self) -> String { normalize_title(&self.title) }

  /// Checks the invariants every record must hold before it enters the pipeline.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(ProceedingsError::EmptyTitle);
    }
    Ok(())
  }

  /// The first listed author, if any.
  pub fn first_author(&self) -> Option<&Author> { self.authors.first() }

  /// Whether the paper received at least one award.
  pub fn is_awarded(&self) -> bool { self.award.as_ref().is_some_and(Award::is_awarded) }
}

impl Author {
  /// Creates an author without an affiliation.
  pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
    Self { given_name: given_name.into(), family_name: family_name.into(), institution: None }
  }

  /// Sets the author's institution.
  pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
    self.institution = Some(institution.into());
    self
  }

  /// The author's name as `"given family"`.
  pub fn full_name(&self) -> String {
    format!("{} {}", self.given_name.trim(), self.family_name.trim()).trim().to_string()
  }

  /// The family name, falling back to the last token of the given name when a source
  /// left the family name empty.
  pub fn surname(&self) -> &str {
    let family = self.family_name.trim();
    if !family.is_empty() {
      return family;
    }
    self.given_name.split_whitespace().last().unwrap_or_default()
  }
}

impl Award {
  /// Whether this designation names an actual award.
  pub fn is_awarded(&self) -> bool {
    match self {
      Award::One(award) => !award.trim().is_empty(),
      Award::Many(awards) => awards.iter().any(|award| !award.trim().is_empty()),
    }
  }
}

impl Urls {
  /// All artifact locations, in published order.
  pub fn as_slice(&self) -> &[String] {
    match self {
      Urls::One(url) => std::slice::from_ref(url),
      Urls::Many(urls) => urls,
    }
  }

  /// Artifact locations worth fetching: trimmed, with blank entries dropped.
  pub fn locations(&self) -> Vec<&str> {
    self.as_slice().iter().map(|url| url.trim()).filter(|url| !url.is_empty()).collect()
  }

  /// Whether there is no artifact location at all.
  pub fn is_empty(&self) -> bool { self.locations().is_empty() }
}

impl Default for Urls {
  fn default() -> Self { Urls::Many(Vec::new()) }
}

impl Display for Paper {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.title) }
}

/// Normalizes a title into its cache key: trimmed and lower-cased.
pub fn normalize_title(title: &str) -> String { title.trim().to_lowercase() }

/// Decodes a metadata document into papers, skipping malformed records.
///
/// Each array element is decoded on its own so that a single broken record does not
/// discard the whole conference. Skipped records are logged with the reason.
pub fn decode_papers(data: &[u8]) -> Result<Vec<Paper>> {
  let records: Vec<serde_json::Value> = serde_json::from_slice(data)?;
  let total = records.len();

  let papers: Vec<Paper> = records
    .into_iter()
    .enumerate()
    .filter_map(|(index, record)| match serde_json::from_value::<Paper>(record) {
      Ok(paper) => match paper.validate() {
        Ok(()) => Some(paper),
        Err(e) => {
          warn!("Skipping paper record {index}: {e}");
          None
        },
      },
      Err(e) => {
        warn!("Skipping malformed paper record {index}: {e}");
        None
      },
    })
    .collect();

  debug!("Decoded {} of {total} paper records", papers.len());
  Ok(papers)
}

/// Accepts a given name as a string, a list of name parts, or null.
fn deserialize_given_name<'de, D>(deserializer: D) -> core::result::Result<String, D::Error>
where D: Deserializer<'de> {
  /// Shapes a given name is published in.
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum GivenName {
    /// Plain string
    Whole(String),
    /// Name parts
    Parts(Vec<String>),
  }

  Ok(match Option::<GivenName>::deserialize(deserializer)? {
    Some(GivenName::Whole(name)) => name,
    Some(GivenName::Parts(parts)) => parts.join(" "),
    None => String::new(),
  })
}

/// Accepts a string or null.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> core::result::Result<String, D::Error>
where D: Deserializer<'de> {
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
