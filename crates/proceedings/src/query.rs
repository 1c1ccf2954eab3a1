//! Keyword selection of papers.
//!
//! A [`Criteria`] holds three keyword families. A paper is selected when any keyword of
//! any family matches:
//!
//! - title keywords against the lower-cased title,
//! - author keywords against each lower-cased `"given family"` name,
//! - affiliation keywords against each lower-cased institution.
//!
//! Matching is substring based. The title keyword `*` selects every paper. A family with
//! no keywords never matches anything, so an empty [`Criteria`] selects nothing.
//!
//! # Examples
//!
//! ```
//! use proceedings::{paper::Paper, query::Criteria};
//!
//! let criteria = Criteria::default().with_title_keywords(["graph"]);
//! assert!(criteria.matches(&Paper::new("Graph Neural Networks", "https://x.example/g.pdf")));
//! assert!(!criteria.matches(&Paper::new("Audio Synthesis", "https://x.example/a.pdf")));
//! ```

use super::*;

/// Title keyword that selects every paper.
pub const WILDCARD: &str = "*";

/// Keyword families used to select papers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
  /// Lower-cased title keywords
  #[serde(default)]
  title:       Vec<String>,
  /// Lower-cased author name keywords
  #[serde(default)]
  author:      Vec<String>,
  /// Lower-cased institution keywords
  #[serde(default)]
  affiliation: Vec<String>,
}

impl Criteria {
  /// Criteria selecting every paper.
  pub fn all() -> Self { Self::default().with_title_keywords([WILDCARD]) }

  /// Builds criteria from comma separated keyword lists, as given on a command line.
  ///
  /// Empty lists and empty entries are ignored.
  pub fn from_lists(title: &str, author: &str, affiliation: &str) -> Self {
    let split = |list: &str| list.split(',').map(str::to_owned).collect::<Vec<_>>();
    Self::default()
      .with_title_keywords(split(title))
      .with_author_keywords(split(author))
      .with_affiliation_keywords(split(affiliation))
  }

  /// Adds title keywords.
  pub fn with_title_keywords<I, S>(mut self, keywords: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>, {
    self.title.extend(clean(keywords));
    self
  }

  /// Adds author keywords.
  pub fn with_author_keywords<I, S>(mut self, keywords: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>, {
    self.author.extend(clean(keywords));
    self
  }

  /// Adds affiliation keywords.
  pub fn with_affiliation_keywords<I, S>(mut self, keywords: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>, {
    self.affiliation.extend(clean(keywords));
    self
  }

  /// Whether the title wildcard is present.
  pub fn is_wildcard(&self) -> bool { self.title.iter().any(|keyword| keyword == WILDCARD) }

  /// Whether no keyword at all is set, in which case nothing is selected.
  pub fn is_empty(&self) -> bool {
    self.title.is_empty() && self.author.is_empty() && self.affiliation.is_empty()
  }

  /// Whether the paper is selected by these criteria.
  pub fn matches(&self, paper: &Paper) -> bool {
    if self.is_wildcard() {
      return true;
    }

    let title = paper.title.to_lowercase();
    if self.title.iter().any(|keyword| title.contains(keyword.as_str())) {
      return true;
    }

    if !self.author.is_empty() {
      let names: Vec<String> =
        paper.authors.iter().map(|author| author.full_name().to_lowercase()).collect();
      if self.author.iter().any(|keyword| names.iter().any(|name| name.contains(keyword.as_str())))
      {
        return true;
      }
    }

    if !self.affiliation.is_empty() {
      let institutions: Vec<String> = paper
        .authors
        .iter()
        .filter_map(|author| author.institution.as_deref())
        .map(str::to_lowercase)
        .collect();
      let listed = |keyword: &String| {
        institutions.iter().any(|institution| institution.contains(keyword.as_str()))
      };
      if self.affiliation.iter().any(listed) {
        return true;
      }
    }

    false
  }

  /// Keeps the selected papers, preserving their order.
  pub fn filter(&self, papers: Vec<Paper>) -> Vec<Paper> {
    let selected: Vec<Paper> = papers.into_iter().filter(|paper| self.matches(paper)).collect();
    trace!("Criteria {self:?} selected {} papers", selected.len());
    selected
  }
}

/// Lower-cases and trims keywords, dropping empty ones.
fn clean<I, S>(keywords: I) -> impl Iterator<Item = String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>, {
  keywords
    .into_iter()
    .map(|keyword| keyword.as_ref().trim().to_lowercase())
    .filter(|keyword| !keyword.is_empty())
}
