//! Destination filename templating.
//!
//! A template is a plain string in which the words `year`, `author`, `affiliation` and
//! `title` are placeholders. Everything else is kept literally. Placeholders are replaced
//! in a single left-to-right pass, so text coming from a paper (a title containing the
//! word "year", say) is never substituted again.
//!
//! | placeholder   | replacement                                             |
//! |---------------|---------------------------------------------------------|
//! | `year`        | the conference year                                     |
//! | `author`      | first author's family name, lower-cased                 |
//! | `affiliation` | first author's institution                              |
//! | `title`       | lower-cased title with `:` removed and `/` as a space   |
//!
//! # Examples
//!
//! ```
//! use proceedings::{
//!   paper::{Author, Paper},
//!   template::Template,
//! };
//!
//! let paper = Paper::new("Sample: Paper/Name", "https://x.example/p.pdf")
//!   .with_author(Author::new("John", "Doe"));
//!
//! let template = Template::new("year-author-title");
//! assert_eq!(template.render(&paper, 2022), "2022-doe-sample paper name");
//! ```

use super::*;

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "year-author-title";

lazy_static! {
  /// Recognized placeholders, longest alternatives first where prefixes could overlap.
  static ref PLACEHOLDER: Regex = Regex::new(r"affiliation|author|title|year").unwrap();
}

/// A filename template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template(String);

impl Template {
  /// Wraps a template string.
  pub fn new(pattern: impl Into<String>) -> Self { Self(pattern.into()) }

  /// The raw template string.
  pub fn as_str(&self) -> &str { &self.0 }

  /// Renders the destination stem (without extension) for a paper of the given year.
  pub fn render(&self, paper: &Paper, year: i32) -> String {
    let first = paper.first_author();
    let author =
      first.map(|author| file_safe(&author.surname().to_lowercase())).unwrap_or_default();
    let affiliation =
      first.and_then(|author| author.institution.as_deref()).map(file_safe).unwrap_or_default();
    let title = file_safe(&format_title(&paper.title));

    PLACEHOLDER
      .replace_all(&self.0, |caps: &regex::Captures| match &caps[0] {
        "year" => year.to_string(),
        "author" => author.clone(),
        "affiliation" => affiliation.clone(),
        "title" => title.clone(),
        other => other.to_owned(),
      })
      .into_owned()
  }
}

impl Default for Template {
  fn default() -> Self { Self::new(DEFAULT_TEMPLATE) }
}

impl Display for Template {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl From<&str> for Template {
  fn from(pattern: &str) -> Self { Self::new(pattern) }
}

/// Formats a title for use in a filename: lower-cased, `:` removed, `/` replaced by a
/// space.
pub fn format_title(title: &str) -> String {
  title.trim().to_lowercase().replace(':', "").replace('/', " ")
}

/// Replaces path separators with spaces and `..` with `_`.
fn file_safe(value: &str) -> String {
  value.replace(['/', '\\', '\0'], " ").replace("..", "_")
}
