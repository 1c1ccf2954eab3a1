//! Supported conferences, the registry mapping them to metadata locations, and year
//! selection.
//!
//! The set of conferences is closed: a name outside of [`Conference`] is a configuration
//! error rather than a missing document. Where each conference's metadata lives is not
//! global state; it is a [`ConferenceRegistry`] value handed to the collector, so tests
//! and mirrors can point the same code at a different host.
//!
//! # Examples
//!
//! ```
//! use proceedings::conference::{parse_conferences, ConferenceRegistry, YearSpec};
//!
//! let conferences = parse_conferences("NeurIPS, icml").unwrap();
//! let years: YearSpec = "2019:2021".parse().unwrap();
//! assert_eq!(conferences.len() * years.years().len(), 6);
//!
//! let registry = ConferenceRegistry::default().with_base_url("http://localhost:8080");
//! let descriptor = conferences[0].at(2020);
//! assert_eq!(registry.resolve(&descriptor), "http://localhost:8080/neurips/neurips_2020.json");
//! ```

use chrono::Datelike;

use super::*;

/// Earliest year covered by the `*` year selection.
pub const MIN_YEAR: i32 = 1969;

/// Default location of the published conference metadata documents.
pub const DEFAULT_METADATA_BASE: &str =
  "https://raw.githubusercontent.com/ch3njust1n/conference_metadata/main";

/// A supported conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conference {
  /// Artificial Intelligence and Statistics
  Aistats,
  /// Asian Conference on Machine Learning
  Acml,
  /// Conference on Robot Learning
  Corl,
  /// Computer Vision and Pattern Recognition
  Cvpr,
  /// International Conference on Computer Vision
  Iccv,
  /// International Conference on Learning Representations
  Iclr,
  /// International Conference on Machine Learning
  Icml,
  /// International Joint Conference on Artificial Intelligence
  Ijcai,
  /// Conference on Machine Learning and Systems
  Mlsys,
  /// Neural Information Processing Systems
  Neurips,
  /// Neural Information Processing Systems, under its former name
  Nips,
  /// Uncertainty in Artificial Intelligence
  Uai,
  /// Winter Conference on Applications of Computer Vision
  Wacv,
}

/// One conference in one year: the unit of metadata retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConferenceDescriptor {
  /// Which conference
  pub conference: Conference,
  /// Which year of the conference
  pub year:       i32,
}

/// Maps each conference to the base location of its metadata documents.
#[derive(Debug, Clone)]
pub struct ConferenceRegistry {
  /// Per-conference base URLs
  sources: BTreeMap<Conference, String>,
}

/// A parsed year selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearSpec {
  /// Every year from [`MIN_YEAR`] through the current year
  All,
  /// An inclusive range of years
  Range(i32, i32),
  /// An explicit list of years
  List(Vec<i32>),
}

impl Conference {
  /// Every supported conference.
  pub const ALL: [Conference; 13] = [
    Conference::Aistats,
    Conference::Acml,
    Conference::Corl,
    Conference::Cvpr,
    Conference::Iccv,
    Conference::Iclr,
    Conference::Icml,
    Conference::Ijcai,
    Conference::Mlsys,
    Conference::Neurips,
    Conference::Nips,
    Conference::Uai,
    Conference::Wacv,
  ];

  /// The lower-case name used in metadata document paths.
  pub fn as_str(&self) -> &'static str {
    match self {
      Conference::Aistats => "aistats",
      Conference::Acml => "acml",
      Conference::Corl => "corl",
      Conference::Cvpr => "cvpr",
      Conference::Iccv => "iccv",
      Conference::Iclr => "iclr",
      Conference::Icml => "icml",
      Conference::Ijcai => "ijcai",
      Conference::Mlsys => "mlsys",
      Conference::Neurips => "neurips",
      Conference::Nips => "nips",
      Conference::Uai => "uai",
      Conference::Wacv => "wacv",
    }
  }

  /// Pairs this conference with a year.
  pub fn at(self, year: i32) -> ConferenceDescriptor {
    ConferenceDescriptor { conference: self, year }
  }
}

impl Display for Conference {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Conference {
  type Err = ProceedingsError;

  fn from_str(s: &str) -> Result<Self> {
    let name = s.trim().to_lowercase();
    Conference::ALL
      .into_iter()
      .find(|conference| conference.as_str() == name)
      .ok_or_else(|| ProceedingsError::UnsupportedConference(s.trim().to_owned()))
  }
}

impl Display for ConferenceDescriptor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.conference, self.year)
  }
}

/// Parses a conference selection: `*` for every supported conference, otherwise a comma
/// separated list of names.
///
/// Names are case-insensitive. Duplicates are dropped, first occurrence wins. Any
/// unsupported name rejects the whole selection.
pub fn parse_conferences(selection: &str) -> Result<Vec<Conference>> {
  if selection.trim() == "*" {
    return Ok(Conference::ALL.to_vec());
  }

  let mut conferences = Vec::new();
  for name in selection.split(',').filter(|name| !name.trim().is_empty()) {
    let conference = name.parse::<Conference>()?;
    if !conferences.contains(&conference) {
      conferences.push(conference);
    }
  }

  if conferences.is_empty() {
    return Err(ProceedingsError::UnsupportedConference(selection.to_owned()));
  }
  Ok(conferences)
}

impl ConferenceRegistry {
  /// Creates a registry with no conference mapped.
  pub fn empty() -> Self { Self { sources: BTreeMap::new() } }

  /// Maps every supported conference to `{base}/{conference}`.
  pub fn with_base_url(mut self, base: &str) -> Self {
    let base = base.trim_end_matches('/');
    for conference in Conference::ALL {
      self.sources.insert(conference, format!("{base}/{conference}"));
    }
    self
  }

  /// Maps a single conference to an explicit base URL.
  pub fn with_source(mut self, conference: Conference, base: impl Into<String>) -> Self {
    self.sources.insert(conference, base.into().trim_end_matches('/').to_owned());
    self
  }

  /// Applies name → base URL overrides, as read from a configuration file.
  pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Result<Self> {
    for (name, base) in overrides {
      let conference = name.parse::<Conference>()?;
      self = self.with_source(conference, base.clone());
    }
    Ok(self)
  }

  /// Whether the registry knows where to find this conference's metadata.
  pub fn contains(&self, conference: Conference) -> bool { self.sources.contains_key(&conference) }

  /// Resolves the metadata document location of one conference year.
  ///
  /// Conferences without an explicit entry fall back to the default metadata base.
  pub fn resolve(&self, descriptor: &ConferenceDescriptor) -> String {
    let base = self
      .sources
      .get(&descriptor.conference)
      .cloned()
      .unwrap_or_else(|| format!("{DEFAULT_METADATA_BASE}/{}", descriptor.conference));
    format!("{base}/{}_{}.json", descriptor.conference, descriptor.year)
  }
}

impl Default for ConferenceRegistry {
  fn default() -> Self { Self::empty().with_base_url(DEFAULT_METADATA_BASE) }
}

impl YearSpec {
  /// Expands the selection into concrete years, in ascending order for ranges and in
  /// given order for lists.
  ///
  /// Ranges are clamped to [`MIN_YEAR`] through the current year.
  pub fn years(&self) -> Vec<i32> {
    let current = Utc::now().year();
    match self {
      YearSpec::All => (MIN_YEAR..=current).collect(),
      YearSpec::Range(from, to) => ((*from).max(MIN_YEAR)..=(*to).min(current)).collect(),
      YearSpec::List(years) => years.clone(),
    }
  }
}

impl FromStr for YearSpec {
  type Err = ProceedingsError;

  fn from_str(s: &str) -> Result<Self> {
    lazy_static! {
      static ref RANGE: Regex = Regex::new(r"^\s*(\d+)\s*:\s*(\d+)\s*$").unwrap();
    }

    let invalid = || ProceedingsError::InvalidYears(s.to_owned());
    let supported = MIN_YEAR..=Utc::now().year();
    let year = |value: &str| {
      value.parse::<i32>().ok().filter(|year| supported.contains(year)).ok_or_else(invalid)
    };
    let trimmed = s.trim();

    if trimmed == "*" {
      return Ok(YearSpec::All);
    }

    if let Some(caps) = RANGE.captures(trimmed) {
      let from = year(&caps[1])?;
      let to = year(&caps[2])?;
      if from > to {
        return Err(invalid());
      }
      return Ok(YearSpec::Range(from, to));
    }

    let years = trimmed
      .split(',')
      .map(str::trim)
      .filter(|year| !year.is_empty())
      .map(year)
      .collect::<Result<Vec<_>>>()?;

    if years.is_empty() {
      return Err(invalid());
    }
    Ok(YearSpec::List(years))
  }
}
