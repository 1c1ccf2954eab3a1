//! The `search`, `download` and `stats` commands.

use proceedings::{
  conference::{parse_conferences, YearSpec},
  query::Criteria,
  template::Template,
};

use super::*;

/// Which papers to select and where they go.
#[derive(Args, Clone, Debug)]
pub struct SelectionArgs {
  /// Conferences, comma separated, or `*` for every supported conference
  #[arg(short, long)]
  pub conferences: String,

  /// Years: a single year, a comma separated list, an inclusive range `a:b`, or `*`
  #[arg(short, long)]
  pub years: String,

  /// Title keywords, comma separated; `*` selects every paper
  #[arg(long, default_value = "")]
  pub title: String,

  /// Author name keywords, comma separated
  #[arg(long, default_value = "")]
  pub author: String,

  /// Institution keywords, comma separated
  #[arg(long, default_value = "")]
  pub affiliation: String,

  /// Filename template built from `year`, `author`, `affiliation` and `title`
  #[arg(long)]
  pub template: Option<String>,

  /// Download directory
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Number of concurrent downloads
  #[arg(long)]
  pub batch_size: Option<usize>,

  /// Do not write a cache snapshot after downloading
  #[arg(long, action = ArgAction::SetTrue)]
  pub no_checkpoint: bool,

  /// Forget every recorded download before starting
  #[arg(long, action = ArgAction::SetTrue)]
  pub clear_cache: bool,
}

impl SelectionArgs {
  /// Keyword criteria; without any keyword nothing is selected.
  fn criteria(&self) -> Criteria {
    Criteria::from_lists(&self.title, &self.author, &self.affiliation)
  }

  /// Applies the command line overrides on top of the configuration file.
  fn apply(&self, mut config: Config) -> Config {
    if let Some(output) = &self.output {
      config.output_dir = output.clone();
    }
    if let Some(template) = &self.template {
      config.template = Template::new(template.as_str());
    }
    if let Some(batch_size) = self.batch_size {
      config.batch_size = batch_size;
    }
    if self.no_checkpoint {
      config.checkpoint = false;
    }
    config
  }
}

/// Function for the [`Commands::Search`], [`Commands::Download`] and [`Commands::Stats`]
/// commands in the CLI.
pub async fn run(cli: &Cli, mode: Mode, selection: &SelectionArgs) -> Result<()> {
  // Reject malformed selections before touching the cache or the network.
  parse_conferences(&selection.conferences)?;
  selection.years.parse::<YearSpec>()?;

  let config = selection.apply(Config::load(cli.config_path())?);
  let criteria = selection.criteria();
  if criteria.is_empty() {
    cli.reply(ResponseContent::Warning(
      "No keywords given, no paper will be selected. Pass --title '*' to select every paper.",
    ))?;
  }
  let request = CollectRequest::new(&selection.conferences, &selection.years)
    .with_criteria(criteria)
    .with_mode(mode)
    .with_template(config.template.clone());

  let collector = config.collector().await?.with_clear_cache(selection.clear_cache).build()?;
  let report = collector.collect(&request).await?;

  match mode {
    Mode::Search => show_titles(cli, &report)?,
    Mode::Stats => show_stats(cli, &report)?,
    Mode::Download => show_downloads(cli, &report, &config.output_dir)?,
  }
  show_pair_errors(cli, &report)
}

/// Lists selected titles per conference year.
fn show_titles(cli: &Cli, report: &CollectReport) -> Result<()> {
  for pair in report.pairs.iter().filter(|pair| !pair.titles.is_empty()) {
    let heading = format!("{} ({} of {})", pair.descriptor, pair.matched, pair.accepted);
    cli.reply(ResponseContent::List(&heading, &pair.titles))?;
  }
  cli.reply(ResponseContent::Success(&format!(
    "{} of {} papers matched",
    report.matched(),
    report.accepted()
  )))
}

/// Prints counts per conference year and in total.
fn show_stats(cli: &Cli, report: &CollectReport) -> Result<()> {
  let rows: Vec<String> = report
    .pairs
    .iter()
    .filter(|pair| pair.accepted > 0)
    .map(|pair| {
      format!(
        "{}: {} accepted, {} matched, {} awarded",
        pair.descriptor, pair.accepted, pair.matched, pair.awarded
      )
    })
    .collect();
  if !rows.is_empty() {
    cli.reply(ResponseContent::List("Per conference year", &rows))?;
  }
  cli.reply(ResponseContent::Success(&format!(
    "{} accepted, {} matched, {} awarded",
    report.accepted(),
    report.matched(),
    report.awarded()
  )))
}

/// Summarizes the download counters and the failed papers.
fn show_downloads(cli: &Cli, report: &CollectReport, output_dir: &Path) -> Result<()> {
  let totals = report.totals();
  if !totals.failures.is_empty() {
    cli.reply(ResponseContent::List("Failed downloads", &totals.failures))?;
  }
  if let Some(snapshot) = &report.snapshot {
    cli.reply(ResponseContent::Info(&format!("Cache snapshot: {}", snapshot.display())))?;
  }
  cli.reply(ResponseContent::Success(&format!(
    "Attempted {} papers, persisted {} files ({} already downloaded, {} failed); {} PDFs in {}",
    totals.scheduled,
    totals.files_persisted,
    totals.skipped,
    totals.failed,
    report.pdfs_on_disk,
    output_dir.display()
  )))
}

/// Warns about conference years that could not be processed.
fn show_pair_errors(cli: &Cli, report: &CollectReport) -> Result<()> {
  let errors: Vec<String> = report
    .failed_pairs()
    .map(|pair| format!("{}: {}", pair.descriptor, pair.error.as_deref().unwrap_or_default()))
    .collect();
  if !errors.is_empty() {
    cli.reply(ResponseContent::Warning(&format!(
      "{} conference years could not be processed",
      errors.len()
    )))?;
    cli.reply(ResponseContent::List("Skipped", &errors))?;
  }
  Ok(())
}
