//! Module for removing run artifacts.

use proceedings::{cache::latest_snapshot, download::remove_zero_byte_files};

use super::*;

/// What to clean.
#[derive(Args, Clone, Debug)]
pub struct CleanOptions {
  /// Download directory to clean instead of the configured one
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Only remove empty downloads; keep snapshots and the checkpoint database
  #[arg(long, action = ArgAction::SetTrue)]
  pub keep_cache: bool,
}

/// Function for the [`Commands::Clean`] in the CLI.
pub async fn clean(cli: &Cli, options: &CleanOptions) -> Result<()> {
  let config = Config::load(cli.config_path())?;
  let output_dir = options.output.clone().unwrap_or_else(|| config.output_dir.clone());

  let removed = remove_zero_byte_files(&output_dir).await?;
  cli.reply(ResponseContent::Success(&format!(
    "Removed {removed} empty files from {}",
    output_dir.display()
  )))?;

  if options.keep_cache {
    return Ok(());
  }

  let mut artifacts = Vec::new();
  if latest_snapshot(&config.cache_dir)?.is_some() {
    let pattern = config.cache_dir.join("*.json");
    artifacts.extend(glob::glob(&pattern.to_string_lossy())?.flatten());
  }
  if config.database_path.exists() {
    // Includes the journal and WAL files next to the database.
    artifacts.extend(glob::glob(&format!("{}*", config.database_path.display()))?.flatten());
  }

  if artifacts.is_empty() {
    cli.reply(ResponseContent::Info("No cache snapshots or checkpoint database found"))?;
    return Ok(());
  }

  let listing: Vec<String> = artifacts.iter().map(|path| path.display().to_string()).collect();
  cli.reply(ResponseContent::List("Cache files", &listing))?;
  if !cli.confirm("Delete these files? Every paper will be downloaded again on the next run")? {
    cli.reply(ResponseContent::Info("Operation cancelled"))?;
    return Ok(());
  }

  for artifact in &artifacts {
    debug!("Removing {}", artifact.display());
    std::fs::remove_file(artifact)?;
  }
  cli.reply(ResponseContent::Success(&format!("Removed {} cache files", artifacts.len())))
}
