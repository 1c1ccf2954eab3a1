//! Module for writing a [`proceedings`] configuration file.

use proceedings::config::CacheBackend;

use super::*;

/// Values written into the new configuration; anything omitted keeps its default.
#[derive(Args, Clone, Debug)]
pub struct InitOptions {
  /// Download directory
  #[arg(long)]
  pub output:     Option<PathBuf>,
  /// Snapshot directory
  #[arg(long)]
  pub cache_dir:  Option<PathBuf>,
  /// Checkpoint database file
  #[arg(long)]
  pub db_path:    Option<PathBuf>,
  /// Keep checkpoints in memory and rely on snapshots only
  #[arg(long, action = ArgAction::SetTrue)]
  pub memory:     bool,
  /// Number of concurrent downloads
  #[arg(long)]
  pub batch_size: Option<usize>,
}

/// Function for the [`Commands::Init`] in the CLI.
pub fn init(cli: &Cli, options: &InitOptions) -> Result<()> {
  let path = cli.config_path();

  if path.exists()
    && !cli.confirm(&format!(
      "A configuration already exists at {}, do you want to overwrite it?",
      path.display()
    ))?
  {
    cli.reply(ResponseContent::Info("Keeping the existing configuration"))?;
    return Ok(());
  }

  let mut config = Config::default();
  if let Some(output) = &options.output {
    config.output_dir = output.clone();
  }
  if let Some(cache_dir) = &options.cache_dir {
    config.cache_dir = cache_dir.clone();
  }
  if let Some(db_path) = &options.db_path {
    config.database_path = db_path.clone();
  }
  if options.memory {
    config.cache_backend = CacheBackend::Memory;
  }
  if let Some(batch_size) = options.batch_size {
    config.batch_size = batch_size;
  }
  config.validate()?;
  config.save(&path)?;

  cli.reply(ResponseContent::Success(&format!(
    "Configuration written to {}\nOutput directory: {}\nCache directory: {}\nCheckpoints: {}",
    path.display(),
    config.output_dir.display(),
    config.cache_dir.display(),
    match config.cache_backend {
      CacheBackend::Memory => "in memory".to_owned(),
      CacheBackend::Sqlite => config.database_path.display().to_string(),
    }
  )))
}
