mod app;
mod cache;
mod catalog;
mod config;
mod event;
mod logging;
mod query;
mod timer;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(about = "A terminal UI for browsing and editing a book catalog")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./shelf.yaml or $XDG_CONFIG_HOME/shelf/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the catalog API
  #[arg(short, long)]
  url: Option<String>,

  /// Books per page
  #[arg(short, long)]
  page_size: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over file and environment
  if let Some(url) = args.url {
    config.api.url = url;
  }
  if let Some(page_size) = args.page_size {
    config.page_size = page_size;
  }
  config.validate()?;

  let _log_guard = logging::init()?;
  info!(url = %config.api.url, page_size = config.page_size, "starting shelf");

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
