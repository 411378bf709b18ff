mod app;
mod config;
mod event;
mod host;
mod logging;
mod overlay;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "x2m")]
#[command(about = "Search, filter and group the relational lists of a form")]
#[command(version)]
struct Args {
  /// Form fixture to open (YAML, or JSON with a .json extension)
  fixture: PathBuf,

  /// Path to config file (default: ./x2m.yaml, then $XDG_CONFIG_HOME/x2m/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Keep the guard alive so buffered log lines are flushed on exit
  let _log_guard = logging::init(&config)?;

  // Register the overlay's module before any form is mounted
  let mut registry = host::AssetRegistry::with_core();
  registry.register(&host::X2M_SEARCH)?;
  let bundle = host::assets::BACKEND_BUNDLE;
  info!(bundle, assets = ?registry.bundle(bundle), "asset bundle ready");

  let form = host::FormView::load(&args.fixture)?;
  info!(fixture = %args.fixture.display(), model = %form.model, "form loaded");

  // Initialize and run the app
  let mut app = app::App::new(&config, &registry, form).with_form_path(args.fixture);
  app.run().await?;

  Ok(())
}
