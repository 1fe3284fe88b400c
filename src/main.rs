mod api;
mod app;
mod commands;
mod config;
mod error;
mod event;
mod prefs;
mod stats;
mod store;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::api::client::HttpApi;
use crate::prefs::{NoopStorage, PrefsStore, PrefsStorage, SqliteStorage};
use crate::store::Store;

#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(about = "A terminal dashboard for project management")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/taskdeck/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Project to open on the home dashboard
  #[arg(short, long)]
  project: Option<u64>,

  /// Base URL of the API, overrides the config file
  #[arg(long)]
  api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Logs go to a file; stdout belongs to the terminal UI.
  let _log_guard = init_logging();

  let mut config = match config::Config::load(args.config.as_deref()) {
    Ok(config) => config,
    Err(err) => match &args.api_url {
      Some(base_url) => config::Config::from_base_url(base_url.clone()),
      None => return Err(err),
    },
  };
  if let Some(base_url) = args.api_url {
    config.api.base_url = base_url;
  }
  if let Some(project) = args.project {
    config.default_project = Some(project);
  }

  let api = HttpApi::new(&config)?;
  let host = config.title.clone().unwrap_or_else(|| api.host());
  let store = Store::new(Arc::new(api));

  let storage: Box<dyn PrefsStorage> = match SqliteStorage::open_default() {
    Ok(storage) => Box::new(storage),
    Err(err) => {
      warn!(error = %err, "preference storage unavailable, settings won't persist");
      Box::new(NoopStorage)
    }
  };
  let prefs = PrefsStore::load(storage);

  let mut app = app::App::new(config, store, prefs, host);
  app.run().await?;

  Ok(())
}

/// Set up daily-rotated file logging under the app's data directory.
/// Returns the guard that flushes buffered log lines on shutdown.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))?
    .join("taskdeck")
    .join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::daily(log_dir, "taskdeck.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}
