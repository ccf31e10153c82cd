mod cache;
mod config;
mod error;
mod fetch;
mod listing;
mod logging;
mod monitor;
mod report;

use clap::Parser;
use color_eyre::{eyre::WrapErr, Result};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::{cache_namespace, SqliteStore};
use crate::config::{ColorMode, Config};
use crate::fetch::HttpFetcher;
use crate::monitor::Monitor;
use crate::report::ConsoleReporter;

#[derive(Parser, Debug)]
#[command(name = "doggo-watch")]
#[command(about = "Watch a rescue shelter's adoption listing for new and adopted dogs")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/doggo-watch/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Listing page to watch
  #[arg(short, long)]
  url: Option<String>,

  /// Seconds to wait between checks
  #[arg(short, long)]
  interval: Option<u64>,

  /// Snapshot cache database file
  #[arg(long)]
  cache: Option<PathBuf>,

  /// Colour the report
  #[arg(long, value_enum)]
  color: Option<ColorMode>,

  /// Log every tick
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration, command line wins over the file
  let config = Config::load(args.config.as_deref())?;
  let config = Config {
    target_url: args.url.unwrap_or(config.target_url),
    interval_secs: args.interval.unwrap_or(config.interval_secs),
    cache_path: args.cache.or(config.cache_path),
    color: args.color.unwrap_or(config.color),
    ..config
  };

  let _log_guard = logging::init(&config.log_dir()?, args.verbose)?;

  let target = config.target()?;
  let interval = config.interval()?;
  let cache_path = config.cache_path()?;
  info!(url = %target, interval_secs = interval.as_secs(), cache = %cache_path.display(), "starting");

  let store = SqliteStore::open(&cache_path, cache_namespace(&target))
    .wrap_err("Cannot open the snapshot cache")?;
  let fetcher = HttpFetcher::new(target, &config.fetch).wrap_err("Cannot build HTTP client")?;
  let reporter = ConsoleReporter::stdout(config.color.enabled());

  let cancel = CancellationToken::new();
  tokio::spawn({
    let cancel = cancel.clone();
    async move {
      match tokio::signal::ctrl_c().await {
        Ok(()) => {
          info!("interrupt received");
          cancel.cancel();
        }
        Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
      }
    }
  });

  Monitor::new(fetcher, reporter, store, interval, cancel)
    .run()
    .await
    .wrap_err("Monitor stopped")?;

  Ok(())
}
