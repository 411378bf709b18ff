use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the configured level filter
pub const LOG_ENV: &str = "X2M_LOG";

const LOG_FILE: &str = "x2m.log";

/// Route tracing output to a log file; the terminal belongs to the UI.
///
/// The returned guard flushes buffered lines on drop and must be held for
/// the life of the program.
pub fn init(config: &Config) -> Result<WorkerGuard> {
  let log_dir = config.log_dir()?;
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  let filter = match EnvFilter::try_from_env(LOG_ENV) {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(&config.log.level)
      .map_err(|e| eyre!("Invalid log level {:?}: {}", config.log.level, e))?,
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(
      fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(non_blocking),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}
