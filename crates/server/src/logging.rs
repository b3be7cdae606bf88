//! Logging setup
//!
//! Always logs to stderr; additionally to a daily-rolling file when a log
//! directory is configured.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "xss_server=info,tower_http=warn";

/// Prefix of the rolling log files; the date is appended per day.
pub const LOG_FILE_PREFIX: &str = "xss-collector.log";

/// Initialize the global subscriber.
///
/// Returns the file writer guard, which must be held for the lifetime of the
/// process so buffered lines are flushed.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut dir_error = None;
    let (file_layer, guard) = match log_dir {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                (
                    Some(fmt::layer().with_writer(non_blocking).with_ansi(false)),
                    Some(guard),
                )
            }
            Err(e) => {
                dir_error = Some(e);
                (None, None)
            }
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match (log_dir, dir_error) {
        (Some(dir), Some(e)) => tracing::warn!("Cannot create log directory {:?}: {}", dir, e),
        (Some(dir), None) => tracing::info!("Logging to {:?}", dir),
        _ => {}
    }
    guard
}
