//! Tracing setup.
//!
//! Log lines go to stderr and, unless disabled, to a daily file such as
//! `snapwarden.2026-10-19.log` in the configured directory.

use crate::config::LoggingSettings;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the daily log files
pub const LOG_FILE_PREFIX: &str = "snapwarden";

/// Pick the default filter directive.
///
/// `-v` selects debug and `-vv` selects trace, overriding the configured level.
pub fn default_directive(configured: &str, verbosity: u8) -> String {
    match verbosity {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Non-blocking writer for a log file that rotates at midnight.
pub fn daily_file_writer(dir: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over both the config file and `-v` when it is set. The returned
/// guard flushes the log file when dropped, so keep it alive until exit.
pub fn init(settings: &LoggingSettings, verbosity: u8) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(&settings.level, verbosity)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = if settings.file {
        match daily_file_writer(&settings.directory) {
            Ok((writer, guard)) => (
                Some(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(false),
                ),
                Some(guard),
            ),
            Err(e) => {
                eprintln!(
                    "Warning: cannot log to {}: {}",
                    settings.directory.display(),
                    e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .try_init();

    guard
}
