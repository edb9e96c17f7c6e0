//! Tracing subscriber setup

use crate::config::{LogFormat, LoggingConfig};
use crate::{Error, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`
///
/// With `config.file` set, logs go to a daily rolling file through a
/// non-blocking writer and the returned guard must be held until exit so
/// buffered lines are flushed. Otherwise logs go to stderr.
///
/// # Errors
///
/// Returns [`Error::Config`] if the filter does not parse, the log directory
/// cannot be created, or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::Config(format!("Invalid log level {:?}: {}", config.level, e)))?;

    let Some(log_file) = &config.file else {
        let installed = match config.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
        installed.map_err(|e| Error::Config(format!("Failed to install logger: {}", e)))?;
        return Ok(None);
    };

    let directory = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| Error::Config(format!("Log file has no name: {}", log_file.display())))?;
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::daily(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init(),
    };
    installed.map_err(|e| Error::Config(format!("Failed to install logger: {}", e)))?;

    Ok(Some(guard))
}
