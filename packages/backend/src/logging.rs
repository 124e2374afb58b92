use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "mastery.log";

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create log directory {dir}: {source}")]
    LogDir {
        dir: String,
        #[source]
        source: std::io::Error,
    },
    #[error("global subscriber already set: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: stdout always, plus a daily rolling file
/// under `config.log_dir` when file logging is enabled.
pub fn init_tracing(config: &Config) -> Result<Option<FileLogGuard>, LoggingError> {
    let stdout_layer = fmt::layer().with_target(true);

    let Some(log_dir) = config.log_dir.as_deref() else {
        tracing_subscriber::registry()
            .with(env_filter(&config.log_level))
            .with(stdout_layer)
            .try_init()?;
        return Ok(None);
    };

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender(log_dir)?);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(&config.log_level))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(Some(FileLogGuard { _guard: guard }))
}

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::LogDir {
        dir: log_dir.display().to_string(),
        source,
    })?;
    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX))
}
