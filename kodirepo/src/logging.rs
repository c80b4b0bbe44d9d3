//! Logging setup.
//!
//! Human-readable output goes to stderr. An optional log file receives the
//! same events without ANSI colors through a non-blocking writer; keep the
//! returned [`LoggingGuard`] alive until exit so buffered lines are flushed.
//! `RUST_LOG` overrides the configured level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    verbosity: u8,
    log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the level: 0 is `info`, 1 is `debug`, 2 or more is `trace`.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Also write events to `path`.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn level(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Keeps the file writer alive.
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log file path: {}", .0.display())]
    InvalidLogFile(PathBuf),

    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("logging is already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level()));
    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    let Some(path) = config.log_file() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()?;
        return Ok(LoggingGuard { _file_guard: None });
    };

    let (dir, file_name) = split_log_path(path)?;
    fs::create_dir_all(&dir).map_err(|e| LoggingError::CreateDirectory {
        path: dir.clone(),
        source: e,
    })?;
    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()?;

    Ok(LoggingGuard {
        _file_guard: Some(guard),
    })
}

fn split_log_path(path: &Path) -> Result<(PathBuf, &std::ffi::OsStr), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidLogFile(path.to_path_buf()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, file_name))
}
