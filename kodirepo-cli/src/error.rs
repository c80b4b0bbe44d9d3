//! CLI error type and exit codes.

use std::fmt;

use kodirepo::config::ConfigError;
use kodirepo::logging::LoggingError;
use kodirepo::repo::RepoError;

/// Exit code for unusable configuration.
pub const EXIT_CONFIG: u8 = 2;

/// Exit code for any other fatal failure.
pub const EXIT_FAILURE: u8 = 1;

/// Fatal errors surfaced by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Settings are missing, invalid, or could not be persisted.
    Config(ConfigError),
    /// Logging could not be set up.
    Logging(LoggingError),
    /// The repository could not be written.
    Build(RepoError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) => EXIT_CONFIG,
            CliError::Logging(_) | CliError::Build(_) => EXIT_FAILURE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Build(e) => write!(f, "Build failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Build(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<RepoError> for CliError {
    fn from(e: RepoError) -> Self {
        CliError::Build(e)
    }
}
