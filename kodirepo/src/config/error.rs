//! Configuration errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, validating or persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more settings are missing or have unusable values.
    #[error("{}", describe_violations(.missing, .wrong))]
    Invalid {
        /// Flags of settings that were not provided.
        missing: Vec<String>,
        /// `flag: reason` entries for settings with unusable values.
        wrong: Vec<String>,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write config file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

fn describe_violations(missing: &[String], wrong: &[String]) -> String {
    let mut sections = Vec::new();
    if !missing.is_empty() {
        sections.push(format!(
            "The following arguments are required:\n\t{}",
            missing.join("\n\t")
        ));
    }
    if !wrong.is_empty() {
        sections.push(format!(
            "There were errors with the following arguments:\n\t{}",
            wrong.join("\n\t")
        ));
    }
    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_only() {
        let err = ConfigError::Invalid {
            missing: vec!["--name".to_string(), "--url".to_string()],
            wrong: vec![],
        };
        assert_eq!(
            err.to_string(),
            "The following arguments are required:\n\t--name\n\t--url"
        );
    }

    #[test]
    fn test_missing_and_wrong() {
        let err = ConfigError::Invalid {
            missing: vec!["--author".to_string()],
            wrong: vec!["--id: The addon ID must start with 'repository.'".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "The following arguments are required:\n\t--author\n\
             There were errors with the following arguments:\n\t--id: The addon ID must start with 'repository.'"
        );
    }
}
