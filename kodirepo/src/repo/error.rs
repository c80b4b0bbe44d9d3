//! Error types for the repository module.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::addon::{AddonError, ScanError};

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors that can occur while assembling a repository.
#[derive(Debug)]
pub enum RepoError {
    /// Failed to create directory.
    CreateDirectoryFailed { path: PathBuf, source: io::Error },

    /// Failed to read file.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write file.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a stale output entry.
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Archive building failed.
    ArchiveFailed { path: PathBuf, source: zip::result::ZipError },

    /// Invalid path provided.
    InvalidPath(String),

    /// A descriptor written by the builder could not be read back.
    InvalidDescriptor { path: PathBuf, source: AddonError },

    /// Add-on discovery could not run.
    Scan(ScanError),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::CreateDirectoryFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            RepoError::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            RepoError::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            RepoError::RemoveFailed { path, source } => {
                write!(f, "failed to remove {}: {}", path.display(), source)
            }
            RepoError::ArchiveFailed { path, source } => {
                write!(f, "failed to build archive {}: {}", path.display(), source)
            }
            RepoError::InvalidPath(msg) => {
                write!(f, "invalid path: {}", msg)
            }
            RepoError::InvalidDescriptor { path, source } => {
                write!(f, "invalid descriptor {}: {}", path.display(), source)
            }
            RepoError::Scan(err) => {
                write!(f, "scan failed: {}", err)
            }
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepoError::CreateDirectoryFailed { source, .. } => Some(source),
            RepoError::ReadFailed { source, .. } => Some(source),
            RepoError::WriteFailed { source, .. } => Some(source),
            RepoError::RemoveFailed { source, .. } => Some(source),
            RepoError::ArchiveFailed { source, .. } => Some(source),
            RepoError::InvalidDescriptor { source, .. } => Some(source),
            RepoError::Scan(err) => Some(err),
            RepoError::InvalidPath(_) => None,
        }
    }
}

impl From<ScanError> for RepoError {
    fn from(err: ScanError) -> Self {
        RepoError::Scan(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_write_failed_display() {
        let err = RepoError::WriteFailed {
            path: PathBuf::from("/repo/addons.xml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to write"));
        assert!(msg.contains("/repo/addons.xml"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_path_has_no_source() {
        let err = RepoError::InvalidPath("no file name".to_string());
        assert_eq!(err.to_string(), "invalid path: no file name");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_from_scan_error() {
        let err: RepoError = ScanError::NotADirectory(PathBuf::from("/missing")).into();
        assert!(matches!(err, RepoError::Scan(_)));
        assert!(err.to_string().contains("/missing"));
    }
}
