//! Error types for reading add-on sources.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to read a single add-on source.
///
/// These are recoverable during a scan: the offending source is skipped.
#[derive(Debug, Error)]
pub enum AddonError {
    /// The source has no `addon.xml` at its root.
    #[error("no addon.xml found in {}", .0.display())]
    MissingDescriptor(PathBuf),

    /// The descriptor bytes are not UTF-8.
    #[error("descriptor is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The descriptor is not well-formed XML.
    #[error("descriptor is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The descriptor must contain exactly one `<addon>` element.
    #[error("expected exactly one <addon> element, found {0}")]
    AddonElementCount(usize),

    /// A required attribute of `<addon>` is missing or empty.
    #[error("<addon> element has no '{0}' attribute")]
    MissingAttribute(&'static str),

    /// The identifier cannot be used as a directory name in the repository.
    #[error("add-on id '{0}' is not a plain directory name")]
    InvalidIdentifier(String),

    /// The version cannot be used in an archive file name.
    #[error("version '{0}' cannot be used in an archive file name")]
    InvalidVersion(String),

    /// Reading from the source failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source archive could not be opened or read.
    #[error("invalid archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Result type for add-on source operations.
pub type AddonResult<T> = Result<T, AddonError>;

/// Failure that prevents a scan from starting at all.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root does not exist or is not a directory.
    #[error("'{}' is not an existing directory", .0.display())]
    NotADirectory(PathBuf),

    /// A search pattern could not be compiled.
    #[error("invalid search pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
