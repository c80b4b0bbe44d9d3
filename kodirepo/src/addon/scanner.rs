//! Add-on discovery.
//!
//! A scan matches a fixed set of glob patterns below a root directory, turns
//! every match into an [`AddonSource`] and opens it. Sources that cannot be
//! read are logged and skipped; only an unusable root aborts the scan.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};

use super::error::ScanError;
use super::source::AddonSource;
use super::Addon;
use crate::naming::DESCRIPTOR_FILENAME;

/// Patterns for fresh add-ons: loose archives, unpacked directories and
/// archives one level down.
pub const CANDIDATE_PATTERNS: &[&str] = &["*.zip", "*/addon.xml", "*/*.zip"];

/// Pattern for archives already published in a repository.
pub const PACKAGED_PATTERNS: &[&str] = &["*/*.zip"];

/// Finds add-on sources below a root directory.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    root: PathBuf,
}

impl SourceScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fresh add-ons below the root.
    pub fn candidates(&self) -> Result<Vec<Addon>, ScanError> {
        self.scan(CANDIDATE_PATTERNS)
    }

    /// Archives already published below the root.
    pub fn packaged(&self) -> Result<Vec<Addon>, ScanError> {
        self.scan(PACKAGED_PATTERNS)
    }

    /// Open every source matched by `patterns`, skipping unreadable ones.
    pub fn scan(&self, patterns: &[&str]) -> Result<Vec<Addon>, ScanError> {
        let addons: Vec<Addon> = self
            .sources(patterns)?
            .into_iter()
            .filter_map(|source| match Addon::open(source.clone()) {
                Ok(addon) => {
                    debug!(
                        id = addon.id(),
                        version = %addon.version(),
                        path = %source.path().display(),
                        "Found add-on"
                    );
                    Some(addon)
                }
                Err(e) => {
                    warn!(path = %source.path().display(), error = %e, "Skipping unreadable add-on");
                    None
                }
            })
            .collect();

        debug!(root = %self.root.display(), count = addons.len(), "Scan complete");
        Ok(addons)
    }

    /// Source locations matched by `patterns`, in pattern order.
    ///
    /// A match on `addon.xml` designates its parent directory.
    pub fn sources(&self, patterns: &[&str]) -> Result<Vec<AddonSource>, ScanError> {
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let escaped_root = Pattern::escape(&self.root.to_string_lossy());
        let mut sources = Vec::new();

        for pattern in patterns {
            let full_pattern = format!("{}/{}", escaped_root, pattern);
            let matches = glob::glob(&full_pattern).map_err(|source| ScanError::Pattern {
                pattern: full_pattern.clone(),
                source,
            })?;

            let mut found: Vec<PathBuf> = matches
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(error = %e, "Cannot access path during scan");
                        None
                    }
                })
                .collect();
            found.sort();

            for path in found {
                let source = if path.file_name().is_some_and(|n| n == DESCRIPTOR_FILENAME) {
                    match path.parent() {
                        Some(parent) => AddonSource::Directory(parent.to_path_buf()),
                        None => continue,
                    }
                } else {
                    AddonSource::from_path(path)
                };
                sources.push(source);
            }
        }

        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_addon_dir(root: &Path, id: &str, version: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("addon.xml"),
            format!(r#"<addon id="{id}" version="{version}"/>"#),
        )
        .unwrap();
    }

    fn write_addon_zip(path: &Path, id: &str, version: &str) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file(format!("{id}/addon.xml"), SimpleFileOptions::default())
            .unwrap();
        write!(zip, r#"<addon id="{id}" version="{version}"/>"#).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_candidates_find_all_layouts() {
        let temp = TempDir::new().unwrap();
        write_addon_dir(temp.path(), "plugin.a", "1.0.0");
        write_addon_zip(&temp.path().join("plugin.b-2.1.zip"), "plugin.b", "2.1");
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        write_addon_zip(&temp.path().join("nested/script.c-0.1.zip"), "script.c", "0.1");

        let addons = SourceScanner::new(temp.path()).candidates().unwrap();
        let mut ids: Vec<&str> = addons.iter().map(|a| a.id()).collect();
        ids.sort();
        assert_eq!(ids, vec!["plugin.a", "plugin.b", "script.c"]);
    }

    #[test]
    fn test_unreadable_source_skipped() {
        let temp = TempDir::new().unwrap();
        write_addon_dir(temp.path(), "plugin.a", "1.0.0");
        fs::write(temp.path().join("broken.zip"), b"garbage").unwrap();
        let bad = temp.path().join("bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("addon.xml"), "<not-closed>").unwrap();

        let addons = SourceScanner::new(temp.path()).candidates().unwrap();
        assert_eq!(addons.len(), 1);
        assert_eq!(addons[0].id(), "plugin.a");
    }

    #[test]
    fn test_directory_without_descriptor_ignored() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();

        let addons = SourceScanner::new(temp.path()).candidates().unwrap();
        assert!(addons.is_empty());
    }

    #[test]
    fn test_packaged_only_sees_nested_archives() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("plugin.a")).unwrap();
        write_addon_zip(&temp.path().join("plugin.a/plugin.a-1.0.zip"), "plugin.a", "1.0");
        write_addon_zip(&temp.path().join("stray-1.0.zip"), "stray", "1.0");

        let addons = SourceScanner::new(temp.path()).packaged().unwrap();
        assert_eq!(addons.len(), 1);
        assert_eq!(addons[0].id(), "plugin.a");
        assert!(addons[0].source().is_archive());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = SourceScanner::new(temp.path().join("nope"))
            .candidates()
            .unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn test_root_with_glob_characters() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("add-ons [test]");
        fs::create_dir_all(&root).unwrap();
        write_addon_dir(&root, "plugin.a", "1.0.0");

        let addons = SourceScanner::new(&root).candidates().unwrap();
        assert_eq!(addons.len(), 1);
    }
}
