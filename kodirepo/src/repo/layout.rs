//! On-disk layout of a Kodi repository.
//!
//! ```text
//! <repo_dir>/
//! ├── addons.xml
//! ├── addons.xml.md5
//! └── <addon id>/
//!     ├── <addon id>-<version>.zip
//!     ├── <addon id>-<version>.zip.md5
//!     ├── addon.xml
//!     └── <assets...>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{RepoError, RepoResult};
use crate::naming::{self, MANIFEST_FILENAME};

/// Paths inside a repository output directory.
#[derive(Debug, Clone)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the repository root if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_or_create(root: impl Into<PathBuf>) -> RepoResult<Self> {
        let layout = Self::new(root);
        if !layout.root.is_dir() {
            fs::create_dir_all(&layout.root).map_err(|e| RepoError::CreateDirectoryFailed {
                path: layout.root.clone(),
                source: e,
            })?;
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to `addons.xml`.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILENAME)
    }

    /// Path to `addons.xml.md5`.
    pub fn manifest_checksum_path(&self) -> PathBuf {
        naming::checksum_path(&self.manifest_path())
    }

    /// Output directory for one add-on.
    pub fn addon_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}
