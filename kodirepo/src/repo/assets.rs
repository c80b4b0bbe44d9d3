//! Per-add-on output directories and their artwork.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::error::{RepoError, RepoResult};
use crate::addon::Addon;
use crate::naming::DESCRIPTOR_FILENAME;

/// Outcome of copying one add-on's assets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetCopy {
    /// Files written, including `addon.xml`.
    pub copied: usize,
    /// Declared assets that were absent from the source.
    pub missing: Vec<String>,
}

/// Create `dir` if needed and remove every top-level entry whose file name
/// is not in `keep`. Returns the number of removed entries.
pub fn prepare_output_dir(dir: &Path, keep: &HashSet<String>) -> RepoResult<usize> {
    fs::create_dir_all(dir).map_err(|e| RepoError::CreateDirectoryFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let entries = fs::read_dir(dir).map_err(|e| RepoError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| RepoError::ReadFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        if keep.contains(entry.file_name().to_string_lossy().as_ref()) {
            continue;
        }

        let path = entry.path();
        let is_real_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        let result = if is_real_dir {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| RepoError::RemoveFailed {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "Removed stale output");
        removed += 1;
    }

    Ok(removed)
}

/// Write the add-on's descriptor and declared assets into `dest_dir`.
///
/// Assets are stored flat, under their file name only. Missing assets are
/// logged and reported, not treated as errors.
pub fn copy_assets(addon: &Addon, dest_dir: &Path) -> RepoResult<AssetCopy> {
    let mut report = AssetCopy::default();

    write_file(&dest_dir.join(DESCRIPTOR_FILENAME), addon.descriptor_bytes())?;
    report.copied += 1;

    for asset in addon.descriptor().asset_paths() {
        let Some(file_name) = Path::new(asset).file_name() else {
            warn!(id = addon.id(), asset = %asset, "Asset path has no file name");
            report.missing.push(asset.clone());
            continue;
        };

        let bytes = match addon.source().read_file(asset) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(id = addon.id(), asset = %asset, "Cannot find asset file");
                report.missing.push(asset.clone());
                continue;
            }
            Err(e) => {
                warn!(id = addon.id(), asset = %asset, error = %e, "Cannot read asset file");
                report.missing.push(asset.clone());
                continue;
            }
        };

        write_file(&dest_dir.join(file_name), &bytes)?;
        report.copied += 1;
    }

    debug!(
        id = addon.id(),
        copied = report.copied,
        missing = report.missing.len(),
        "Assets copied"
    );
    Ok(report)
}

fn write_file(path: &Path, bytes: &[u8]) -> RepoResult<()> {
    fs::write(path, bytes).map_err(|e| RepoError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
