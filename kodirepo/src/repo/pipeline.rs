//! End-to-end repository build.

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info, warn};

use super::archive;
use super::assets;
use super::checksum;
use super::error::{RepoError, RepoResult};
use super::layout::RepoLayout;
use super::self_addon;
use crate::addon::{Addon, Resolver, SourceScanner};
use crate::config::Config;
use crate::manifest::ManifestBuilder;
use crate::naming;

/// Summary of a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Fresh add-ons that won resolution and were packaged.
    pub fresh: usize,
    /// Archives already present in the repository.
    pub packaged: usize,
    /// Entries written to `addons.xml`.
    pub manifest_entries: usize,
    /// Archives written or copied, including the repository add-on.
    pub archives_written: usize,
    /// Declared assets that could not be found.
    pub missing_assets: usize,
    /// Per-add-on steps that failed and were skipped.
    pub failures: usize,
}

/// Builds a repository from validated configuration.
#[derive(Debug, Clone)]
pub struct RepoBuilder {
    config: Config,
}

impl RepoBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Fails only when the repository itself cannot be written: the output
    /// directory, the repository add-on or `addons.xml`. Problems with
    /// individual add-ons are logged and counted in the report.
    pub fn run(&self) -> RepoResult<BuildReport> {
        let layout = RepoLayout::open_or_create(&self.config.repo_dir)?;
        let repo_addon = self_addon::write_repository_addon(&self.config, &layout)?;

        let fresh = SourceScanner::new(&self.config.addons_dir).candidates()?;
        let packaged = SourceScanner::new(layout.root()).packaged()?;
        let resolver = Resolver::resolve(fresh, packaged);
        let winners = resolver.fresh_winners();

        let mut report = BuildReport {
            fresh: winners.len(),
            packaged: resolver.packaged().len(),
            ..Default::default()
        };

        report.manifest_entries = write_manifest(&layout, &resolver, &repo_addon)?;

        let keep = packaged_file_names(resolver.packaged());
        let mut ready = Vec::with_capacity(winners.len());
        for addon in winners {
            let out_dir = layout.addon_dir(addon.id());
            match stage_addon(addon, &out_dir, &keep) {
                Ok(missing) => {
                    report.missing_assets += missing;
                    ready.push((addon, out_dir));
                }
                Err(e) => {
                    error!(id = addon.id(), error = %e, "Failed to prepare add-on output");
                    report.failures += 1;
                }
            }
        }

        match self_addon::write_repository_archive(&repo_addon) {
            Ok(path) => {
                info!(path = %path.display(), "Repository add-on archived");
                report.archives_written += 1;
            }
            Err(e) => {
                error!(error = %e, "Failed to archive repository add-on");
                report.failures += 1;
            }
        }

        for (addon, out_dir) in ready {
            match archive::write_addon_archive(addon, &out_dir) {
                Ok(path) => {
                    info!(path = %path.display(), "Add-on archived");
                    report.archives_written += 1;
                }
                Err(e) => {
                    error!(id = addon.id(), error = %e, "Failed to archive add-on");
                    report.failures += 1;
                }
            }
        }

        info!(
            fresh = report.fresh,
            packaged = report.packaged,
            entries = report.manifest_entries,
            archives = report.archives_written,
            failures = report.failures,
            "Repository build complete"
        );
        Ok(report)
    }
}

/// Merge packaged, fresh and repository descriptors into `addons.xml`.
///
/// Later sources overwrite earlier ones for the same identifier and version.
fn write_manifest(layout: &RepoLayout, resolver: &Resolver, repo_addon: &Addon) -> RepoResult<usize> {
    info!("Generating addons.xml file");

    let mut manifest = ManifestBuilder::new();
    manifest.extend(resolver.packaged().iter().map(Addon::descriptor));
    manifest.extend(resolver.fresh_winners().into_iter().map(Addon::descriptor));
    manifest.insert(repo_addon.descriptor());

    let path = layout.manifest_path();
    manifest.write_to(&path).map_err(|e| RepoError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;
    checksum::write_checksum_file(&path)?;

    Ok(manifest.len())
}

/// Clear the add-on's output directory and copy its assets.
/// Returns the number of missing assets.
fn stage_addon(addon: &Addon, out_dir: &Path, keep: &HashSet<String>) -> RepoResult<usize> {
    let removed = assets::prepare_output_dir(out_dir, keep)?;
    if removed > 0 {
        info!(id = addon.id(), removed, "Cleared previous output");
    }
    let copy = assets::copy_assets(addon, out_dir)?;
    if !copy.missing.is_empty() {
        warn!(id = addon.id(), missing = ?copy.missing, "Some assets are missing");
    }
    Ok(copy.missing.len())
}

/// File names of packaged archives and their checksums, which survive cleanup.
fn packaged_file_names(packaged: &[Addon]) -> HashSet<String> {
    packaged
        .iter()
        .filter_map(|addon| addon.source().path().file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .flat_map(|name| [naming::checksum_filename(&name), name])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config_for(addons_dir: &Path, repo_dir: &Path) -> Config {
        Config {
            repo_name: "Test Repo".to_string(),
            repo_addon_id: "repository.test".to_string(),
            repo_addon_version: "1.0.0".to_string(),
            repo_addon_author: "tester".to_string(),
            repo_addon_summary: "Test".to_string(),
            repo_addon_description: "Test repository".to_string(),
            repo_url: "https://example.com/repo".to_string(),
            addons_dir: addons_dir.to_path_buf(),
            repo_dir: repo_dir.to_path_buf(),
        }
    }

    fn write_addon(root: &Path, dir: &str, id: &str, version: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join("addon.xml"),
            format!(r#"<addon id="{id}" version="{version}"/>"#),
        )
        .unwrap();
    }

    #[test]
    fn test_run_empty_addons_dir() {
        let temp = TempDir::new().unwrap();
        let addons = temp.path().join("addons");
        fs::create_dir_all(&addons).unwrap();
        let repo = temp.path().join("repo");

        let report = RepoBuilder::new(config_for(&addons, &repo)).run().unwrap();

        assert_eq!(report.fresh, 0);
        assert_eq!(report.manifest_entries, 1);
        assert_eq!(report.archives_written, 1);
        let manifest = fs::read_to_string(repo.join("addons.xml")).unwrap();
        assert!(manifest.contains(r#"id="repository.test""#));
    }

    #[test]
    fn test_duplicate_fresh_sources_newest_wins() {
        let temp = TempDir::new().unwrap();
        let addons = temp.path().join("addons");
        write_addon(&addons, "old", "plugin.a", "1.0");
        write_addon(&addons, "new", "plugin.a", "1.1");
        let repo = temp.path().join("repo");

        let report = RepoBuilder::new(config_for(&addons, &repo)).run().unwrap();

        assert_eq!(report.fresh, 1);
        assert!(repo.join("plugin.a/plugin.a-1.1.zip").is_file());
        assert!(!repo.join("plugin.a/plugin.a-1.0.zip").exists());
    }

    #[test]
    fn test_missing_addons_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let result = RepoBuilder::new(config_for(
            &temp.path().join("nope"),
            &temp.path().join("repo"),
        ))
        .run();
        assert!(matches!(result, Err(RepoError::Scan(_))));
    }

    #[test]
    fn test_packaged_file_names() {
        let addon = Addon::from_descriptor_bytes(
            crate::addon::AddonSource::Archive(PathBuf::from("/repo/a/a-1.0.zip")),
            r#"<addon id="a" version="1.0"/>"#,
        )
        .unwrap();

        let names = packaged_file_names(&[addon]);
        assert!(names.contains("a-1.0.zip"));
        assert!(names.contains("a-1.0.zip.md5"));
        assert_eq!(names.len(), 2);
    }
}
