//! Repository configuration.
//!
//! Settings come from two layers: values persisted in the config file and
//! explicit overrides (usually command-line flags). Both are expressed as
//! [`ConfigOverrides`]; [`Config::validate`] turns the merged result into a
//! complete [`Config`] or reports every problem at once.

mod error;
mod file;

pub use error::ConfigError;
pub use file::{default_config_path, ConfigFile};

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::naming;

/// Prefix every repository add-on identifier must carry.
pub const REPOSITORY_ID_PREFIX: &str = "repository.";

/// Command-line flags naming each setting in validation messages.
pub mod flags {
    pub const NAME: &str = "--name";
    pub const ID: &str = "--id";
    pub const VERSION: &str = "--version";
    pub const AUTHOR: &str = "--author";
    pub const SUMMARY: &str = "--summary";
    pub const DESCRIPTION: &str = "--description";
    pub const URL: &str = "--url";
    pub const ADDONS_DIR: &str = "--addons-dir";
    pub const REPO_DIR: &str = "--repo-dir";
}

/// Complete, validated repository settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Display name of the repository.
    pub repo_name: String,
    /// Identifier of the repository add-on, starting with `repository.`.
    pub repo_addon_id: String,
    pub repo_addon_version: String,
    pub repo_addon_author: String,
    pub repo_addon_summary: String,
    pub repo_addon_description: String,
    /// Base URL the repository is served from, without a trailing slash.
    pub repo_url: String,
    /// Directory holding the add-on sources.
    pub addons_dir: PathBuf,
    /// Output directory of the repository.
    pub repo_dir: PathBuf,
}

/// Partially specified settings, one layer of configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub repo_name: Option<String>,
    pub repo_addon_id: Option<String>,
    pub repo_addon_version: Option<String>,
    pub repo_addon_author: Option<String>,
    pub repo_addon_summary: Option<String>,
    pub repo_addon_description: Option<String>,
    pub repo_url: Option<String>,
    pub addons_dir: Option<PathBuf>,
    pub repo_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Layer `overrides` on top of `self`; non-empty override values win.
    pub fn merged_with(self, overrides: ConfigOverrides) -> Self {
        fn pick<T: AsRef<OsStr>>(base: Option<T>, over: Option<T>) -> Option<T> {
            over.filter(|v| !AsRef::<OsStr>::as_ref(v).is_empty())
                .or(base)
        }

        Self {
            repo_name: pick(self.repo_name, overrides.repo_name),
            repo_addon_id: pick(self.repo_addon_id, overrides.repo_addon_id),
            repo_addon_version: pick(self.repo_addon_version, overrides.repo_addon_version),
            repo_addon_author: pick(self.repo_addon_author, overrides.repo_addon_author),
            repo_addon_summary: pick(self.repo_addon_summary, overrides.repo_addon_summary),
            repo_addon_description: pick(
                self.repo_addon_description,
                overrides.repo_addon_description,
            ),
            repo_url: pick(self.repo_url, overrides.repo_url),
            addons_dir: pick(self.addons_dir, overrides.addons_dir),
            repo_dir: pick(self.repo_dir, overrides.repo_dir),
        }
    }
}

impl From<Config> for ConfigOverrides {
    fn from(config: Config) -> Self {
        Self {
            repo_name: Some(config.repo_name),
            repo_addon_id: Some(config.repo_addon_id),
            repo_addon_version: Some(config.repo_addon_version),
            repo_addon_author: Some(config.repo_addon_author),
            repo_addon_summary: Some(config.repo_addon_summary),
            repo_addon_description: Some(config.repo_addon_description),
            repo_url: Some(config.repo_url),
            addons_dir: Some(config.addons_dir),
            repo_dir: Some(config.repo_dir),
        }
    }
}

/// Collects validation problems across all settings.
#[derive(Default)]
struct Violations {
    missing: Vec<String>,
    wrong: Vec<String>,
}

impl Violations {
    fn require_text(&mut self, value: Option<String>, flag: &str) -> String {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => v,
            None => {
                self.missing.push(flag.to_string());
                String::new()
            }
        }
    }

    fn require_path(&mut self, value: Option<PathBuf>, flag: &str) -> PathBuf {
        match value.filter(|p| !p.as_os_str().is_empty()) {
            Some(p) => p,
            None => {
                self.missing.push(flag.to_string());
                PathBuf::new()
            }
        }
    }

    fn reject(&mut self, flag: &str, reason: &str) {
        self.wrong.push(format!("{}: {}", flag, reason));
    }
}

impl Config {
    /// Validate merged settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every missing flag and every
    /// unusable value.
    pub fn validate(values: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut violations = Violations::default();

        let repo_name = violations.require_text(values.repo_name, flags::NAME);
        let repo_addon_id = violations.require_text(values.repo_addon_id, flags::ID);
        let repo_addon_version = violations.require_text(values.repo_addon_version, flags::VERSION);
        let repo_addon_author = violations.require_text(values.repo_addon_author, flags::AUTHOR);
        let repo_addon_summary = violations.require_text(values.repo_addon_summary, flags::SUMMARY);
        let repo_addon_description =
            violations.require_text(values.repo_addon_description, flags::DESCRIPTION);
        let mut repo_url = violations.require_text(values.repo_url, flags::URL);
        let mut addons_dir = violations.require_path(values.addons_dir, flags::ADDONS_DIR);
        let mut repo_dir = violations.require_path(values.repo_dir, flags::REPO_DIR);

        if !repo_addon_id.is_empty() {
            if !repo_addon_id.starts_with(REPOSITORY_ID_PREFIX) {
                violations.reject(flags::ID, "The addon ID must start with 'repository.'");
            } else if !naming::is_safe_file_component(&repo_addon_id) {
                violations.reject(flags::ID, "The addon ID must not contain path separators");
            }
        }

        if !repo_url.is_empty() {
            if let Some(stripped) = repo_url.strip_suffix('/') {
                repo_url = stripped.to_string();
            }
            if !is_valid_base_url(&repo_url) {
                violations.reject(flags::URL, "a valid URL must be provided");
            }
        }

        if !addons_dir.as_os_str().is_empty() {
            if addons_dir.is_dir() {
                addons_dir = resolve_path(&addons_dir);
            } else {
                violations.reject(flags::ADDONS_DIR, "a valid directory must be provided");
            }
        }

        // The repository directory may not exist yet; it is created on build.
        if !repo_dir.as_os_str().is_empty() {
            repo_dir = resolve_path(&repo_dir);
        }

        if !violations.missing.is_empty() || !violations.wrong.is_empty() {
            return Err(ConfigError::Invalid {
                missing: violations.missing,
                wrong: violations.wrong,
            });
        }

        Ok(Self {
            repo_name,
            repo_addon_id,
            repo_addon_version,
            repo_addon_author,
            repo_addon_summary,
            repo_addon_description,
            repo_url,
            addons_dir,
            repo_dir,
        })
    }
}

fn is_valid_base_url(text: &str) -> bool {
    match Url::parse(text) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Canonical form for existing paths, absolute form otherwise.
fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
