//! Persisted configuration file (INI format).
//!
//! ```ini
//! [repository]
//! name = My Repository
//! id = repository.example
//! version = 1.0.0
//! author = someone
//! summary = Example add-ons
//! description = Add-ons built by someone
//! url = https://example.com/kodi
//!
//! [paths]
//! addons_dir = /home/someone/addons
//! repo_dir = /srv/kodi
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::{info, warn};

use super::{Config, ConfigError, ConfigOverrides};

const REPOSITORY_SECTION: &str = "repository";
const PATHS_SECTION: &str = "paths";

/// Default config file location: `<config dir>/kodirepo/config.ini`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("kodirepo").join("config.ini"))
        .unwrap_or_else(|| PathBuf::from("kodirepo.ini"))
}

/// Loads and stores settings at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored settings.
    ///
    /// A missing file is created empty. A file that cannot be parsed is
    /// reported and treated as empty.
    pub fn load(&self) -> Result<ConfigOverrides, ConfigError> {
        if !self.path.is_file() {
            self.create_empty()?;
        }

        match Ini::load_from_file(&self.path) {
            Ok(ini) => Ok(read_overrides(&ini)),
            Err(ini::Error::Io(e)) => Err(ConfigError::Read {
                path: self.path.clone(),
                source: e,
            }),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Error parsing the config file, assuming empty config"
                );
                Ok(ConfigOverrides::default())
            }
        }
    }

    /// Write the effective settings back to the file.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.with_section(Some(REPOSITORY_SECTION))
            .set("name", config.repo_name.as_str())
            .set("id", config.repo_addon_id.as_str())
            .set("version", config.repo_addon_version.as_str())
            .set("author", config.repo_addon_author.as_str())
            .set("summary", config.repo_addon_summary.as_str())
            .set("description", config.repo_addon_description.as_str())
            .set("url", config.repo_url.as_str());
        ini.with_section(Some(PATHS_SECTION))
            .set("addons_dir", config.addons_dir.to_string_lossy())
            .set("repo_dir", config.repo_dir.to_string_lossy());

        ini.write_to_file(&self.path)
            .map_err(|e| ConfigError::Write {
                path: self.path.clone(),
                source: e,
            })
    }

    fn create_empty(&self) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(&self.path, "").map_err(write_error)?;
        info!(path = %self.path.display(), "Created empty config file");
        Ok(())
    }
}

fn read_overrides(ini: &Ini) -> ConfigOverrides {
    let text = |section: &str, key: &str| {
        ini.get_from(Some(section), key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
    };

    ConfigOverrides {
        repo_name: text(REPOSITORY_SECTION, "name"),
        repo_addon_id: text(REPOSITORY_SECTION, "id"),
        repo_addon_version: text(REPOSITORY_SECTION, "version"),
        repo_addon_author: text(REPOSITORY_SECTION, "author"),
        repo_addon_summary: text(REPOSITORY_SECTION, "summary"),
        repo_addon_description: text(REPOSITORY_SECTION, "description"),
        repo_url: text(REPOSITORY_SECTION, "url"),
        addons_dir: text(PATHS_SECTION, "addons_dir").map(PathBuf::from),
        repo_dir: text(PATHS_SECTION, "repo_dir").map(PathBuf::from),
    }
}
