//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use kodirepo::config::ConfigOverrides;

/// Create a Kodi add-on repository from a folder of add-ons.
///
/// Settings given on the command line override those stored in the config
/// file; the effective settings are written back after validation.
#[derive(Debug, Parser)]
#[command(name = "kodirepo", disable_version_flag = true)]
pub struct Cli {
    /// Name of the repository
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub repo_name: Option<String>,

    /// Add-on ID of the repository add-on (must start with "repository.")
    #[arg(short = 'r', long = "id", value_name = "ID")]
    pub repo_addon_id: Option<String>,

    /// Version of the repository add-on
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub repo_addon_version: Option<String>,

    /// Author of the repository add-on
    #[arg(short = 'a', long = "author", value_name = "AUTHOR")]
    pub repo_addon_author: Option<String>,

    /// Short summary of the repository add-on
    #[arg(short = 's', long = "summary", value_name = "SUMMARY")]
    pub repo_addon_summary: Option<String>,

    /// Description of the repository add-on
    #[arg(short = 'd', long = "description", value_name = "DESCRIPTION")]
    pub repo_addon_description: Option<String>,

    /// Base URL the repository is served from
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub repo_url: Option<String>,

    /// Directory containing the add-on sources
    #[arg(short = 'i', long = "addons-dir", value_name = "DIR")]
    pub addons_dir: Option<PathBuf>,

    /// Output directory of the repository
    #[arg(short = 'o', long = "repo-dir", value_name = "DIR")]
    pub repo_dir: Option<PathBuf>,

    /// Increase log verbosity (repeat for more)
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Configuration file [default: <config dir>/kodirepo/config.ini]
    #[arg(value_name = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}

impl Cli {
    /// Settings given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            repo_name: self.repo_name.clone(),
            repo_addon_id: self.repo_addon_id.clone(),
            repo_addon_version: self.repo_addon_version.clone(),
            repo_addon_author: self.repo_addon_author.clone(),
            repo_addon_summary: self.repo_addon_summary.clone(),
            repo_addon_description: self.repo_addon_description.clone(),
            repo_url: self.repo_url.clone(),
            addons_dir: self.addons_dir.clone(),
            repo_dir: self.repo_dir.clone(),
        }
    }
}
