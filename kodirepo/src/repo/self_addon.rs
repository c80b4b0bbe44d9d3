//! The repository's own add-on.
//!
//! Kodi discovers a repository through an add-on of type
//! `xbmc.addon.repository` that points at `addons.xml`, its checksum and the
//! directory holding the archives. Its descriptor is generated from the
//! configuration on every build.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::archive;
use super::error::{RepoError, RepoResult};
use super::layout::RepoLayout;
use crate::addon::{Addon, AddonSource};
use crate::config::Config;
use crate::naming::{self, DESCRIPTOR_FILENAME, MANIFEST_FILENAME};

/// Render the repository add-on descriptor.
pub fn render_descriptor(config: &Config) -> String {
    let url = config.repo_url.trim_end_matches('/');
    let manifest_url = format!("{}/{}", url, MANIFEST_FILENAME);
    let checksum_url = format!("{}/{}", url, naming::checksum_filename(MANIFEST_FILENAME));

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<addon id="{id}" name="{name}" version="{version}" provider-name="{author}">
    <extension point="xbmc.addon.repository" name="{name}">
        <dir>
            <info compressed="false">{info}</info>
            <checksum>{checksum}</checksum>
            <datadir zip="true">{datadir}/</datadir>
        </dir>
    </extension>
    <extension point="xbmc.addon.metadata">
        <summary>{summary}</summary>
        <description>{description}</description>
        <platform>all</platform>
    </extension>
</addon>
"#,
        id = escape_xml(&config.repo_addon_id),
        name = escape_xml(&config.repo_name),
        version = escape_xml(&config.repo_addon_version),
        author = escape_xml(&config.repo_addon_author),
        info = escape_xml(&manifest_url),
        checksum = escape_xml(&checksum_url),
        datadir = escape_xml(url),
        summary = escape_xml(&config.repo_addon_summary),
        description = escape_xml(&config.repo_addon_description),
    )
}

/// Write `<repo_dir>/<repo_addon_id>/addon.xml` and open it as an add-on.
pub fn write_repository_addon(config: &Config, layout: &RepoLayout) -> RepoResult<Addon> {
    let dir = layout.addon_dir(&config.repo_addon_id);
    fs::create_dir_all(&dir).map_err(|e| RepoError::CreateDirectoryFailed {
        path: dir.clone(),
        source: e,
    })?;

    let descriptor_path = dir.join(DESCRIPTOR_FILENAME);
    let descriptor = render_descriptor(config);
    fs::write(&descriptor_path, &descriptor).map_err(|e| RepoError::WriteFailed {
        path: descriptor_path.clone(),
        source: e,
    })?;
    info!(path = %descriptor_path.display(), "Created repository addon.xml");

    Addon::from_descriptor_bytes(AddonSource::Directory(dir), descriptor).map_err(|e| {
        RepoError::InvalidDescriptor {
            path: descriptor_path,
            source: e,
        }
    })
}

/// Archive the repository add-on next to its descriptor, holding only `addon.xml`.
pub fn write_repository_archive(addon: &Addon) -> RepoResult<PathBuf> {
    let dir = addon.source().path().to_path_buf();
    archive::write_addon_archive_filtered(addon, &dir, |relative| {
        relative == Path::new(DESCRIPTOR_FILENAME)
    })
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn sample_config(repo_dir: &Path) -> Config {
        Config {
            repo_name: "Tom & Jerry's <Repo>".to_string(),
            repo_addon_id: "repository.tj".to_string(),
            repo_addon_version: "1.0.1".to_string(),
            repo_addon_author: "T&J".to_string(),
            repo_addon_summary: "Cartoons".to_string(),
            repo_addon_description: "Classic \"cartoons\"".to_string(),
            repo_url: "https://example.com/kodi".to_string(),
            addons_dir: PathBuf::from("/unused"),
            repo_dir: repo_dir.to_path_buf(),
        }
    }

    #[test]
    fn test_render_parses_back() {
        let config = sample_config(Path::new("/repo"));
        let rendered = render_descriptor(&config);

        let addon = Addon::from_descriptor_bytes(
            AddonSource::Directory(PathBuf::from("/repo/repository.tj")),
            rendered.clone(),
        )
        .unwrap();
        assert_eq!(addon.id(), "repository.tj");
        assert_eq!(addon.version().to_string(), "1.0.1");
        assert!(rendered.contains("name=\"Tom &amp; Jerry&apos;s &lt;Repo&gt;\""));
        assert!(rendered.contains("<info compressed=\"false\">https://example.com/kodi/addons.xml</info>"));
        assert!(rendered.contains("<checksum>https://example.com/kodi/addons.xml.md5</checksum>"));
        assert!(rendered.contains("<datadir zip=\"true\">https://example.com/kodi/</datadir>"));
    }

    #[test]
    fn test_write_repository_addon_and_archive() {
        let temp = TempDir::new().unwrap();
        let layout = RepoLayout::open_or_create(temp.path()).unwrap();
        let config = sample_config(temp.path());

        let addon = write_repository_addon(&config, &layout).unwrap();
        fs::write(temp.path().join("repository.tj/stray.txt"), b"x").unwrap();
        let archive = write_repository_archive(&addon).unwrap();

        assert_eq!(archive, temp.path().join("repository.tj/repository.tj-1.0.1.zip"));
        let zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert_eq!(names, vec!["repository.tj/addon.xml"]);
        assert!(temp
            .path()
            .join("repository.tj/repository.tj-1.0.1.zip.md5")
            .is_file());
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
