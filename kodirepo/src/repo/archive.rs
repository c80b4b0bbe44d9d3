//! Versioned add-on archives.
//!
//! Directory sources are compressed into `{id}-{version}.zip` with every
//! entry below a single `{id}/` folder, as Kodi expects. Archive sources are
//! already in that shape and are copied unchanged. Every archive gets an MD5
//! checksum file alongside it.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::checksum;
use super::error::{RepoError, RepoResult};
use crate::addon::{Addon, AddonSource};

/// Write the archive and checksum for `addon` into `dest_dir`.
///
/// Returns the path of the written archive.
pub fn write_addon_archive(addon: &Addon, dest_dir: &Path) -> RepoResult<PathBuf> {
    write_addon_archive_filtered(addon, dest_dir, |_| true)
}

/// Like [`write_addon_archive`], packing only the directory entries for which
/// `include` returns `true`. The filter receives paths relative to the
/// add-on root and is ignored for archive sources.
pub fn write_addon_archive_filtered(
    addon: &Addon,
    dest_dir: &Path,
    include: impl Fn(&Path) -> bool,
) -> RepoResult<PathBuf> {
    let archive_path = dest_dir.join(addon.archive_name());

    match addon.source() {
        AddonSource::Archive(source) => {
            info!(id = addon.id(), path = %source.display(), "Add-on is already a ZIP archive, copying");
            if source != &archive_path {
                fs::copy(source, &archive_path).map_err(|e| RepoError::WriteFailed {
                    path: archive_path.clone(),
                    source: e,
                })?;
            }
        }
        AddonSource::Directory(root) => {
            info!(id = addon.id(), version = %addon.version(), "Generating ZIP archive");
            let entries = write_directory_archive(root, addon.id(), &archive_path, include)?;
            debug!(path = %archive_path.display(), entries, "Archive written");
        }
    }

    checksum::write_checksum_file(&archive_path)?;
    Ok(archive_path)
}

/// Compress `root` into `archive_path`, rooting every entry at `top_level/`.
///
/// Hidden files and directories (any component starting with `.`) are
/// skipped, as is the archive itself when it lives below `root`.
/// Returns the number of entries written.
pub fn write_directory_archive(
    root: &Path,
    top_level: &str,
    archive_path: &Path,
    include: impl Fn(&Path) -> bool,
) -> RepoResult<usize> {
    let entries = collect_entries(root, archive_path, include)?;

    let file = File::create(archive_path).map_err(|e| RepoError::WriteFailed {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let archive_error = |source| RepoError::ArchiveFailed {
        path: archive_path.to_path_buf(),
        source,
    };

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for relative in &entries {
        let full_path = root.join(relative);
        let name = entry_name(top_level, relative);

        if full_path.is_dir() {
            zip.add_directory(format!("{}/", name), options)
                .map_err(archive_error)?;
            continue;
        }

        zip.start_file(name, options).map_err(archive_error)?;
        let mut input = File::open(&full_path).map_err(|e| RepoError::ReadFailed {
            path: full_path.clone(),
            source: e,
        })?;
        io::copy(&mut input, &mut zip).map_err(|e| RepoError::WriteFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
    }

    zip.finish().map_err(archive_error)?;
    Ok(entries.len())
}

/// Sorted paths below `root`, relative to it, that belong in the archive.
fn collect_entries(
    root: &Path,
    archive_path: &Path,
    include: impl Fn(&Path) -> bool,
) -> RepoResult<Vec<PathBuf>> {
    let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let paths = glob::glob(&pattern).map_err(|e| RepoError::InvalidPath(e.to_string()))?;

    let mut entries: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Cannot access path while archiving");
                None
            }
        })
        .filter(|path| path != archive_path)
        .filter_map(|path| path.strip_prefix(root).ok().map(Path::to_path_buf))
        .filter(|relative| !relative.as_os_str().is_empty())
        .filter(|relative| !is_hidden(relative))
        .filter(|relative| include(relative.as_path()))
        .collect();
    entries.sort();
    Ok(entries)
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// ZIP entry name: `top_level` followed by the relative path, `/`-separated.
fn entry_name(top_level: &str, relative: &Path) -> String {
    let mut name = top_level.to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn make_source(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("src/plugin.a");
        fs::create_dir_all(root.join("resources/lib")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(
            root.join("addon.xml"),
            r#"<addon id="plugin.a" version="1.0.0"/>"#,
        )
        .unwrap();
        fs::write(root.join("resources/lib/main.py"), "print('hi')").unwrap();
        fs::write(root.join(".gitignore"), "*.pyc").unwrap();
        fs::write(root.join(".git/HEAD"), "ref").unwrap();
        root
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        names
    }

    #[test]
    fn test_directory_archive_layout() {
        let temp = TempDir::new().unwrap();
        let root = make_source(&temp);
        let addon = Addon::open(AddonSource::Directory(root)).unwrap();
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        let archive = write_addon_archive(&addon, &dest).unwrap();

        assert_eq!(archive, dest.join("plugin.a-1.0.0.zip"));
        assert_eq!(
            entry_names(&archive),
            vec![
                "plugin.a/addon.xml",
                "plugin.a/resources/",
                "plugin.a/resources/lib/",
                "plugin.a/resources/lib/main.py",
            ]
        );
        assert!(dest.join("plugin.a-1.0.0.zip.md5").is_file());
    }

    #[test]
    fn test_archive_contents_round_trip() {
        let temp = TempDir::new().unwrap();
        let root = make_source(&temp);
        let addon = Addon::open(AddonSource::Directory(root)).unwrap();

        let archive = write_addon_archive(&addon, temp.path()).unwrap();

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut body = String::new();
        zip.by_name("plugin.a/resources/lib/main.py")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "print('hi')");
    }

    #[test]
    fn test_filtered_archive_contains_descriptor_only() {
        let temp = TempDir::new().unwrap();
        let root = make_source(&temp);
        let addon = Addon::open(AddonSource::Directory(root.clone())).unwrap();

        let archive =
            write_addon_archive_filtered(&addon, &root, |p| p == Path::new("addon.xml")).unwrap();

        assert_eq!(entry_names(&archive), vec!["plugin.a/addon.xml"]);
    }

    #[test]
    fn test_archive_source_copied_verbatim() {
        let temp = TempDir::new().unwrap();
        let root = make_source(&temp);
        let built = Addon::open(AddonSource::Directory(root)).unwrap();
        let first = write_addon_archive(&built, temp.path()).unwrap();

        let zipped = Addon::open(AddonSource::Archive(first.clone())).unwrap();
        let dest = temp.path().join("copy");
        fs::create_dir_all(&dest).unwrap();
        let copied = write_addon_archive(&zipped, &dest).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&copied).unwrap());
        assert_eq!(
            fs::read_to_string(dest.join("plugin.a-1.0.0.zip.md5")).unwrap(),
            checksum::calculate_file_checksum(&first).unwrap()
        );
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new(".git/HEAD")));
        assert!(is_hidden(Path::new("resources/.DS_Store")));
        assert!(!is_hidden(Path::new("resources/icon.png")));
    }

    #[test]
    fn test_entry_name() {
        assert_eq!(
            entry_name("plugin.a", Path::new("resources/icon.png")),
            "plugin.a/resources/icon.png"
        );
    }
}
