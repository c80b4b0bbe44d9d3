//! Where an add-on's files come from: a directory or a ZIP archive.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::error::{AddonError, AddonResult};

/// Location of an add-on's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonSource {
    /// A directory whose root holds `addon.xml`.
    Directory(PathBuf),
    /// A ZIP archive with a single top-level folder holding `addon.xml`.
    Archive(PathBuf),
}

impl AddonSource {
    /// Classify a path: regular files are archives, anything else a directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_file() {
            Self::Archive(path)
        } else {
            Self::Directory(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Archive(path) => path,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive(_))
    }

    /// Read a file given relative to the add-on root.
    ///
    /// For archives the add-on root is the single top-level folder, so
    /// `resources/icon.png` matches the entry `<anything>/resources/icon.png`.
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read_file(&self, relative: &str) -> AddonResult<Option<Vec<u8>>> {
        match self {
            Self::Directory(root) => read_directory_file(root, relative),
            Self::Archive(archive) => read_archive_file(archive, relative),
        }
    }
}

fn read_directory_file(root: &Path, relative: &str) -> AddonResult<Option<Vec<u8>>> {
    let path = root.join(relative);
    if !path.is_file() {
        return Ok(None);
    }
    fs::read(&path)
        .map(Some)
        .map_err(|source| AddonError::Io { path, source })
}

fn read_archive_file(archive_path: &Path, relative: &str) -> AddonResult<Option<Vec<u8>>> {
    let file = File::open(archive_path).map_err(|source| AddonError::Io {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let archive_error = |source| AddonError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(file).map_err(archive_error)?;

    let Some(entry_name) = archive
        .file_names()
        .find(|name| is_rooted_entry(name, relative))
        .map(String::from)
    else {
        return Ok(None);
    };

    let mut entry = archive.by_name(&entry_name).map_err(archive_error)?;
    // The declared size comes from the archive and is not trusted.
    let mut contents = Vec::new();
    entry
        .read_to_end(&mut contents)
        .map_err(|source| AddonError::Io {
            path: archive_path.join(&entry_name),
            source,
        })?;
    Ok(Some(contents))
}

/// True when `name` is `<top>/<relative>` for a non-empty top-level folder.
fn is_rooted_entry(name: &str, relative: &str) -> bool {
    match name.split_once('/') {
        Some((top, rest)) => !top.is_empty() && rest == relative,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, body) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_from_path_classifies() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("a.zip");
        fs::write(&zip_path, b"").unwrap();

        assert!(AddonSource::from_path(&zip_path).is_archive());
        assert!(!AddonSource::from_path(temp.path()).is_archive());
    }

    #[test]
    fn test_directory_read() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("resources")).unwrap();
        fs::write(temp.path().join("resources/icon.png"), b"png").unwrap();

        let source = AddonSource::Directory(temp.path().to_path_buf());
        assert_eq!(
            source.read_file("resources/icon.png").unwrap(),
            Some(b"png".to_vec())
        );
        assert_eq!(source.read_file("missing.png").unwrap(), None);
    }

    #[test]
    fn test_archive_read_under_top_folder() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("plugin.a-1.0.zip");
        write_zip(
            &zip_path,
            &[
                ("plugin.a/addon.xml", "<addon/>"),
                ("plugin.a/resources/icon.png", "png"),
            ],
        );

        let source = AddonSource::Archive(zip_path);
        assert_eq!(
            source.read_file("addon.xml").unwrap(),
            Some(b"<addon/>".to_vec())
        );
        assert_eq!(
            source.read_file("resources/icon.png").unwrap(),
            Some(b"png".to_vec())
        );
        assert_eq!(source.read_file("icon.png").unwrap(), None);
    }

    #[test]
    fn test_archive_root_level_file_not_matched() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("flat.zip");
        write_zip(&zip_path, &[("addon.xml", "<addon/>")]);

        let source = AddonSource::Archive(zip_path);
        assert_eq!(source.read_file("addon.xml").unwrap(), None);
    }

    #[test]
    fn test_corrupt_archive_errors() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("broken.zip");
        fs::write(&zip_path, b"not a zip").unwrap();

        let err = AddonSource::Archive(zip_path).read_file("addon.xml").unwrap_err();
        assert!(matches!(err, AddonError::Archive { .. }));
    }

    #[test]
    fn test_inflated_declared_size_does_not_preallocate() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("liar.zip");
        let mut zip = ZipWriter::new(File::create(&zip_path).unwrap());
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("plugin.a/addon.xml", stored).unwrap();
        zip.write_all(b"<addon/>").unwrap();
        zip.finish().unwrap();

        // Claim an uncompressed size of almost 4 GiB in the central directory.
        let mut bytes = fs::read(&zip_path).unwrap();
        let header = bytes
            .windows(4)
            .position(|w| w == [0x50, 0x4b, 0x01, 0x02])
            .unwrap();
        bytes[header + 24..header + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
        fs::write(&zip_path, &bytes).unwrap();

        match AddonSource::Archive(zip_path).read_file("addon.xml") {
            Ok(Some(contents)) => assert_eq!(contents, b"<addon/>"),
            Ok(None) | Err(_) => {}
        }
    }

    #[test]
    fn test_is_rooted_entry() {
        assert!(is_rooted_entry("a/addon.xml", "addon.xml"));
        assert!(is_rooted_entry("a/b/c.png", "b/c.png"));
        assert!(!is_rooted_entry("/addon.xml", "addon.xml"));
        assert!(!is_rooted_entry("a/b/addon.xml", "addon.xml"));
        assert!(!is_rooted_entry("addon.xml", "addon.xml"));
    }
}
