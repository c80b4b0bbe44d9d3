//! MD5 checksum files.
//!
//! Kodi verifies `addons.xml` and each archive against a sibling file holding
//! the lowercase hex MD5 digest of its contents, with no trailing newline.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use super::error::{RepoError, RepoResult};
use crate::naming;

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the MD5 checksum of a file.
///
/// # Returns
///
/// The lowercase hexadecimal MD5 digest of the file contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn calculate_file_checksum(path: &Path) -> RepoResult<String> {
    let mut file = File::open(path).map_err(|e| RepoError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| RepoError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Write `<path>.md5` next to `path`, returning the checksum file's path.
pub fn write_checksum_file(path: &Path) -> RepoResult<PathBuf> {
    let digest = calculate_file_checksum(path)?;
    let checksum_path = naming::checksum_path(path);
    fs::write(&checksum_path, digest).map_err(|e| RepoError::WriteFailed {
        path: checksum_path.clone(),
        source: e,
    })?;
    Ok(checksum_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_calculate_checksum() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        fs::write(&path, b"hello world").unwrap();

        let checksum = calculate_file_checksum(&path).unwrap();
        assert_eq!(checksum, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_calculate_checksum_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.txt");
        fs::write(&path, b"").unwrap();

        let checksum = calculate_file_checksum(&path).unwrap();
        assert_eq!(checksum, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_checksum_spans_buffer_boundary() {
        let temp = TempDir::new().unwrap();
        let big = temp.path().join("big.bin");
        let data = vec![7u8; BUFFER_SIZE * 2 + 13];
        fs::write(&big, &data).unwrap();

        let expected = format!("{:x}", Md5::digest(&data));
        assert_eq!(calculate_file_checksum(&big).unwrap(), expected);
    }

    #[test]
    fn test_write_checksum_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("addons.xml");
        fs::write(&path, b"hello world").unwrap();

        let written = write_checksum_file(&path).unwrap();
        assert_eq!(written, temp.path().join("addons.xml.md5"));
        assert_eq!(
            fs::read_to_string(&written).unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_checksum_missing_file() {
        let result = calculate_file_checksum(Path::new("/nonexistent/file.zip"));
        assert!(matches!(result, Err(RepoError::ReadFailed { .. })));
    }
}
