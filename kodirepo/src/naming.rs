//! File names a Kodi repository is made of:
//! - Add-on descriptors (`addon.xml`)
//! - The merged index (`addons.xml`)
//! - Add-on archives (e.g., `plugin.video.foo-1.2.0.zip`)
//! - Checksum files (e.g., `plugin.video.foo-1.2.0.zip.md5`)
//!
//! Build names through these helpers instead of formatting them inline.

use std::path::{Component, Path, PathBuf};

use crate::version::VersionKey;

/// Descriptor file every add-on carries at its root.
pub const DESCRIPTOR_FILENAME: &str = "addon.xml";

/// Merged index written at the repository root.
pub const MANIFEST_FILENAME: &str = "addons.xml";

/// Extension appended to a file name to form its checksum file.
pub const CHECKSUM_EXTENSION: &str = "md5";

/// Extension of add-on archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Check that `name` is a single plain file or directory name.
///
/// Rejects empty names, `.`, `..`, path separators, NUL bytes and anything
/// the platform reads as a root or drive prefix.
///
/// ```
/// use kodirepo::naming::is_safe_file_component;
///
/// assert!(is_safe_file_component("plugin.video.foo"));
/// assert!(!is_safe_file_component("../victim"));
/// ```
pub fn is_safe_file_component(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Generate the archive filename for an add-on.
///
/// # Format
///
/// `{id}-{version}.zip`
///
/// # Examples
///
/// ```
/// use kodirepo::naming::archive_filename;
/// use kodirepo::version::VersionKey;
///
/// assert_eq!(
///     archive_filename("plugin.video.foo", &VersionKey::parse("1.2.0")),
///     "plugin.video.foo-1.2.0.zip"
/// );
/// assert_eq!(
///     archive_filename("script.bar", &VersionKey::parse("2.1~beta1")),
///     "script.bar-2.1~beta1.zip"
/// );
/// ```
pub fn archive_filename(id: &str, version: &VersionKey) -> String {
    format!("{}-{}.{}", id, version, ARCHIVE_EXTENSION)
}

/// Generate the checksum filename for a file name.
///
/// ```
/// use kodirepo::naming::checksum_filename;
///
/// assert_eq!(checksum_filename("addons.xml"), "addons.xml.md5");
/// ```
pub fn checksum_filename(file_name: &str) -> String {
    format!("{}.{}", file_name, CHECKSUM_EXTENSION)
}

/// Path of the checksum file that accompanies `path`.
///
/// The checksum lives in the same directory, with `.md5` appended to the
/// full file name (not replacing the extension).
pub fn checksum_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(checksum_filename(&name))
}
