//! The merged `addons.xml` index.
//!
//! Every descriptor known to the repository is embedded verbatim, minus its
//! XML declaration. Entries are keyed by identifier and version: a later
//! insertion for the same pair overwrites the earlier one, which is how
//! freshly built descriptors take precedence over packaged ones.
//!
//! Output is ordered by identifier, then version, so identical inputs always
//! produce byte-identical manifests.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::addon::DescriptorRecord;
use crate::version::VersionKey;

/// XML declaration heading the manifest.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const OPEN_TAG: &str = "<addons>";
const CLOSE_TAG: &str = "</addons>";

/// Accumulates descriptor blocks and renders `addons.xml`.
#[derive(Debug, Default, Clone)]
pub struct ManifestBuilder {
    entries: BTreeMap<String, BTreeMap<VersionKey, Vec<String>>>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, replacing any entry with the same identifier and version.
    ///
    /// Returns `true` if an existing entry was replaced.
    pub fn insert(&mut self, record: &DescriptorRecord) -> bool {
        let replaced = self
            .entries
            .entry(record.identifier().to_string())
            .or_default()
            .insert(record.version().clone(), record.raw_lines().to_vec())
            .is_some();
        if replaced {
            debug!(
                id = record.identifier(),
                version = %record.version(),
                "Manifest entry replaced"
            );
        }
        replaced
    }

    /// Add descriptors in order; later ones win on collisions.
    pub fn extend<'a>(&mut self, records: impl IntoIterator<Item = &'a DescriptorRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    /// Number of (identifier, version) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether an entry exists.
    pub fn contains(&self, id: &str, version: &VersionKey) -> bool {
        self.entries
            .get(id)
            .is_some_and(|versions| versions.contains_key(version))
    }

    /// Render the manifest document.
    pub fn render(&self) -> String {
        let mut document = format!("{}\n{}\n", XML_DECLARATION, OPEN_TAG);

        for lines in self.entries.values().flat_map(BTreeMap::values) {
            let mut block = String::new();
            for line in lines.iter().filter(|line| !line.contains("<?xml")) {
                block.push_str(line.trim_end());
                block.push('\n');
            }
            document.push_str(block.trim_end());
            document.push_str("\n\n");
        }

        let mut document = document.trim().to_string();
        document.push('\n');
        document.push_str(CLOSE_TAG);
        document.push('\n');
        document
    }

    /// Render and write the manifest to `path`.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}
