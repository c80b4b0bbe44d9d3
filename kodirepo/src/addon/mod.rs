//! Add-on sources, descriptors, discovery and version resolution.

mod descriptor;
mod error;
mod resolver;
mod scanner;
mod source;

pub use descriptor::{DescriptorRecord, METADATA_EXTENSION_POINT};
pub use error::{AddonError, AddonResult, ScanError};
pub use resolver::{Offer, Resolver};
pub use scanner::{SourceScanner, CANDIDATE_PATTERNS, PACKAGED_PATTERNS};
pub use source::AddonSource;

use crate::naming::{self, DESCRIPTOR_FILENAME};
use crate::version::VersionKey;

/// An add-on source together with its parsed descriptor.
#[derive(Debug, Clone)]
pub struct Addon {
    source: AddonSource,
    descriptor: DescriptorRecord,
    descriptor_bytes: Vec<u8>,
}

impl Addon {
    /// Read and parse `addon.xml` from a source.
    pub fn open(source: AddonSource) -> AddonResult<Self> {
        let bytes = source
            .read_file(DESCRIPTOR_FILENAME)?
            .ok_or_else(|| AddonError::MissingDescriptor(source.path().to_path_buf()))?;
        Self::from_descriptor_bytes(source, bytes)
    }

    /// Build an add-on from descriptor bytes already read from `source`.
    pub fn from_descriptor_bytes(source: AddonSource, bytes: impl Into<Vec<u8>>) -> AddonResult<Self> {
        let descriptor_bytes = bytes.into();
        let descriptor = DescriptorRecord::parse(&descriptor_bytes)?;
        Ok(Self {
            source,
            descriptor,
            descriptor_bytes,
        })
    }

    pub fn id(&self) -> &str {
        self.descriptor.identifier()
    }

    pub fn version(&self) -> &VersionKey {
        self.descriptor.version()
    }

    pub fn source(&self) -> &AddonSource {
        &self.source
    }

    pub fn descriptor(&self) -> &DescriptorRecord {
        &self.descriptor
    }

    /// Descriptor exactly as read from the source.
    pub fn descriptor_bytes(&self) -> &[u8] {
        &self.descriptor_bytes
    }

    /// Archive file name for this add-on, `{id}-{version}.zip`.
    pub fn archive_name(&self) -> String {
        naming::archive_filename(self.id(), self.version())
    }
}
