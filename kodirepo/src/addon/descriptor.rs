//! Parsed `addon.xml` descriptors.

use roxmltree::{Document, Node, ParsingOptions};

use super::error::{AddonError, AddonResult};
use crate::naming;
use crate::version::VersionKey;

/// Extension point that carries add-on metadata (summary, artwork, ...).
pub const METADATA_EXTENSION_POINT: &str = "xbmc.addon.metadata";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Identity, version, raw text and declared artwork of one add-on.
///
/// The raw lines are kept verbatim so the descriptor can be embedded in
/// `addons.xml` exactly as the author wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorRecord {
    identifier: String,
    version: VersionKey,
    raw_lines: Vec<String>,
    asset_paths: Vec<String>,
}

impl DescriptorRecord {
    /// Parse descriptor bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not UTF-8 XML, when there is not exactly one
    /// `<addon>` element, or when its `id` or `version` attribute is missing.
    /// Both must also be usable in file names: the id names the add-on's
    /// repository directory and the version is part of its archive name.
    pub fn parse(bytes: &[u8]) -> AddonResult<Self> {
        let text = String::from_utf8(bytes.to_vec())?;
        Self::parse_str(&text)
    }

    /// Parse descriptor text.
    pub fn parse_str(text: &str) -> AddonResult<Self> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document = Document::parse_with_options(text, options)?;

        let addons: Vec<Node> = document
            .descendants()
            .filter(|n| n.has_tag_name("addon"))
            .collect();
        let [addon] = addons.as_slice() else {
            return Err(AddonError::AddonElementCount(addons.len()));
        };

        let identifier = required_attribute(addon, "id")?;
        if !naming::is_safe_file_component(&identifier) {
            return Err(AddonError::InvalidIdentifier(identifier));
        }
        let version = VersionKey::parse(&required_attribute(addon, "version")?);
        if !naming::is_safe_file_component(&naming::archive_filename(&identifier, &version)) {
            return Err(AddonError::InvalidVersion(version.to_string()));
        }

        Ok(Self {
            identifier,
            version,
            raw_lines: text.lines().map(String::from).collect(),
            asset_paths: collect_asset_paths(addon),
        })
    }

    /// The add-on identifier, e.g. `plugin.video.foo`.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn version(&self) -> &VersionKey {
        &self.version
    }

    /// Descriptor text split into lines, without line terminators.
    pub fn raw_lines(&self) -> &[String] {
        &self.raw_lines
    }

    /// Artwork paths relative to the add-on root, in declaration order.
    pub fn asset_paths(&self) -> &[String] {
        &self.asset_paths
    }
}

fn required_attribute(node: &Node, name: &'static str) -> AddonResult<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .ok_or(AddonError::MissingAttribute(name))
}

/// Text of every element child of the first `<assets>` inside the first
/// metadata extension.
fn collect_asset_paths(addon: &Node) -> Vec<String> {
    let Some(metadata) = addon.descendants().find(|n| {
        n.has_tag_name("extension") && n.attribute("point") == Some(METADATA_EXTENSION_POINT)
    }) else {
        return Vec::new();
    };
    let Some(assets) = metadata.descendants().find(|n| n.has_tag_name("assets")) else {
        return Vec::new();
    };

    assets
        .children()
        .filter(Node::is_element)
        .filter_map(|asset| asset.text())
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(String::from)
        .collect()
}
