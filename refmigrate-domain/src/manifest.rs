//! Legacy manifest reader.

use camino::Utf8Path;
use fs_err as fs;
use refmigrate_types::PackageEntry;
use refmigrate_xml::{Document, XmlError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse manifest: {0}")]
    Xml(#[from] XmlError),

    #[error("manifest entry {index} is missing the `{attribute}` attribute")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    #[error("manifest entry {index} has an empty id")]
    EmptyId { index: usize },
}

/// Parse a `packages.config` into its ordered package entries.
///
/// Every element child of the root is treated as an entry and must carry
/// non-empty `id` and `version` attributes. Document order is preserved.
pub fn read_manifest(path: &Utf8Path) -> Result<Vec<PackageEntry>, ManifestError> {
    let source = fs::read_to_string(path)?;
    let doc = Document::parse(&source)?;

    let mut entries = Vec::new();
    for (index, &child) in doc.children(doc.root()).iter().enumerate() {
        if !doc.is_element(child) {
            continue;
        }
        let id = doc
            .attribute(child, "id")
            .ok_or(ManifestError::MissingAttribute {
                index,
                attribute: "id",
            })?;
        if id.is_empty() {
            return Err(ManifestError::EmptyId { index });
        }
        let version = doc
            .attribute(child, "version")
            .ok_or(ManifestError::MissingAttribute {
                index,
                attribute: "version",
            })?;
        entries.push(PackageEntry::new(id, version));
    }

    debug!(path = %path, entries = entries.len(), "read manifest");
    Ok(entries)
}
