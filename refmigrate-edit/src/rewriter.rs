//! Applies an [`EditPlan`] to a project document in place.

use refmigrate_domain::EditPlan;
use refmigrate_types::msbuild;
use refmigrate_xml::{Document, XmlError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RewriteError {
    /// The project file has no `ItemGroup` to anchor the insertion.
    #[error("project file has no ItemGroup element")]
    MissingItemGroup,

    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Mutate `doc` according to `plan`:
///
/// 1. insert a new `ItemGroup` of `PackageReference` items, in plan order,
///    immediately before the first existing `ItemGroup`;
/// 2. detach all obsolete reference/error/import nodes;
/// 3. detach the legacy manifest marker and the restore guard, if planned;
/// 4. bump the root `ToolsVersion` to the migration target.
///
/// Pure with respect to the file system; the document is the output.
pub fn apply_plan(doc: &mut Document, plan: &EditPlan) -> Result<(), RewriteError> {
    let anchor = doc
        .children(doc.root())
        .iter()
        .copied()
        .find(|&c| doc.local_name(c) == "ItemGroup")
        .ok_or(RewriteError::MissingItemGroup)?;

    let group = doc.new_element("ItemGroup");
    for entry in &plan.new_references {
        let node = doc.new_element("PackageReference");
        doc.set_attribute(node, "Include", &entry.id);
        doc.set_attribute(node, "Version", &entry.version);
        doc.append_child(group, node);
    }
    doc.insert_before(anchor, group)?;

    for &node in &plan.obsolete_references {
        doc.detach(node);
    }
    for &node in &plan.obsolete_errors {
        doc.detach(node);
    }
    for &node in &plan.obsolete_imports {
        doc.detach(node);
    }
    if let Some(marker) = plan.legacy_marker {
        doc.detach(marker);
    }
    if let Some(guard) = plan.guard_target {
        doc.detach(guard);
    }

    doc.set_attribute(doc.root(), "ToolsVersion", msbuild::TARGET_TOOLS_VERSION);

    debug!(
        inserted = plan.new_references.len(),
        removed = plan.removal_count(),
        "rewrote project document"
    );
    Ok(())
}
