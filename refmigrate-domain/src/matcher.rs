//! Reference matcher: computes the [`EditPlan`] for one project.

use refmigrate_types::{PackageEntry, msbuild};
use refmigrate_xml::{Document, NodeId};
use std::collections::BTreeSet;
use tracing::debug;

/// The pure output of matching one manifest against one project document.
///
/// Computed once, applied once by `refmigrate-edit`; never mutated after
/// creation. Node sets are ordered so plans are reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditPlan {
    /// New `PackageReference` contents, in manifest order.
    pub new_references: Vec<PackageEntry>,
    pub obsolete_references: BTreeSet<NodeId>,
    pub obsolete_errors: BTreeSet<NodeId>,
    pub obsolete_imports: BTreeSet<NodeId>,
    /// The `None Include="packages.config"` inclusion marker, if present.
    pub legacy_marker: Option<NodeId>,
    /// The restore guard target, present only when every one of its `Error`
    /// descendants is already planned for removal.
    pub guard_target: Option<NodeId>,
}

impl EditPlan {
    /// Total number of existing nodes the plan removes.
    pub fn removal_count(&self) -> usize {
        self.obsolete_references.len()
            + self.obsolete_errors.len()
            + self.obsolete_imports.len()
            + usize::from(self.legacy_marker.is_some())
            + usize::from(self.guard_target.is_some())
    }
}

/// Match manifest entries against a project document.
///
/// Side-effect free: the document is not mutated, and planning twice over
/// the same inputs yields the same plan. An entry with no matching node is
/// not an error; it still contributes a new reference.
pub fn plan_edits(doc: &Document, entries: &[PackageEntry]) -> EditPlan {
    let descendants = doc.descendants(doc.root());

    let mut references = Vec::new();
    let mut errors = Vec::new();
    let mut imports = Vec::new();
    let mut nones = Vec::new();
    let mut targets = Vec::new();
    for &node in &descendants {
        match doc.local_name(node) {
            "Reference" => references.push(node),
            "Error" => errors.push(node),
            "Import" => imports.push(node),
            "None" => nones.push(node),
            "Target" => targets.push(node),
            _ => {}
        }
    }

    let mut obsolete_references = BTreeSet::new();
    let mut obsolete_errors = BTreeSet::new();
    let mut obsolete_imports = BTreeSet::new();

    for entry in entries {
        for &node in &references {
            // First comma-separated segment of the assembly name, compared
            // case-insensitively.
            if let Some(include) = doc.attribute(node, "Include") {
                let prefix = include.split(',').next().unwrap_or(include);
                if entry.id_matches(prefix) {
                    obsolete_references.insert(node);
                }
            }
            // Independently: the id embedded in a HintPath or similar.
            if doc.subtree_text_contains(node, &entry.id) {
                obsolete_references.insert(node);
            }
        }

        for &node in &errors {
            if doc
                .attribute(node, "Condition")
                .is_some_and(|c| c.contains(&entry.id))
            {
                obsolete_errors.insert(node);
            }
        }

        for &node in &imports {
            if doc
                .attribute(node, "Project")
                .is_some_and(|p| p.contains(&entry.id))
            {
                obsolete_imports.insert(node);
            }
        }
    }

    let legacy_marker = nones.iter().copied().find(|&node| {
        doc.attribute(node, "Include") == Some(msbuild::MANIFEST_FILE_NAME)
    });

    // The guard target is removable only when the planned Error removals
    // would leave it with zero Error descendants.
    let guard_target = targets
        .iter()
        .copied()
        .find(|&node| doc.attribute(node, "Name") == Some(msbuild::GUARD_TARGET_NAME))
        .filter(|&node| {
            doc.descendants(node)
                .into_iter()
                .filter(|&d| doc.local_name(d) == "Error")
                .all(|d| obsolete_errors.contains(&d))
        });

    let plan = EditPlan {
        new_references: entries.to_vec(),
        obsolete_references,
        obsolete_errors,
        obsolete_imports,
        legacy_marker,
        guard_target,
    };
    debug!(
        new = plan.new_references.len(),
        removals = plan.removal_count(),
        "planned edits"
    );
    plan
}
