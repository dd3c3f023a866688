//! Pure planning layer: reads a legacy manifest and computes the structural
//! edits that migrate one project file, without touching the file system
//! beyond the manifest read.
//!
//! The split mirrors the apply side in `refmigrate-edit`: a plan is computed
//! in full against an immutable document, then applied in one pass. Never
//! mutate while matching.

mod manifest;
mod matcher;

pub use manifest::{ManifestError, read_manifest};
pub use matcher::{EditPlan, plan_edits};
