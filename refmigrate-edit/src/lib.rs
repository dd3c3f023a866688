//! Edit engine for refmigrate plans.
//!
//! Responsibilities:
//! - Apply a computed [`EditPlan`](refmigrate_domain::EditPlan) to an
//!   in-memory project document (`rewriter`).
//! - Persist one project atomically from the caller's perspective: write
//!   access, `.bak` copies, write-back, manifest deletion (`commit`).

mod commit;
mod rewriter;

pub use commit::{
    CommitError, CommitOptions, SourceControl, WriteAccessError, backup_path, commit_project,
};
pub use rewriter::{RewriteError, apply_plan};
