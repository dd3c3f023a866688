//! Shared DTOs (schemas-as-code) for the refmigrate workspace.
//!
//! # Design constraints
//! - Outcome and report types are serialized into the run artifact.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod report;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// MSBuild-side constants shared by the matcher, rewriter, and adapters.
pub mod msbuild {
    /// File name of the legacy per-project package manifest.
    pub const MANIFEST_FILE_NAME: &str = "packages.config";

    /// Name of the build target that guards against missing package restores.
    pub const GUARD_TARGET_NAME: &str = "EnsureNuGetPackageBuildImports";

    /// `ToolsVersion` written to migrated project files.
    pub const TARGET_TOOLS_VERSION: &str = "15.0";

    /// Suffix appended to pre-migration backup copies.
    pub const BACKUP_SUFFIX: &str = ".bak";

    /// Default namespace of MSBuild project files.
    pub const PROJECT_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";
}

/// One `id`/`version` pair read from a legacy manifest.
///
/// Identity is the `id`, compared case-insensitively; ordering is the
/// manifest's document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub id: String,
    pub version: String,
}

impl PackageEntry {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Case-insensitive id comparison used for reference matching.
    pub fn id_matches(&self, other: &str) -> bool {
        self.id.eq_ignore_ascii_case(other)
    }
}

/// Pipeline stage at which a project's migration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the manifest or loading the project file.
    Read,
    /// Computing the edit plan.
    Match,
    /// Applying the plan to the in-memory document.
    Rewrite,
    /// Backup, write-back, and manifest deletion.
    Commit,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineStage::Read => "read",
            PipelineStage::Match => "match",
            PipelineStage::Rewrite => "rewrite",
            PipelineStage::Commit => "commit",
        };
        f.write_str(s)
    }
}

/// Failure detail carried by a [`ProjectOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub stage: PipelineStage,
    pub message: String,
}

impl FailureDetail {
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Per-project result of one batch run. Transient: produced by the pipeline,
/// consumed by the coordinator's aggregation and the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOutcome {
    pub project_path: Utf8PathBuf,
    pub failure: Option<FailureDetail>,
}

impl ProjectOutcome {
    pub fn success(project_path: Utf8PathBuf) -> Self {
        Self {
            project_path,
            failure: None,
        }
    }

    pub fn failure(project_path: Utf8PathBuf, detail: FailureDetail) -> Self {
        Self {
            project_path,
            failure: Some(detail),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: u64,
    pub succeeded: u64,
    pub any_failed: bool,
}

impl BatchResult {
    /// Aggregate per-project outcomes into a batch result.
    pub fn from_outcomes(outcomes: &[ProjectOutcome]) -> Self {
        let total = outcomes.len() as u64;
        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count() as u64;
        Self {
            total,
            succeeded,
            any_failed: succeeded < total,
        }
    }

    pub fn failed(&self) -> u64 {
        self.total - self.succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_matches_is_case_insensitive() {
        let entry = PackageEntry::new("Newtonsoft.Json", "12.0.1");
        assert!(entry.id_matches("newtonsoft.json"));
        assert!(entry.id_matches("NEWTONSOFT.JSON"));
        assert!(!entry.id_matches("Newtonsoft.Json.Bson"));
    }

    #[test]
    fn batch_result_aggregates_outcomes() {
        let outcomes = vec![
            ProjectOutcome::success("a/a.csproj".into()),
            ProjectOutcome::failure(
                "b/b.csproj".into(),
                FailureDetail::new(PipelineStage::Commit, "write access denied"),
            ),
            ProjectOutcome::success("c/c.csproj".into()),
        ];

        let result = BatchResult::from_outcomes(&outcomes);
        assert_eq!(result.total, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed(), 1);
        assert!(result.any_failed);
    }

    #[test]
    fn batch_result_empty_run_has_no_failures() {
        let result = BatchResult::from_outcomes(&[]);
        assert_eq!(result.total, 0);
        assert!(!result.any_failed);
    }

    #[test]
    fn pipeline_stage_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineStage::Rewrite).unwrap();
        assert_eq!(json, "\"rewrite\"");
    }
}
