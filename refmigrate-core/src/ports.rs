//! Port traits abstracting the host environment away from the pipeline.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use refmigrate_types::msbuild;

pub use refmigrate_edit::{SourceControl, WriteAccessError};

/// One project discovered in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectHandle {
    /// Directory containing the project file (and, when eligible, the
    /// legacy manifest).
    pub root: Utf8PathBuf,
    pub project_file: Utf8PathBuf,
}

impl ProjectHandle {
    pub fn new(root: Utf8PathBuf, project_file: Utf8PathBuf) -> Self {
        Self { root, project_file }
    }

    /// Where this project's legacy manifest would live.
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.root.join(msbuild::MANIFEST_FILE_NAME)
    }
}

/// Workspace discovery. Yields every project handle; the coordinator
/// filters to those with a legacy manifest.
pub trait ProjectSource: Sync {
    fn projects(&self) -> anyhow::Result<Vec<ProjectHandle>>;
}

/// Host progress surface. Implementations must tolerate concurrent calls
/// from worker threads.
pub trait ProgressSink: Sync {
    fn start(&self, total: u64, label: &str);
    fn update(&self, completed: u64);
    fn finish(&self);
    fn set_status(&self, text: &str);
}

/// Timestamped text log. Best-effort by contract: implementations swallow
/// their own failures, so appending is infallible here.
pub trait LogSink: Sync {
    fn append(&self, timestamp: DateTime<Utc>, message: &str);
}
