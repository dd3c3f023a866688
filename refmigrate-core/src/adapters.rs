//! Filesystem-backed implementations of the port traits.

use crate::ports::{LogSink, ProgressSink, ProjectHandle, ProjectSource};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use fs_err as fs;
use refmigrate_edit::{SourceControl, WriteAccessError};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Default project-file extensions scanned by [`WalkProjectSource`].
pub const DEFAULT_PROJECT_EXTENSIONS: &[&str] = &["csproj", "vbproj", "fsproj"];

/// Recursively discovers project files under a workspace root.
#[derive(Debug, Clone)]
pub struct WalkProjectSource {
    root: Utf8PathBuf,
    extensions: Vec<String>,
}

impl WalkProjectSource {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self {
            root,
            extensions: DEFAULT_PROJECT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

impl ProjectSource for WalkProjectSource {
    fn projects(&self) -> anyhow::Result<Vec<ProjectHandle>> {
        let mut handles = Vec::new();

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.with_context(|| format!("walk {}", self.root))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                debug!(path = %entry.path().display(), "skipping non-utf8 path");
                continue;
            };
            let matches = path
                .extension()
                .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));
            if !matches {
                continue;
            }
            let Some(root) = path.parent() else {
                continue;
            };
            handles.push(ProjectHandle::new(root.to_path_buf(), path.to_path_buf()));
        }

        debug!(root = %self.root, projects = handles.len(), "discovered projects");
        Ok(handles)
    }
}

/// Filesystem stand-in for the VCS checkout capability: clears the
/// read-only attribute so the subsequent write can proceed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriteAccess;

impl SourceControl for FsWriteAccess {
    fn request_write_access(&self, path: &Utf8Path) -> Result<(), WriteAccessError> {
        let denied = |reason: String| WriteAccessError {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = fs::metadata(path).map_err(|e| denied(e.to_string()))?;
        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions).map_err(|e| denied(e.to_string()))?;
            debug!(path = %path, "cleared read-only attribute");
        }
        Ok(())
    }
}

/// Forwards log-sink appends into `tracing`. Infallible, matching the
/// sink contract that logging never fails the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn append(&self, timestamp: DateTime<Utc>, message: &str) {
        info!(target: "refmigrate::log", "{}: {}", timestamp.format("%Y-%m-%d %H:%M:%S"), message);
    }
}

/// Progress surface for headless hosts: status text and run boundaries go
/// to `tracing`, per-completion updates stay at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn start(&self, total: u64, label: &str) {
        info!(total, "{label}");
    }

    fn update(&self, completed: u64) {
        debug!(completed, "progress");
    }

    fn finish(&self) {
        debug!("progress finished");
    }

    fn set_status(&self, text: &str) {
        info!("{text}");
    }
}
