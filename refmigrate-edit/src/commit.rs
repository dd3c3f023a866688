//! Backup and commit for one project.
//!
//! All-or-nothing from the caller's perspective up to the write-back: a
//! write-access or backup failure leaves both files untouched. After the
//! project file has been rewritten, a manifest-deletion failure is reported
//! but not rolled back; the `.bak` copies are the recovery path.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use refmigrate_types::msbuild;
use refmigrate_xml::{Document, XmlError};
use thiserror::Error;
use tracing::debug;

/// Write-access request denied by the source-control capability.
#[derive(Debug, Clone, Error)]
#[error("write access denied for {path}: {reason}")]
pub struct WriteAccessError {
    pub path: Utf8PathBuf,
    pub reason: String,
}

/// Per-file write-access capability, invoked before any mutation.
///
/// The filesystem adapter clears the read-only attribute; a VCS-backed
/// implementation would check the file out.
pub trait SourceControl: Sync {
    fn request_write_access(&self, path: &Utf8Path) -> Result<(), WriteAccessError>;
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    WriteAccess(#[from] WriteAccessError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize project: {0}")]
    Serialize(#[from] XmlError),
}

#[derive(Debug, Clone)]
pub struct CommitOptions {
    pub backup_suffix: String,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            backup_suffix: msbuild::BACKUP_SUFFIX.to_string(),
        }
    }
}

/// Sibling backup path: `<path><suffix>`.
pub fn backup_path(path: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}{suffix}"))
}

/// Persist a rewritten project:
///
/// 1. request write access for the project file and the manifest;
/// 2. copy both to backup siblings, overwriting prior backups;
/// 3. write the serialized document over the project file;
/// 4. delete the manifest.
pub fn commit_project(
    project_path: &Utf8Path,
    manifest_path: &Utf8Path,
    doc: &Document,
    source_control: &dyn SourceControl,
    opts: &CommitOptions,
) -> Result<(), CommitError> {
    source_control.request_write_access(project_path)?;
    source_control.request_write_access(manifest_path)?;

    let project_bak = backup_path(project_path, &opts.backup_suffix);
    fs::copy(project_path, &project_bak).map_err(|e| CommitError::Io {
        context: format!("back up {project_path}"),
        source: e,
    })?;
    let manifest_bak = backup_path(manifest_path, &opts.backup_suffix);
    fs::copy(manifest_path, &manifest_bak).map_err(|e| CommitError::Io {
        context: format!("back up {manifest_path}"),
        source: e,
    })?;

    let xml = doc.to_xml_string()?;
    fs::write(project_path, xml).map_err(|e| CommitError::Io {
        context: format!("write {project_path}"),
        source: e,
    })?;

    fs::remove_file(manifest_path).map_err(|e| CommitError::Io {
        context: format!("delete {manifest_path}"),
        source: e,
    })?;

    debug!(project = %project_path, "committed migrated project");
    Ok(())
}
