//! Partial-failure isolation across a multi-project batch.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use refmigrate_core::adapters::FsWriteAccess;
use refmigrate_core::{
    BatchSettings, LogSink, ProgressSink, ProjectHandle, ProjectSource, run_batch,
};
use refmigrate_edit::{SourceControl, WriteAccessError};
use std::sync::Mutex;
use tempfile::TempDir;

const PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="14.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup>
    <Reference Include="Newtonsoft.Json, Version=12.0.0.0">
      <HintPath>..\packages\Newtonsoft.Json.12.0.1\lib\net45\Newtonsoft.Json.dll</HintPath>
    </Reference>
  </ItemGroup>
  <ItemGroup>
    <None Include="packages.config" />
  </ItemGroup>
</Project>"#;

const MANIFEST: &str = r#"<packages><package id="Newtonsoft.Json" version="12.0.1" /></packages>"#;

struct StaticSource {
    handles: Vec<ProjectHandle>,
}

impl ProjectSource for StaticSource {
    fn projects(&self) -> anyhow::Result<Vec<ProjectHandle>> {
        Ok(self.handles.clone())
    }
}

/// Denies write access for paths containing the marker.
struct DenyMatching(&'static str);

impl SourceControl for DenyMatching {
    fn request_write_access(&self, path: &Utf8Path) -> Result<(), WriteAccessError> {
        if path.as_str().contains(self.0) {
            return Err(WriteAccessError {
                path: path.to_path_buf(),
                reason: "file is locked".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn start(&self, _total: u64, _label: &str) {}
    fn update(&self, _completed: u64) {}
    fn finish(&self) {}
    fn set_status(&self, _text: &str) {}
}

#[derive(Default)]
struct CollectingLog {
    lines: Mutex<Vec<String>>,
}

impl LogSink for CollectingLog {
    fn append(&self, _timestamp: DateTime<Utc>, message: &str) {
        self.lines.lock().expect("lock").push(message.to_string());
    }
}

fn seed_workspace(names: &[&str]) -> (TempDir, Vec<ProjectHandle>) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
    let handles = names
        .iter()
        .map(|name| {
            let dir = root.join(name);
            std::fs::create_dir_all(&dir).expect("project dir");
            let project_file = dir.join(format!("{name}.csproj"));
            std::fs::write(&project_file, PROJECT).expect("write project");
            std::fs::write(dir.join("packages.config"), MANIFEST).expect("write manifest");
            ProjectHandle::new(dir, project_file)
        })
        .collect();
    (temp, handles)
}

#[test]
fn one_denied_project_does_not_abort_its_siblings() {
    let (_temp, handles) = seed_workspace(&["alpha", "beta", "gamma", "delta"]);
    let source = StaticSource {
        handles: handles.clone(),
    };
    let log = CollectingLog::default();

    let outcome = run_batch(
        &BatchSettings::default(),
        &source,
        &DenyMatching("beta"),
        &SilentProgress,
        &log,
    )
    .expect("run batch");

    assert_eq!(outcome.result.total, 4);
    assert_eq!(outcome.result.succeeded, 3);
    assert!(outcome.result.any_failed);

    for handle in &handles {
        let is_beta = handle.project_file.as_str().contains("beta");
        let migrated = std::fs::read_to_string(&handle.project_file).expect("read project");
        if is_beta {
            // Untouched: original contents, manifest still present, no backups.
            assert_eq!(migrated, PROJECT);
            assert!(handle.manifest_path().exists());
            assert!(!Utf8PathBuf::from(format!("{}.bak", handle.project_file)).exists());
        } else {
            assert!(migrated.contains("PackageReference"));
            assert!(migrated.contains("ToolsVersion=\"15.0\""));
            assert!(!handle.manifest_path().exists());
            assert!(Utf8PathBuf::from(format!("{}.bak", handle.project_file)).exists());
            assert!(
                Utf8PathBuf::from(format!("{}.bak", handle.manifest_path())).exists()
            );
        }
    }

    let lines = log.lines.lock().expect("lock");
    assert!(
        lines
            .iter()
            .any(|l| l.contains("beta") && l.contains("commit"))
    );
}

#[test]
fn backups_are_byte_identical_to_originals() {
    let (_temp, handles) = seed_workspace(&["solo"]);
    let source = StaticSource {
        handles: handles.clone(),
    };

    run_batch(
        &BatchSettings::default(),
        &source,
        &FsWriteAccess,
        &SilentProgress,
        &CollectingLog::default(),
    )
    .expect("run batch");

    let handle = &handles[0];
    let project_bak =
        std::fs::read_to_string(format!("{}.bak", handle.project_file)).expect("project bak");
    let manifest_bak =
        std::fs::read_to_string(format!("{}.bak", handle.manifest_path())).expect("manifest bak");
    assert_eq!(project_bak, PROJECT);
    assert_eq!(manifest_bak, MANIFEST);
}

#[test]
fn bounded_pool_still_processes_every_project() {
    let (_temp, handles) = seed_workspace(&["p1", "p2", "p3", "p4", "p5", "p6"]);
    let source = StaticSource { handles };
    let settings = BatchSettings {
        jobs: Some(2),
        ..Default::default()
    };

    let outcome = run_batch(
        &settings,
        &source,
        &FsWriteAccess,
        &SilentProgress,
        &CollectingLog::default(),
    )
    .expect("run batch");

    assert_eq!(outcome.result.total, 6);
    assert_eq!(outcome.result.succeeded, 6);
    assert!(!outcome.result.any_failed);
}
