//! The batch coordinator: fans the per-project pipeline out across a
//! bounded worker pool and aggregates the outcomes.
//!
//! Per-project failures are converted into [`ProjectOutcome`]s at the
//! pipeline boundary; they never abort sibling projects. The only
//! batch-level error is a coordinator failure such as thread-pool
//! construction or project discovery.

use crate::ports::{LogSink, ProgressSink, ProjectHandle, ProjectSource, SourceControl};
use crate::settings::BatchSettings;
use anyhow::Context;
use chrono::Utc;
use fs_err as fs;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use refmigrate_domain::{plan_edits, read_manifest};
use refmigrate_edit::{CommitOptions, apply_plan, commit_project};
use refmigrate_types::{BatchResult, FailureDetail, PipelineStage, ProjectOutcome};
use refmigrate_xml::Document;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Everything one batch run produced.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub result: BatchResult,
    /// Per-project outcomes, in completion order.
    pub outcomes: Vec<ProjectOutcome>,
}

/// Run the migration across every eligible project in the workspace.
pub fn run_batch(
    settings: &BatchSettings,
    source: &dyn ProjectSource,
    source_control: &dyn SourceControl,
    progress: &dyn ProgressSink,
    log: &dyn LogSink,
) -> anyhow::Result<BatchOutcome> {
    let eligible: Vec<ProjectHandle> = source
        .projects()
        .context("discover workspace projects")?
        .into_iter()
        .filter(|h| h.manifest_path().exists())
        .collect();

    if eligible.is_empty() {
        let message = "No packages.config files found in the workspace.";
        progress.set_status(message);
        log.append(Utc::now(), message);
        return Ok(BatchOutcome {
            result: BatchResult::default(),
            outcomes: Vec::new(),
        });
    }

    let total = eligible.len() as u64;
    let noun = if total == 1 { "file" } else { "files" };
    progress.start(total, &format!("Migrating {total} config {noun}..."));

    let pool = ThreadPoolBuilder::new()
        .num_threads(settings.effective_jobs())
        .thread_name(|idx| format!("refmigrate-{idx}"))
        .build()
        .context("build worker pool")?;

    let completed = AtomicU64::new(0);
    let outcomes: Vec<ProjectOutcome> = pool.install(|| {
        eligible
            .par_iter()
            .map(|handle| {
                let outcome = process_project(handle, settings, source_control);
                report_outcome(&outcome, log);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                progress.update(done);
                outcome
            })
            .collect()
    });

    let result = BatchResult::from_outcomes(&outcomes);
    progress.finish();
    if result.any_failed {
        progress.set_status(&format!(
            "Operation failed for {} of {} project(s). See log output for details.",
            result.failed(),
            result.total
        ));
    } else {
        progress.set_status(&format!(
            "Operation finished. {} project(s) migrated.",
            result.succeeded
        ));
    }

    Ok(BatchOutcome { result, outcomes })
}

/// One project's pipeline: Read -> Match -> Rewrite -> Commit. Any stage
/// failure is terminal for this project and this run.
fn process_project(
    handle: &ProjectHandle,
    settings: &BatchSettings,
    source_control: &dyn SourceControl,
) -> ProjectOutcome {
    let project_path = handle.project_file.clone();
    let manifest_path = handle.manifest_path();

    let fail = |stage, message: String| {
        ProjectOutcome::failure(project_path.clone(), FailureDetail::new(stage, message))
    };

    let entries = match read_manifest(&manifest_path) {
        Ok(entries) => entries,
        Err(e) => return fail(PipelineStage::Read, e.to_string()),
    };

    let source = match fs::read_to_string(&project_path) {
        Ok(source) => source,
        Err(e) => return fail(PipelineStage::Read, e.to_string()),
    };
    let mut doc = match Document::parse(&source) {
        Ok(doc) => doc,
        Err(e) => return fail(PipelineStage::Read, format!("parse {project_path}: {e}")),
    };

    let plan = plan_edits(&doc, &entries);

    if let Err(e) = apply_plan(&mut doc, &plan) {
        return fail(PipelineStage::Rewrite, e.to_string());
    }

    if settings.dry_run {
        debug!(project = %project_path, "dry run: skipping commit");
        return ProjectOutcome::success(project_path);
    }

    let opts = CommitOptions {
        backup_suffix: settings.backup_suffix.clone(),
    };
    if let Err(e) = commit_project(&project_path, &manifest_path, &doc, source_control, &opts) {
        return fail(PipelineStage::Commit, e.to_string());
    }

    ProjectOutcome::success(project_path)
}

fn report_outcome(outcome: &ProjectOutcome, log: &dyn LogSink) {
    match &outcome.failure {
        None => log.append(
            Utc::now(),
            &format!("Migrated {}.", outcome.project_path),
        ),
        Some(detail) => {
            warn!(project = %outcome.project_path, stage = %detail.stage, "migration failed");
            log.append(
                Utc::now(),
                &format!(
                    "Failed to migrate {} at the {} stage: {}",
                    outcome.project_path, detail.stage, detail.message
                ),
            );
        }
    }
}
