use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use fs_err as fs;
use refmigrate_core::adapters::{FsWriteAccess, TracingLogSink, TracingProgress, WalkProjectSource};
use refmigrate_core::{run_batch, BatchSettings};
use refmigrate_types::report::{RunReport, ToolInfo};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "refmigrate",
    version,
    about = "Batch migration of packages.config manifests to inline PackageReference items."
)]
struct Cli {
    /// Workspace root to scan for project files (default: current directory).
    #[arg(long, default_value = ".")]
    workspace_root: Utf8PathBuf,

    /// Number of worker threads (default: available parallelism).
    #[arg(long)]
    jobs: Option<usize>,

    /// Plan and rewrite in memory, but write nothing to disk.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Project file extensions to treat as migratable (repeatable).
    #[arg(long = "extension")]
    extensions: Vec<String>,

    /// Suffix appended to backup copies of modified files.
    #[arg(long, default_value = ".bak")]
    backup_suffix: String,

    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut source = WalkProjectSource::new(cli.workspace_root.clone());
    if !cli.extensions.is_empty() {
        source = source.with_extensions(cli.extensions.clone());
    }
    let settings = BatchSettings {
        jobs: cli.jobs,
        dry_run: cli.dry_run,
        backup_suffix: cli.backup_suffix.clone(),
    };

    let mut report = RunReport::new(tool_info());
    let outcome = run_batch(
        &settings,
        &source,
        &FsWriteAccess,
        &TracingProgress,
        &TracingLogSink,
    )
    .with_context(|| format!("migrate workspace {}", cli.workspace_root))?;

    if let Some(report_path) = &cli.report {
        report.finish(outcome.outcomes.clone());
        let json = serde_json::to_string_pretty(&report).context("serialize run report")?;
        fs::write(report_path, json).with_context(|| format!("write {}", report_path))?;
        info!(path = %report_path, "wrote run report");
    }

    if outcome.result.any_failed {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::from(0))
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
