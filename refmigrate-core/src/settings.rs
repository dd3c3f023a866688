//! Clap-free settings for the batch pipeline.

use refmigrate_types::msbuild;

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Worker bound; `None` means host-reported available parallelism.
    pub jobs: Option<usize>,

    /// Plan and rewrite in memory without committing anything to disk.
    pub dry_run: bool,

    /// Suffix for the pre-migration backup copies.
    pub backup_suffix: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            jobs: None,
            dry_run: false,
            backup_suffix: msbuild::BACKUP_SUFFIX.to_string(),
        }
    }
}

impl BatchSettings {
    /// Resolved worker count, never zero.
    pub fn effective_jobs(&self) -> usize {
        match self.jobs {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}
