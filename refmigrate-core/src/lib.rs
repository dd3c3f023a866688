//! Batch coordination for refmigrate.
//!
//! The pipeline is port-driven: workspace discovery, write-access checks,
//! progress, and logging all go through traits so the coordinator can be
//! exercised against in-memory doubles.

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{BatchOutcome, run_batch};
pub use ports::{LogSink, ProgressSink, ProjectHandle, ProjectSource, SourceControl};
pub use settings::BatchSettings;
