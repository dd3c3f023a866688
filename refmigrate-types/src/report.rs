//! Run report artifact written by the CLI after a batch.

use crate::{BatchResult, ProjectOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema identifier for [`RunReport`].
pub const RUN_REPORT_V1: &str = "refmigrate.report.v1";

/// Identity of the tool that produced a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Wall-clock bounds of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Serializable summary of one batch run: aggregate counts plus the
/// per-project outcomes, in completion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub summary: BatchResult,
    pub projects: Vec<ProjectOutcome>,
}

impl RunReport {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            schema: RUN_REPORT_V1.to_string(),
            tool,
            run: RunInfo {
                started_at: Utc::now(),
                ended_at: None,
            },
            summary: BatchResult::default(),
            projects: Vec::new(),
        }
    }

    pub fn finish(&mut self, outcomes: Vec<ProjectOutcome>) {
        self.summary = BatchResult::from_outcomes(&outcomes);
        self.projects = outcomes;
        self.run.ended_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailureDetail, PipelineStage};

    #[test]
    fn report_round_trips_through_json() {
        let mut report = RunReport::new(ToolInfo {
            name: "refmigrate".into(),
            version: Some("0.1.0".into()),
        });
        report.finish(vec![
            ProjectOutcome::success("app/app.csproj".into()),
            ProjectOutcome::failure(
                "lib/lib.csproj".into(),
                FailureDetail::new(PipelineStage::Read, "packages.config: malformed"),
            ),
        ]);

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert_eq!(parsed.schema, RUN_REPORT_V1);
        assert_eq!(parsed.summary.failed(), 1);
    }
}
