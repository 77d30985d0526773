//! Run reports for seed and migrate runs

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Which kind of run produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Seed,
    Migrate,
}

/// Outcome of one step as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "error")]
pub enum StepStatus {
    /// Request submitted; individual records may still have failed
    Completed,
    /// Nothing to submit
    Skipped,
    /// The org rejected the whole request
    Aborted(String),
}

/// A record the org (or the engine) refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Zero-based position of the record within its step
    pub index: usize,

    /// Source-org id, for migrated records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    pub errors: Vec<String>,
}

/// A field dropped from a migration query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedField {
    pub field: String,
    pub reason: String,
}

/// Result of one seeding step or migration object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub sobject: String,

    #[serde(flatten)]
    pub status: StepStatus,

    /// Records built (seeding) or read from the source (migration)
    pub requested: usize,

    pub succeeded: usize,

    pub failures: Vec<RecordFailure>,

    /// Non-fatal problems met while building records
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_fields: Vec<SkippedField>,

    /// Query actually sent to the source org
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl StepReport {
    pub fn new(sobject: impl Into<String>) -> Self {
        Self {
            sobject: sobject.into(),
            status: StepStatus::Completed,
            requested: 0,
            succeeded: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
            skipped_fields: Vec::new(),
            query: None,
        }
    }

    pub fn skipped(sobject: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Skipped,
            ..Self::new(sobject)
        }
    }

    pub fn aborted(sobject: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Aborted(error.into()),
            ..Self::new(sobject)
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, StepStatus::Aborted(_))
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run
    pub run_id: String,

    pub kind: RunKind,

    pub started_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn new(kind: RunKind) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            kind,
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: StepReport) {
        self.steps.push(step);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total_succeeded(&self) -> usize {
        self.steps.iter().map(|s| s.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.steps.iter().map(StepReport::failed).sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.steps.iter().map(|s| s.warnings.len()).sum()
    }

    /// Steps the org rejected outright
    pub fn aborted_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.is_aborted())
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write(&self, path: &Path) -> EngineResult<()> {
        let io_err = |source| EngineError::ReportWriteError {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_totals() {
        let mut report = RunReport::new(RunKind::Seed);
        let mut accounts = StepReport::new("Account");
        accounts.requested = 3;
        accounts.succeeded = 2;
        accounts.failures.push(RecordFailure {
            index: 1,
            source_id: None,
            errors: vec!["REQUIRED_FIELD_MISSING".into()],
        });
        accounts.warnings.push("no retained Contact records to reference".into());
        report.push(accounts);
        report.push(StepReport::skipped("Contact"));
        report.push(StepReport::aborted("Lead", "boom"));

        assert_eq!(report.run_id.len(), 8);
        assert_eq!(report.total_succeeded(), 2);
        assert_eq!(report.total_failed(), 1);
        assert_eq!(report.total_warnings(), 1);
        assert_eq!(report.aborted_steps().count(), 1);
    }

    #[test]
    fn test_write_report_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("report.json");

        let mut report = RunReport::new(RunKind::Migrate);
        report.push(StepReport::aborted("Account", "[O001] SObject not found: Account"));
        report.finish();
        report.write(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["kind"], "migrate");
        assert_eq!(json["steps"][0]["status"], "aborted");
        assert_eq!(json["steps"][0]["error"], "[O001] SObject not found: Account");
        assert!(json["finished_at"].is_string());
    }
}
