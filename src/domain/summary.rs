use super::captions::{LocalCaptionFile, Outcome, Step};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub resource_id: String,
    pub filename: String,
    pub step: Step,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Aggregate of every outcome in a batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub language: String,
    pub succeeded: Vec<String>,
    pub failures: Vec<FailureRecord>,
    pub unresolvable: Vec<UnresolvedFile>,
    /// Videos never attempted because the run was cancelled
    pub skipped: Vec<String>,
}

impl BatchSummary {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success { resource_id, .. } => self.succeeded.push(resource_id),
            Outcome::Failure {
                step,
                resource_id,
                filename,
                error,
            } => self.failures.push(FailureRecord {
                resource_id,
                filename,
                step,
                error: error.to_string(),
            }),
        }
    }

    pub fn record_unresolvable(&mut self, file: &LocalCaptionFile) {
        self.unresolvable.push(UnresolvedFile {
            filename: file.filename.clone(),
            path: file.path.clone(),
        });
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when no video was attempted at all.
    pub fn nothing_to_do(&self) -> bool {
        self.succeeded.is_empty() && self.failures.is_empty() && self.skipped.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Caption sync summary ({})", self.language)?;
        writeln!(f, "  succeeded:    {}", self.success_count())?;
        writeln!(f, "  failed:       {}", self.failure_count())?;
        writeln!(f, "  unresolvable: {}", self.unresolvable.len())?;
        if !self.skipped.is_empty() {
            writeln!(f, "  skipped:      {}", self.skipped.len())?;
        }
        for failure in &self.failures {
            writeln!(
                f,
                "  FAILED {} ({}) at {}: {}",
                failure.resource_id, failure.filename, failure.step, failure.error
            )?;
        }
        for file in &self.unresolvable {
            writeln!(f, "  NO VIDEO ID in {:?}", file.filename)?;
        }
        Ok(())
    }
}
