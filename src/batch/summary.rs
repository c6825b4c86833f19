use std::collections::BTreeMap;

use serde::Serialize;

use crate::{batch::job::RenderJob, foundation::error::PanelError};

/// Why a job produced no output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Rendering or writing failed (including exhausted resource retries).
    Render,
    /// The render exceeded the per-job deadline.
    Timeout,
    /// The batch was cancelled before the job started.
    Cancelled,
}

impl FailureKind {
    /// Classify a job error.
    pub fn of(err: &PanelError) -> Self {
        match err {
            PanelError::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::Render,
        }
    }
}

/// A failed job and its reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    /// The job.
    pub job: RenderJob,
    /// Failure class.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub reason: String,
}

/// Per-source success/failure counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceTally {
    /// Outputs written.
    pub succeeded: usize,
    /// Jobs without output.
    pub failed: usize,
}

/// Overall batch outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchStatus {
    /// Every job succeeded.
    Success,
    /// Some jobs failed.
    Partial,
    /// Every job failed, or there was nothing to run.
    TotalFailure,
}

impl BatchStatus {
    /// Process exit code: 0 success, 2 partial, 1 total failure.
    pub fn exit_code(self) -> i32 {
        match self {
            BatchStatus::Success => 0,
            BatchStatus::Partial => 2,
            BatchStatus::TotalFailure => 1,
        }
    }
}

/// Result of a single job, before aggregation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// Output written.
    Succeeded(RenderJob),
    /// No output.
    Failed(JobFailure),
}

/// Aggregated results of [`crate::Orchestrator::run_batch`], in job order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Jobs whose output file was written.
    pub succeeded: Vec<RenderJob>,
    /// Jobs without output.
    pub failed: Vec<JobFailure>,
    /// Counts keyed by source id.
    pub by_source: BTreeMap<String, SourceTally>,
}

impl BatchSummary {
    /// Aggregate outcomes.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = JobOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                JobOutcome::Succeeded(job) => {
                    summary
                        .by_source
                        .entry(job.source_id.clone())
                        .or_default()
                        .succeeded += 1;
                    summary.succeeded.push(job);
                }
                JobOutcome::Failed(failure) => {
                    summary
                        .by_source
                        .entry(failure.job.source_id.clone())
                        .or_default()
                        .failed += 1;
                    summary.failed.push(failure);
                }
            }
        }
        summary
    }

    /// Number of jobs.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Failures of one kind.
    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &JobFailure> {
        self.failed.iter().filter(move |f| f.kind == kind)
    }

    /// Overall status.
    pub fn status(&self) -> BatchStatus {
        if self.succeeded.is_empty() {
            BatchStatus::TotalFailure
        } else if self.failed.is_empty() {
            BatchStatus::Success
        } else {
            BatchStatus::Partial
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/summary.rs"]
mod tests;
