//! Build job model

use chrono::{DateTime, Utc};
use scholarnet_common::errors::ErrorCode;
use scholarnet_common::models::GraphFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Build job identifier
pub type JobId = Uuid;

/// Lifecycle state: `pending -> running -> {completed | failed | cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Check if the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Queued,
    Fetching,
    Extraction,
    Classification,
    Assembly,
    Publishing,
    Completed,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Queued => "queued",
            JobPhase::Fetching => "fetching",
            JobPhase::Extraction => "extraction",
            JobPhase::Classification => "classification",
            JobPhase::Assembly => "assembly",
            JobPhase::Publishing => "publishing",
            JobPhase::Completed => "completed",
        }
    }

    /// Progress reported when the phase starts
    pub fn start_progress(&self) -> f64 {
        match self {
            JobPhase::Queued | JobPhase::Fetching => 0.0,
            JobPhase::Extraction => 0.5,
            JobPhase::Classification => 0.7,
            JobPhase::Assembly => 0.9,
            JobPhase::Publishing => 0.95,
            JobPhase::Completed => 1.0,
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the snapshot a job published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRef {
    pub filter_key: String,
    pub version: u64,
}

/// Read-only view of one build job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildJob {
    pub id: JobId,

    pub filter: GraphFilter,

    pub status: JobStatus,

    /// Fraction in [0, 1], never decreasing
    pub progress: f64,

    pub current_step: JobPhase,

    /// Candidate researchers found so far
    pub results_found: usize,

    /// Malformed records absorbed so far
    pub skipped_records: usize,

    /// Published snapshot, set on completion
    pub snapshot: Option<SnapshotRef>,

    /// Failure or cancellation reason
    pub failure_reason: Option<String>,

    pub error_code: Option<ErrorCode>,

    pub created_at: DateTime<Utc>,

    pub started_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,
}

impl BuildJob {
    /// New pending job
    pub fn new(filter: GraphFilter) -> Self {
        Self {
            id: Uuid::now_v7(),
            filter,
            status: JobStatus::Pending,
            progress: 0.0,
            current_step: JobPhase::Queued,
            results_found: 0,
            skipped_records: 0,
            snapshot: None,
            failure_reason: None,
            error_code: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Check if the job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Calculate progress percentage
    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }

    /// Raise progress; lower values are ignored
    pub(crate) fn advance(&mut self, progress: f64) {
        let progress = progress.clamp(0.0, 1.0);
        if progress > self.progress {
            self.progress = progress;
        }
    }

    /// Wall-clock duration once started
    pub fn duration_secs(&self) -> Option<f64> {
        let started = self.started_at?;
        let end = self.completed_at.unwrap_or_else(Utc::now);
        Some((end - started).num_milliseconds().max(0) as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut job = BuildJob::new(GraphFilter::default());
        job.advance(0.5);
        job.advance(0.3);
        assert_eq!(job.progress, 0.5);

        job.advance(7.0);
        assert_eq!(job.progress, 1.0);
        assert_eq!(job.progress_percent(), 100.0);
    }

    #[test]
    fn test_phase_order() {
        assert!(JobPhase::Fetching < JobPhase::Extraction);
        assert!(JobPhase::Extraction < JobPhase::Classification);
        assert!(JobPhase::Classification < JobPhase::Assembly);
        assert!(JobPhase::Assembly.start_progress() < JobPhase::Completed.start_progress());
    }

    #[test]
    fn test_view_serializes_labels() {
        let job = BuildJob::new(GraphFilter::default());
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["current_step"], "queued");
    }
}
