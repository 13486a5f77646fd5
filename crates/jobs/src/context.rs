//! Per-job execution context
//!
//! Provides:
//! - Published job state (`watch` channel), read concurrently by status callers
//! - Cooperative cancellation flag
//! - Wall-clock budget checked at phase checkpoints and at store and sink I/O

use crate::job::{BuildJob, JobPhase};
use scholarnet_common::errors::{AppError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

/// Shared handle to one job: its state and its cancellation flag
#[derive(Debug)]
pub(crate) struct JobHandle {
    pub(crate) state: watch::Sender<BuildJob>,
    cancelled: AtomicBool,
}

impl JobHandle {
    pub(crate) fn new(job: BuildJob) -> Self {
        Self {
            state: watch::Sender::new(job),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Current view of the job
    pub(crate) fn view(&self) -> BuildJob {
        self.state.borrow().clone()
    }

    pub(crate) fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Execution context handed to the build pipeline
#[derive(Debug, Clone)]
pub struct JobContext {
    handle: Arc<JobHandle>,
    budget: Duration,
    deadline: Instant,
}

impl JobContext {
    /// Context for a job that is not owned by an orchestrator
    pub fn new(job: BuildJob, budget: Duration) -> Self {
        Self::with_handle(Arc::new(JobHandle::new(job)), budget)
    }

    /// The budget starts now
    pub(crate) fn with_handle(handle: Arc<JobHandle>, budget: Duration) -> Self {
        Self {
            handle,
            budget,
            deadline: Instant::now() + budget,
        }
    }

    /// Snapshot of the job state
    pub fn view(&self) -> BuildJob {
        self.handle.view()
    }

    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.handle.request_cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Phase boundary: observe cancellation first, then the deadline, then
    /// advance `current_step` and progress.
    pub fn checkpoint(&self, phase: JobPhase) -> Result<()> {
        if self.is_cancelled() {
            return Err(AppError::JobCancelled {
                phase: phase.to_string(),
            });
        }

        if Instant::now() >= self.deadline {
            return Err(self.timeout_error(phase));
        }

        debug!(phase = %phase, "Entering phase");
        self.handle.state.send_modify(|job| {
            job.current_step = phase;
            job.advance(phase.start_progress());
        });
        Ok(())
    }

    /// Run store or sink I/O, failing with a timeout once the deadline passes
    pub async fn bounded<T, F>(&self, phase: JobPhase, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(phase)),
        }
    }

    /// Raise progress within the current phase
    pub fn report_progress(&self, progress: f64) {
        self.handle.state.send_modify(|job| job.advance(progress));
    }

    pub fn set_results_found(&self, count: usize) {
        self.handle.state.send_modify(|job| job.results_found = count);
    }

    pub fn add_skipped(&self, count: usize) {
        if count > 0 {
            self.handle.state.send_modify(|job| job.skipped_records += count);
        }
    }

    fn timeout_error(&self, phase: JobPhase) -> AppError {
        AppError::JobTimeout {
            budget_secs: self.budget.as_secs(),
            phase: phase.to_string(),
        }
    }
}
