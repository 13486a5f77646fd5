//! Job orchestrator
//!
//! Provides:
//! - `submit` / `status` / `cancel` / `wait` / `list` over build jobs
//! - A concurrency limit shared by all jobs
//! - A wall-clock budget per job, starting when the job begins running
//! - Retention of finished jobs for status queries
//!
//! Job state is written only by the task that owns the job and published
//! through a `watch` channel; readers always see a consistent view.

use crate::context::{JobContext, JobHandle};
use crate::job::{BuildJob, JobId, JobPhase, JobStatus, SnapshotRef};
use crate::pipeline::BuildPipeline;
use chrono::Utc;
use scholarnet_common::config::JobsConfig;
use scholarnet_common::errors::{AppError, ErrorCode, Result};
use scholarnet_common::metrics::record_job;
use scholarnet_common::models::GraphFilter;
use scholarnet_graph::GraphSnapshot;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tracing::{error, info, warn};
use validator::Validate;

#[derive(Default)]
struct JobRegistry {
    jobs: HashMap<JobId, Arc<JobHandle>>,
    /// Creation order
    order: VecDeque<JobId>,
}

impl JobRegistry {
    fn insert(&mut self, id: JobId, handle: Arc<JobHandle>) {
        self.jobs.insert(id, handle);
        self.order.push_back(id);
    }

    /// Drop the oldest finished jobs until at most `retain` jobs remain.
    /// Unfinished jobs are never evicted.
    fn evict(&mut self, retain: usize) {
        while self.jobs.len() > retain {
            let oldest_terminal = self
                .order
                .iter()
                .position(|id| self.jobs.get(id).is_some_and(|h| h.view().is_terminal()));

            match oldest_terminal.and_then(|pos| self.order.remove(pos)) {
                Some(id) => {
                    self.jobs.remove(&id);
                }
                None => break,
            }
        }
    }
}

/// Runs build jobs in the background and exposes their status
pub struct JobOrchestrator {
    pipeline: Arc<BuildPipeline>,
    registry: Arc<RwLock<JobRegistry>>,
    permits: Arc<Semaphore>,
    budget: Duration,
    retained_jobs: usize,
}

impl JobOrchestrator {
    pub fn new(pipeline: BuildPipeline, config: &JobsConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            registry: Arc::new(RwLock::new(JobRegistry::default())),
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
            budget: config.timeout(),
            retained_jobs: config.retained_jobs.max(1),
        }
    }

    /// Override the per-job wall-clock budget
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Queue a build for `filter` and return its id immediately
    pub async fn submit(&self, filter: GraphFilter) -> Result<JobId> {
        filter.validate()?;

        let job = BuildJob::new(filter);
        let job_id = job.id;
        let handle = Arc::new(JobHandle::new(job));

        {
            let mut registry = self.registry.write().await;
            registry.insert(job_id, handle.clone());
            registry.evict(self.retained_jobs);
        }

        info!(job_id = %job_id, "Build job submitted");

        let pipeline = self.pipeline.clone();
        let permits = self.permits.clone();
        let budget = self.budget;
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "Job scheduler closed");
                    finish(&handle, Err(AppError::Internal { message: e.to_string() }));
                    return;
                }
            };

            // A job cancelled while pending never starts
            let started = handle.state.send_if_modified(|job| {
                if job.status != JobStatus::Pending {
                    return false;
                }
                job.status = JobStatus::Running;
                job.current_step = JobPhase::Fetching;
                job.started_at = Some(Utc::now());
                true
            });
            if !started {
                return;
            }

            info!(job_id = %job_id, "Build job started");
            let ctx = JobContext::with_handle(handle.clone(), budget);

            // A panicking build must still reach a terminal state
            let build = tokio::spawn(async move { pipeline.run(&ctx).await });
            let outcome = match build.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(job_id = %job_id, error = %e, "Build task aborted");
                    Err(AppError::Internal {
                        message: format!("build task aborted: {}", e),
                    })
                }
            };
            finish(&handle, outcome);
        });

        Ok(job_id)
    }

    /// Read-only view of a job
    pub async fn status(&self, job_id: JobId) -> Result<BuildJob> {
        Ok(self.handle(job_id).await?.view())
    }

    /// Request cooperative cancellation.
    ///
    /// Returns `false` for unknown or already finished jobs. A pending job is
    /// cancelled immediately; a running job stops at its next checkpoint.
    pub async fn cancel(&self, job_id: JobId) -> bool {
        let Ok(handle) = self.handle(job_id).await else {
            return false;
        };

        if handle.view().is_terminal() {
            return false;
        }
        handle.request_cancel();

        let was_pending = handle.state.send_if_modified(|job| {
            if job.status != JobStatus::Pending {
                return false;
            }
            job.status = JobStatus::Cancelled;
            job.failure_reason = Some("cancelled before start".to_string());
            job.error_code = Some(ErrorCode::JobCancelled);
            job.completed_at = Some(Utc::now());
            true
        });

        if was_pending {
            record_job(JobStatus::Cancelled.as_str(), 0.0);
        }
        info!(job_id = %job_id, was_pending, "Cancellation requested");
        true
    }

    /// Resolve once the job reaches a terminal state
    pub async fn wait(&self, job_id: JobId) -> Result<BuildJob> {
        let handle = self.handle(job_id).await?;
        let mut updates = handle.state.subscribe();
        let terminal = updates
            .wait_for(BuildJob::is_terminal)
            .await
            .map_err(|e| AppError::Internal {
                message: format!("job {} state closed: {}", job_id, e),
            })?;
        Ok(BuildJob::clone(&terminal))
    }

    /// Views of all retained jobs, oldest first
    pub async fn list(&self) -> Vec<BuildJob> {
        let registry = self.registry.read().await;
        registry
            .order
            .iter()
            .filter_map(|id| registry.jobs.get(id))
            .map(|h| h.view())
            .collect()
    }

    /// Latest published snapshot for a filter key
    pub async fn latest_snapshot(&self, filter_key: &str) -> Result<Option<Arc<GraphSnapshot>>> {
        self.pipeline.sink().get_latest(filter_key).await
    }

    async fn handle(&self, job_id: JobId) -> Result<Arc<JobHandle>> {
        self.registry
            .read()
            .await
            .jobs
            .get(&job_id)
            .cloned()
            .ok_or_else(|| AppError::JobNotFound {
                id: job_id.to_string(),
            })
    }
}

/// Move a job to its terminal state
fn finish(handle: &JobHandle, outcome: Result<Arc<GraphSnapshot>>) {
    handle.state.send_modify(|job| {
        job.completed_at = Some(Utc::now());
        match &outcome {
            Ok(snapshot) => {
                job.status = JobStatus::Completed;
                job.current_step = JobPhase::Completed;
                job.advance(1.0);
                job.snapshot = Some(SnapshotRef {
                    filter_key: snapshot.filter_key.clone(),
                    version: snapshot.version,
                });
            }
            Err(e) => {
                job.status = match e {
                    AppError::JobCancelled { .. } => JobStatus::Cancelled,
                    _ => JobStatus::Failed,
                };
                job.failure_reason = Some(e.to_string());
                job.error_code = Some(e.code());
            }
        }
    });

    let job = handle.view();
    let duration = job.duration_secs().unwrap_or_default();
    record_job(job.status.as_str(), duration);

    match job.status {
        JobStatus::Completed => info!(
            job_id = %job.id,
            duration_secs = duration,
            skipped_records = job.skipped_records,
            "Build job completed"
        ),
        JobStatus::Cancelled => info!(job_id = %job.id, "Build job cancelled"),
        _ => warn!(
            job_id = %job.id,
            reason = job.failure_reason.as_deref().unwrap_or_default(),
            "Build job failed"
        ),
    }
}
