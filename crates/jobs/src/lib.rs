//! ScholarNet build jobs
//!
//! Runs collaboration-graph builds in the background:
//! - `job`: BuildJob view, status and phase labels
//! - `context`: cancellation flag, wall-clock budget, progress publishing
//! - `pipeline`: fetch, extract, classify, assemble, publish
//! - `orchestrator`: submit / status / cancel / wait / list

pub mod context;
pub mod job;
pub mod orchestrator;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use context::JobContext;
pub use job::{BuildJob, JobId, JobPhase, JobStatus, SnapshotRef};
pub use orchestrator::JobOrchestrator;
pub use pipeline::BuildPipeline;
