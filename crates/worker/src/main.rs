//! ScholarNet Graph Worker
//!
//! Builds one collaboration graph snapshot:
//! 1. Loads a researcher dataset into the in-memory profile store
//! 2. Submits a build job for the given filter (or the configured default)
//! 3. Waits for the job and prints the job view and snapshot as JSON
//!
//! Usage: `graph-worker <dataset.json> [filter.json]`

use anyhow::{bail, Context};
use scholarnet_common::cache::Cache;
use scholarnet_common::config::ObservabilityConfig;
use scholarnet_common::metrics::register_metrics;
use scholarnet_common::models::GraphFilter;
use scholarnet_common::store::{MemoryProfileStore, RetryPolicy, RetryingStore};
use scholarnet_common::{AppConfig, VERSION};
use scholarnet_graph::{MemorySnapshotCache, RedisSnapshotSink, SnapshotSink};
use scholarnet_jobs::{BuildPipeline, JobOrchestrator, JobStatus};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: graph-worker <dataset.json> [filter.json]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.observability);
    info!("Starting ScholarNet Graph Worker v{}", VERSION);
    register_metrics();

    let mut args = std::env::args().skip(1);
    let dataset = args
        .next()
        .or_else(|| std::env::var("SCHOLARNET_DATASET").ok())
        .context(USAGE)?;
    let filter = match args.next() {
        Some(path) => read_filter(&path).await?,
        None => config.engine.default_filter(),
    };

    // Profile store, with caller-side retries
    let store = MemoryProfileStore::load(&dataset).await?;
    let store = Arc::new(RetryingStore::new(store, RetryPolicy::default()));

    // Result sink
    let sink: Arc<dyn SnapshotSink> = if config.cache.redis_url.is_some() {
        info!("Connecting to Redis snapshot cache...");
        let cache = Cache::connect(&config.cache).await?;
        cache.ping().await?;
        Arc::new(RedisSnapshotSink::new(cache))
    } else {
        Arc::new(MemorySnapshotCache::new(config.cache.capacity))
    };

    let pipeline = BuildPipeline::new(store, sink, &config);
    let orchestrator = JobOrchestrator::new(pipeline, &config.jobs);

    let job_id = orchestrator.submit(filter).await?;
    let job = tokio::select! {
        job = orchestrator.wait(job_id) => job?,
        _ = tokio::signal::ctrl_c() => {
            warn!(job_id = %job_id, "Interrupted, cancelling build job");
            orchestrator.cancel(job_id).await;
            orchestrator.wait(job_id).await?
        }
    };

    let snapshot = match &job.snapshot {
        Some(reference) => orchestrator.latest_snapshot(&reference.filter_key).await?,
        None => None,
    };

    let output = serde_json::json!({ "job": job, "snapshot": snapshot.as_deref() });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if job.status != JobStatus::Completed {
        error!(
            job_id = %job.id,
            status = %job.status,
            reason = job.failure_reason.as_deref().unwrap_or_default(),
            "Build did not complete"
        );
        bail!("build job {} ended as {}", job.id, job.status);
    }

    info!("Graph worker finished");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .pretty()
            .init();
    }
}

async fn read_filter(path: &str) -> anyhow::Result<GraphFilter> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read filter file {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid filter file {}", path))
}
