//! Build pipeline
//!
//! One instance serves every job of an orchestrator. A run is strictly
//! sequential: fetching, extraction, classification, assembly, publishing.
//! Cancellation and the wall-clock budget are checked before each phase and
//! before publishing; nothing reaches the sink unless every phase succeeded.
//! The sink assigns the snapshot version when it publishes.

use crate::context::JobContext;
use crate::job::JobPhase;
use futures::stream::{self, StreamExt};
use scholarnet_common::config::AppConfig;
use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::metrics::{record_skipped, record_snapshot, PhaseTimer};
use scholarnet_common::models::{GraphFilter, Publication, ResearcherProfile};
use scholarnet_common::store::ProfileStore;
use scholarnet_common::taxonomy::{deduplicate_profiles, enrich_profile, CategoryTaxonomy};
use scholarnet_graph::{
    extract, Classifier, GraphAssembler, GraphNode, GraphSnapshot, MetricNormalizer, SnapshotSink,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// Progress reported inside the fetching phase
const PROFILES_FETCHED: f64 = 0.1;
const FETCHING_DONE: f64 = 0.4;

/// Stateless build pipeline shared by all jobs
pub struct BuildPipeline {
    store: Arc<dyn ProfileStore>,
    sink: Arc<dyn SnapshotSink>,
    normalizer: MetricNormalizer,
    classifier: Classifier,
    assembler: GraphAssembler,
    taxonomy: CategoryTaxonomy,
    fetch_concurrency: usize,
}

impl BuildPipeline {
    pub fn new(store: Arc<dyn ProfileStore>, sink: Arc<dyn SnapshotSink>, config: &AppConfig) -> Self {
        Self {
            store,
            sink,
            normalizer: MetricNormalizer::new(config.engine.rank_weights),
            classifier: Classifier::from_config(&config.engine),
            assembler: GraphAssembler::from_config(&config.engine),
            taxonomy: config.taxonomy.clone(),
            fetch_concurrency: config.jobs.fetch_concurrency.max(1),
        }
    }

    /// Replace the configured classifier
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn sink(&self) -> &Arc<dyn SnapshotSink> {
        &self.sink
    }

    /// Execute one build. Returns the published snapshot.
    #[instrument(skip_all, fields(store = self.store.name()))]
    pub async fn run(&self, ctx: &JobContext) -> Result<Arc<GraphSnapshot>> {
        let filter = ctx.view().filter;

        // Fetching
        ctx.checkpoint(JobPhase::Fetching)?;
        let timer = PhaseTimer::start("fetching");

        let profiles = ctx
            .bounded(JobPhase::Fetching, self.store.fetch_profiles(&filter))
            .await?;
        let fetched = profiles.len();
        // Categories come from each profile's own interests only; the filter's
        // keywords are matched against them, never merged into them.
        let profiles = deduplicate_profiles(
            profiles
                .into_iter()
                .map(|p| enrich_profile(p, &self.taxonomy))
                .collect(),
        );

        let ranked: Vec<GraphNode> = profiles
            .into_iter()
            .map(|p| {
                let rank = self.normalizer.score_profile(&p);
                GraphNode::new(p, rank)
            })
            .collect();
        let nodes = self.assembler.select_nodes(&ranked, &filter);

        ctx.set_results_found(nodes.len());
        ctx.report_progress(PROFILES_FETCHED);
        debug!(fetched, candidates = nodes.len(), "Selected candidate researchers");

        let (publications, skipped_profiles) = self.fetch_publications(ctx, &nodes).await?;
        ctx.add_skipped(skipped_profiles);
        record_skipped("profile", skipped_profiles);
        timer.finish();

        // Extraction, classification and assembly are CPU-bound
        let snapshot = {
            let ctx = ctx.clone();
            let classifier = self.classifier.clone();
            let assembler = self.assembler.clone();
            tokio::task::spawn_blocking(move || {
                build_graph(&ctx, &classifier, &assembler, &nodes, &publications, &filter)
            })
            .await
            .map_err(|e| AppError::Internal {
                message: format!("graph build task failed: {}", e),
            })??
        };
        let skipped = snapshot.skipped_records;

        // Publishing
        ctx.checkpoint(JobPhase::Publishing)?;
        let timer = PhaseTimer::start("publishing");
        let snapshot = ctx
            .bounded(JobPhase::Publishing, self.sink.publish(snapshot))
            .await?;
        record_snapshot(snapshot.nodes.len(), snapshot.edges.len());
        timer.finish();

        info!(
            filter_key = %snapshot.filter_key,
            version = snapshot.version,
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            skipped,
            "Published graph snapshot"
        );

        Ok(snapshot)
    }

    /// Publication lists for `nodes`, in node order.
    ///
    /// A malformed researcher record is skipped and counted; any other store
    /// error aborts the build.
    async fn fetch_publications(
        &self,
        ctx: &JobContext,
        nodes: &[GraphNode],
    ) -> Result<(Vec<Vec<Publication>>, usize)> {
        let store = &self.store;
        let total = nodes.len().max(1) as f64;

        let mut results = stream::iter(nodes.iter().map(GraphNode::id))
            .map(move |id| async move {
                let fetched = ctx
                    .bounded(JobPhase::Fetching, store.fetch_publications(id))
                    .await;
                (id, fetched)
            })
            .buffered(self.fetch_concurrency);

        let mut publications = Vec::with_capacity(nodes.len());
        let mut skipped = 0;
        let mut done = 0usize;

        while let Some((id, fetched)) = results.next().await {
            match fetched {
                Ok(list) => publications.push(list),
                Err(e) if e.is_record_level() => {
                    warn!(researcher_id = %id, error = %e, "Skipping malformed researcher record");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }

            done += 1;
            ctx.report_progress(
                PROFILES_FETCHED + (FETCHING_DONE - PROFILES_FETCHED) * done as f64 / total,
            );
        }

        Ok((publications, skipped))
    }
}

/// Extraction, classification and assembly for one job.
///
/// `skipped_records` on the result counts researchers skipped while fetching
/// (already on the job) plus publications skipped during extraction.
fn build_graph(
    ctx: &JobContext,
    classifier: &Classifier,
    assembler: &GraphAssembler,
    nodes: &[GraphNode],
    publications: &[Vec<Publication>],
    filter: &GraphFilter,
) -> Result<GraphSnapshot> {
    // Extraction
    ctx.checkpoint(JobPhase::Extraction)?;
    let timer = PhaseTimer::start("extraction");
    let researchers: Vec<ResearcherProfile> = nodes.iter().map(|n| n.profile.clone()).collect();
    let report = extract(&researchers, publications.iter().flatten());
    ctx.add_skipped(report.skipped_records);
    record_skipped("publication", report.skipped_records);
    timer.finish();

    // Classification
    ctx.checkpoint(JobPhase::Classification)?;
    let timer = PhaseTimer::start("classification");
    let by_id: HashMap<_, _> = nodes.iter().map(|n| (n.id(), n.clone())).collect();
    let edges = classifier.classify_all(&report.edges, &by_id);
    timer.finish();

    // Assembly
    ctx.checkpoint(JobPhase::Assembly)?;
    let timer = PhaseTimer::start("assembly");
    let snapshot = assembler
        .assemble(nodes, &edges, filter)
        .with_skipped_records(ctx.view().skipped_records);
    timer.finish();

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::BuildJob;
    use crate::testing::{sample_store, FailingStore};
    use scholarnet_common::errors::{AppError, ErrorCode};
    use scholarnet_common::models::{GraphFilter, ResearcherId};
    use scholarnet_graph::{Direction, MemorySnapshotCache};
    use std::time::Duration;

    fn pipeline(store: Arc<dyn ProfileStore>, sink: Arc<MemorySnapshotCache>) -> BuildPipeline {
        BuildPipeline::new(store, sink, &AppConfig::default())
    }

    fn context(filter: GraphFilter) -> JobContext {
        JobContext::new(BuildJob::new(filter), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_full_build() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let pipeline = pipeline(Arc::new(sample_store()), sink.clone());
        let ctx = context(GraphFilter::default());

        let snapshot = pipeline.run(&ctx).await.unwrap();

        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.edges.len(), 3);
        assert_eq!(snapshot.skipped_records, 1);
        assert!(snapshot.is_consistent());

        let mentor_edge = snapshot
            .edges
            .iter()
            .find(|e| (e.source(), e.target()) == (ResearcherId(1), ResearcherId(2)))
            .unwrap();
        assert_eq!(mentor_edge.evidence.shared_publications, 3);
        assert_eq!(mentor_edge.direction, Direction::MentorToStudent);
        assert!((mentor_edge.strength - 0.3).abs() < 1e-12);

        let job = ctx.view();
        assert_eq!(job.current_step, JobPhase::Publishing);
        assert_eq!(job.results_found, 3);
        assert_eq!(job.skipped_records, 1);

        let latest = sink.get_latest(&snapshot.filter_key).await.unwrap().unwrap();
        assert_eq!(latest.version, 1);
    }

    #[tokio::test]
    async fn test_versions_increase_per_filter_key() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let pipeline = pipeline(Arc::new(sample_store()), sink.clone());

        let first = pipeline.run(&context(GraphFilter::default())).await.unwrap();
        let second = pipeline.run(&context(GraphFilter::default())).await.unwrap();
        let other = pipeline
            .run(&context(GraphFilter::default().with_max_nodes(2)))
            .await
            .unwrap();

        assert_eq!(first.filter_key, second.filter_key);
        assert_eq!(second.version, 2);
        assert_ne!(other.filter_key, first.filter_key);
        assert_eq!(other.version, 1);
        assert_eq!(other.nodes.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_publishes_nothing() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let pipeline = pipeline(Arc::new(sample_store()), sink.clone());
        let ctx = context(GraphFilter::default());
        ctx.cancel();

        let err = pipeline.run(&ctx).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::JobCancelled);
        assert!(sink.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_failure_aborts() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let pipeline = pipeline(Arc::new(FailingStore::unreachable()), sink.clone());

        let err = pipeline.run(&context(GraphFilter::default())).await.unwrap_err();
        assert!(matches!(err, AppError::DataSource { .. }));
        assert!(sink.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_researcher_is_skipped() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let store = FailingStore::malformed_publications(sample_store(), ResearcherId(3));
        let pipeline = pipeline(Arc::new(store), sink);

        let snapshot = pipeline.run(&context(GraphFilter::default())).await.unwrap();

        // researcher 3's own list is lost, the shared paper still arrives via 1 and 2
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.edges.len(), 3);
        assert_eq!(snapshot.skipped_records, 2);
    }

    #[tokio::test]
    async fn test_filter_applies_after_enrichment() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let pipeline = pipeline(Arc::new(sample_store()), sink);

        // only researcher 3 lists a SLAM interest; the category is derived on fetch
        let filter = GraphFilter::default().with_categories(["slam"]);
        let snapshot = pipeline.run(&context(filter)).await.unwrap();

        let ids: Vec<u64> = snapshot.nodes.iter().map(|n| n.id().0).collect();
        assert_eq!(ids, vec![3]);
        assert!(snapshot.edges.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_filter_matches_interests() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let pipeline = pipeline(Arc::new(sample_store()), sink);

        let filter = GraphFilter::default().with_keywords(["slam"]);
        let snapshot = pipeline.run(&context(filter)).await.unwrap();

        let ids: Vec<u64> = snapshot.nodes.iter().map(|n| n.id().0).collect();
        assert_eq!(ids, vec![3]);
    }

    #[tokio::test]
    async fn test_keyword_filter_without_match_is_empty() {
        let sink = Arc::new(MemorySnapshotCache::new(8));
        let pipeline = pipeline(Arc::new(sample_store()), sink);

        let filter = GraphFilter::default().with_keywords(["underwater"]);
        let ctx = context(filter);
        let snapshot = pipeline.run(&ctx).await.unwrap();

        assert!(snapshot.nodes.is_empty());
        assert!(snapshot.edges.is_empty());
        assert_eq!(ctx.view().results_found, 0);
    }

    #[tokio::test]
    async fn test_stalled_sink_hits_budget() {
        struct StalledSink;

        #[async_trait::async_trait]
        impl SnapshotSink for StalledSink {
            async fn publish(&self, _snapshot: GraphSnapshot) -> Result<Arc<GraphSnapshot>> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Err(AppError::Internal {
                    message: "unreachable".into(),
                })
            }

            async fn get_latest(&self, _filter_key: &str) -> Result<Option<Arc<GraphSnapshot>>> {
                Ok(None)
            }
        }

        let pipeline = BuildPipeline::new(
            Arc::new(sample_store()),
            Arc::new(StalledSink),
            &AppConfig::default(),
        );
        let ctx = JobContext::new(BuildJob::new(GraphFilter::default()), Duration::from_millis(200));

        let err = pipeline.run(&ctx).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::JobTimeout);
        assert!(err.to_string().contains("publishing"));
    }
}
