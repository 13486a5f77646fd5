//! Graph assembly
//!
//! Provides:
//! - Node selection: filter constraints plus a rank-ordered node cap
//! - Edge pruning against the selected node set
//! - Cluster assignment (regional, topical, collaborative)
//! - Aggregate network metrics and collaboration centrality
//!
//! Assembly is pure: inputs are never mutated and identical inputs yield
//! identical nodes, edges, clusters and metrics.

mod centrality;
mod clustering;
mod graph;
mod metrics;

pub use centrality::{CentralityConfig, CentralityScorer};
pub use clustering::{dominant_category, greedy_modularity, UNCATEGORIZED};
pub use graph::CollaborationGraph;

use crate::classify::ClassifiedEdge;
use crate::snapshot::{GraphNode, GraphSnapshot, NetworkMetrics};
use chrono::Utc;
use scholarnet_common::config::EngineConfig;
use scholarnet_common::models::{ClusteringMethod, GraphFilter, ResearcherId};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

/// Builds graph snapshots from ranked nodes and classified edges
#[derive(Debug, Clone, Default)]
pub struct GraphAssembler {
    default_method: ClusteringMethod,
    centrality: CentralityScorer,
}

impl GraphAssembler {
    pub fn new(default_method: ClusteringMethod, centrality: CentralityConfig) -> Self {
        Self {
            default_method,
            centrality: CentralityScorer::new(centrality),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.clustering_method, CentralityConfig::default())
    }

    /// Clustering method applied to `filter`
    pub fn method_for(&self, filter: &GraphFilter) -> ClusteringMethod {
        filter.clustering.unwrap_or(self.default_method)
    }

    /// Nodes passing `filter`, capped at `max_nodes` by descending rank.
    ///
    /// Lower id wins rank ties. Repeated ids keep their first occurrence.
    pub fn select_nodes(&self, nodes: &[GraphNode], filter: &GraphFilter) -> Vec<GraphNode> {
        let mut seen: HashSet<ResearcherId> = HashSet::new();
        let mut selected: Vec<GraphNode> = nodes
            .iter()
            .filter(|n| filter.matches(&n.profile))
            .filter(|n| seen.insert(n.id()))
            .cloned()
            .collect();

        selected.sort_by(|a, b| b.rank.total_cmp(&a.rank).then(a.id().cmp(&b.id())));
        selected.truncate(filter.max_nodes);
        selected
    }

    /// Edges whose endpoints are both in `kept`, ordered by `(source, target)`
    pub fn prune_edges(edges: &[ClassifiedEdge], kept: &HashSet<ResearcherId>) -> Vec<ClassifiedEdge> {
        let mut pruned: Vec<ClassifiedEdge> = edges
            .iter()
            .filter(|e| kept.contains(&e.source()) && kept.contains(&e.target()))
            .cloned()
            .collect();

        pruned.sort_by_key(|e| (e.source(), e.target()));
        pruned.dedup_by_key(|e| (e.source(), e.target()));
        pruned
    }

    /// Assemble a snapshot (version 1) for `filter`
    #[instrument(skip_all, fields(candidates = nodes.len(), edges = edges.len()))]
    pub fn assemble(&self, nodes: &[GraphNode], edges: &[ClassifiedEdge], filter: &GraphFilter) -> GraphSnapshot {
        let method = self.method_for(filter);
        let mut selected = self.select_nodes(nodes, filter);

        let kept: HashSet<ResearcherId> = selected.iter().map(GraphNode::id).collect();
        let edges = Self::prune_edges(edges, &kept);
        let graph = CollaborationGraph::build(kept.iter().copied(), &edges);

        let clusters = {
            let by_id: HashMap<ResearcherId, &GraphNode> = selected.iter().map(|n| (n.id(), n)).collect();
            clustering::assign(method, &graph, &by_id)
        };

        // Cluster labels as dense indices, in graph index order
        let mut label_ids: BTreeMap<&str, usize> = BTreeMap::new();
        let labels: Vec<usize> = graph
            .ids()
            .iter()
            .map(|id| {
                let cluster = clusters.cluster_of(*id).unwrap_or(UNCATEGORIZED);
                let next = label_ids.len();
                *label_ids.entry(cluster).or_insert(next)
            })
            .collect();

        let component = graph.largest_component();
        let scores = self.centrality.compute(&graph);

        let metrics = NetworkMetrics {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            density: metrics::density(graph.node_count(), graph.edge_count()),
            average_degree: metrics::average_degree(&graph),
            average_clustering: metrics::average_clustering(
                &graph,
                &(0..graph.node_count()).collect::<Vec<_>>(),
            ),
            community_count: clusters.cluster_count(),
            modularity: metrics::modularity(&graph, &labels),
            largest_cluster_size: clusters.sizes().values().copied().max().unwrap_or(0),
            largest_component_size: component.len(),
            average_path_length: metrics::average_path_length(&graph, &component),
            small_world: metrics::small_world(&graph, &component),
            most_central: self.centrality.most_central(&graph, &scores),
        };

        for node in &mut selected {
            if let Some(i) = graph.index_of(node.id()) {
                node.centrality = scores[i];
            }
        }

        debug!(
            method = %method,
            nodes = metrics.node_count,
            edges = metrics.edge_count,
            communities = metrics.community_count,
            "Assembled graph snapshot"
        );

        GraphSnapshot {
            filter_key: filter.fingerprint(method),
            version: 1,
            created_at: Utc::now(),
            filter: filter.clone(),
            nodes: selected,
            edges,
            clusters,
            metrics,
            skipped_records: 0,
        }
    }
}
