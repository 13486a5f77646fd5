//! Graph snapshot model
//!
//! A snapshot is immutable once published. Nodes are ordered by rank
//! (descending, lower id first on ties); edges by `(source, target)`.

use crate::classify::ClassifiedEdge;
use chrono::{DateTime, Utc};
use scholarnet_common::models::{ClusteringMethod, GraphFilter, ResearcherId, ResearcherProfile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Researcher node with its rank score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(flatten)]
    pub profile: ResearcherProfile,

    /// Rank score from citation metrics
    pub rank: f64,

    /// Collaboration centrality in [0, 1], set during assembly
    #[serde(default)]
    pub centrality: f64,
}

impl GraphNode {
    pub fn new(profile: ResearcherProfile, rank: f64) -> Self {
        Self {
            profile,
            rank,
            centrality: 0.0,
        }
    }

    pub fn id(&self) -> ResearcherId {
        self.profile.id
    }
}

/// Cluster assignment of every node under one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub method: ClusteringMethod,

    /// researcher -> cluster id
    pub clusters: BTreeMap<ResearcherId, String>,
}

impl ClusterAssignment {
    pub fn new(method: ClusteringMethod) -> Self {
        Self {
            method,
            clusters: BTreeMap::new(),
        }
    }

    pub fn cluster_of(&self, id: ResearcherId) -> Option<&str> {
        self.clusters.get(&id).map(String::as_str)
    }

    /// Members of one cluster in id order
    pub fn members(&self, cluster_id: &str) -> Vec<ResearcherId> {
        self.clusters
            .iter()
            .filter(|(_, c)| c.as_str() == cluster_id)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Cluster sizes keyed by cluster id
    pub fn sizes(&self) -> BTreeMap<&str, usize> {
        let mut sizes: BTreeMap<&str, usize> = BTreeMap::new();
        for cluster in self.clusters.values() {
            *sizes.entry(cluster.as_str()).or_default() += 1;
        }
        sizes
    }

    pub fn cluster_count(&self) -> usize {
        self.sizes().len()
    }
}

/// Researcher ranked by collaboration centrality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralResearcher {
    pub id: ResearcherId,
    pub score: f64,
}

/// Aggregate network metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub node_count: usize,
    pub edge_count: usize,

    /// `edges / (n * (n - 1) / 2)`, 0 below two nodes
    pub density: f64,

    pub average_degree: f64,

    /// Mean local clustering coefficient over all nodes
    pub average_clustering: f64,

    /// Clusters under the active method
    pub community_count: usize,

    /// Modularity of the active cluster assignment
    pub modularity: f64,

    pub largest_cluster_size: usize,

    /// Nodes in the largest connected component
    pub largest_component_size: usize,

    /// Mean shortest-path length within the largest connected component
    pub average_path_length: f64,

    /// Small-world coefficient of the largest connected component, 0 when undefined
    pub small_world: f64,

    /// Top researchers by collaboration centrality
    pub most_central: Vec<CentralResearcher>,
}

/// One fully assembled graph for a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Canonical filter fingerprint
    pub filter_key: String,

    /// Version within `filter_key`, starting at 1
    pub version: u64,

    pub created_at: DateTime<Utc>,

    pub filter: GraphFilter,

    pub nodes: Vec<GraphNode>,

    pub edges: Vec<ClassifiedEdge>,

    pub clusters: ClusterAssignment,

    pub metrics: NetworkMetrics,

    /// Malformed records absorbed while building
    #[serde(default)]
    pub skipped_records: usize,
}

impl GraphSnapshot {
    /// Same snapshot under another version number
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn with_skipped_records(mut self, skipped_records: usize) -> Self {
        self.skipped_records = skipped_records;
        self
    }

    pub fn node(&self, id: ResearcherId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn contains(&self, id: ResearcherId) -> bool {
        self.node(id).is_some()
    }

    /// Edges incident to one researcher
    pub fn edges_for(&self, id: ResearcherId) -> impl Iterator<Item = &ClassifiedEdge> {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    pub fn edges_with_min_strength(&self, min_strength: f64) -> impl Iterator<Item = &ClassifiedEdge> {
        self.edges.iter().filter(move |e| e.strength >= min_strength)
    }

    /// Nodes of one cluster, in node order
    pub fn cluster_members(&self, cluster_id: &str) -> Vec<&GraphNode> {
        self.nodes
            .iter()
            .filter(|n| self.clusters.cluster_of(n.id()) == Some(cluster_id))
            .collect()
    }

    /// Every edge endpoint is a node and every node has a cluster
    pub fn is_consistent(&self) -> bool {
        let ids: HashSet<ResearcherId> = self.nodes.iter().map(GraphNode::id).collect();
        ids.len() == self.nodes.len()
            && self
                .edges
                .iter()
                .all(|e| ids.contains(&e.source()) && ids.contains(&e.target()))
            && ids.iter().all(|id| self.clusters.cluster_of(*id).is_some())
    }
}
