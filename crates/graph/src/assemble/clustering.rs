//! Cluster assignment strategies
//!
//! - regional: region label
//! - topical: dominant research category, `uncategorized` when none
//! - collaborative: greedy modularity communities (Clauset-Newman-Moore)
//!
//! Community detection is seed-free. Gains are compared in exact integer
//! arithmetic and ties go to the smallest community pair.

use super::graph::CollaborationGraph;
use crate::snapshot::{ClusterAssignment, GraphNode};
use scholarnet_common::models::{ClusteringMethod, ResearcherId};
use std::collections::{BTreeMap, HashMap};

/// Topical cluster for nodes without categories
pub const UNCATEGORIZED: &str = "uncategorized";

/// Assign every node of `graph` to a cluster. `nodes` must cover the graph's ids.
pub fn assign(
    method: ClusteringMethod,
    graph: &CollaborationGraph,
    nodes: &HashMap<ResearcherId, &GraphNode>,
) -> ClusterAssignment {
    let mut assignment = ClusterAssignment::new(method);

    match method {
        ClusteringMethod::Regional => {
            for id in graph.ids() {
                if let Some(node) = nodes.get(id) {
                    assignment
                        .clusters
                        .insert(*id, node.profile.region.label().to_string());
                }
            }
        }
        ClusteringMethod::Topical => {
            for id in graph.ids() {
                if let Some(node) = nodes.get(id) {
                    assignment
                        .clusters
                        .insert(*id, dominant_category(&node.profile.research_categories));
                }
            }
        }
        ClusteringMethod::Collaborative => {
            let communities = greedy_modularity(graph);
            for (i, community) in communities.iter().enumerate() {
                assignment.clusters.insert(graph.id(i), format!("c{}", community));
            }
        }
    }

    assignment
}

/// Most frequent category (case-insensitive), ties to the lexically smallest
pub fn dominant_category(categories: &[String]) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for category in categories {
        let tag = category.trim().to_lowercase();
        if !tag.is_empty() {
            *counts.entry(tag).or_default() += 1;
        }
    }

    let mut best: Option<(&String, usize)> = None;
    for (tag, &count) in &counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((tag, count));
        }
    }

    best.map_or_else(|| UNCATEGORIZED.to_string(), |(tag, _)| tag.clone())
}

/// Community number per node index, numbered 0.. by smallest member.
///
/// Starts from singletons and repeatedly merges the adjacent pair with the
/// largest modularity gain until no merge improves modularity.
pub fn greedy_modularity(graph: &CollaborationGraph) -> Vec<usize> {
    let n = graph.node_count();
    let mut representative: Vec<usize> = (0..n).collect();

    let m = graph.edge_count() as i128;
    if m > 0 {
        // links[c][d]: edges between communities c and d (both directions stored)
        let mut links: BTreeMap<usize, BTreeMap<usize, i128>> = BTreeMap::new();
        let mut degree: Vec<i128> = Vec::with_capacity(n);
        for i in 0..n {
            degree.push(graph.degree(i) as i128);
            links.insert(i, graph.neighbors(i).map(|j| (j, 1)).collect());
        }

        while let Some((c, d)) = best_merge(&links, &degree, m) {
            merge(&mut links, c, d);
            degree[c] += degree[d];
            for r in representative.iter_mut() {
                if *r == d {
                    *r = c;
                }
            }
        }
    }

    // Representatives are smallest member indices; renumber densely
    let mut numbering: BTreeMap<usize, usize> = BTreeMap::new();
    for &r in &representative {
        let next = numbering.len();
        numbering.entry(r).or_insert(next);
    }
    representative.iter().map(|r| numbering[r]).collect()
}

/// Pair `(c, d)`, `c < d`, with the largest positive gain.
///
/// Gain scaled by `2m^2`: `2m * l_cd - d_c * d_d`.
fn best_merge(
    links: &BTreeMap<usize, BTreeMap<usize, i128>>,
    degree: &[i128],
    m: i128,
) -> Option<(usize, usize)> {
    let mut best: Option<(i128, usize, usize)> = None;

    for (&c, neighbors) in links {
        for (&d, &l_cd) in neighbors.range(c + 1..) {
            let gain = 2 * m * l_cd - degree[c] * degree[d];
            if best.map_or(true, |(g, _, _)| gain > g) {
                best = Some((gain, c, d));
            }
        }
    }

    best.filter(|(gain, _, _)| *gain > 0).map(|(_, c, d)| (c, d))
}

/// Fold community `d` into `c`
fn merge(links: &mut BTreeMap<usize, BTreeMap<usize, i128>>, c: usize, d: usize) {
    let moved = links.remove(&d).unwrap_or_default();

    for (k, count) in moved {
        if k == c {
            continue;
        }
        if let Some(row) = links.get_mut(&c) {
            *row.entry(k).or_insert(0) += count;
        }
        if let Some(row) = links.get_mut(&k) {
            row.remove(&d);
            *row.entry(c).or_insert(0) += count;
        }
    }

    if let Some(row) = links.get_mut(&c) {
        row.remove(&d);
    }
}
