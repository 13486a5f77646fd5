//! Undirected collaboration graph over dense node indices
//!
//! Node `i` is the i-th smallest researcher id, so index order is id order.

use crate::classify::ClassifiedEdge;
use scholarnet_common::models::ResearcherId;
use std::collections::{HashMap, VecDeque};

/// Adjacency-list view of a snapshot's nodes and edges
#[derive(Debug, Clone, Default)]
pub struct CollaborationGraph {
    ids: Vec<ResearcherId>,
    index: HashMap<ResearcherId, usize>,
    /// (neighbor, weight) sorted by neighbor
    adjacency: Vec<Vec<(usize, f64)>>,
    edge_count: usize,
}

impl CollaborationGraph {
    /// Build from node ids and edges. Edges with unknown endpoints, self
    /// loops and repeated pairs are ignored. Weight is the shared-publication count.
    pub fn build(ids: impl IntoIterator<Item = ResearcherId>, edges: &[ClassifiedEdge]) -> Self {
        let mut ids: Vec<ResearcherId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let index: HashMap<ResearcherId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        let mut edge_count = 0;

        for edge in edges {
            let (Some(&u), Some(&v)) = (index.get(&edge.source()), index.get(&edge.target())) else {
                continue;
            };
            if u == v || adjacency[u].iter().any(|(n, _)| *n == v) {
                continue;
            }
            let weight = f64::from(edge.evidence.shared_publications.max(1));
            adjacency[u].push((v, weight));
            adjacency[v].push((u, weight));
            edge_count += 1;
        }

        for neighbors in &mut adjacency {
            neighbors.sort_by_key(|(n, _)| *n);
        }

        Self {
            ids,
            index,
            adjacency,
            edge_count,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn id(&self, i: usize) -> ResearcherId {
        self.ids[i]
    }

    pub fn ids(&self) -> &[ResearcherId] {
        &self.ids
    }

    pub fn index_of(&self, id: ResearcherId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[i].iter().map(|(n, _)| *n)
    }

    pub fn weighted_neighbors(&self, i: usize) -> &[(usize, f64)] {
        &self.adjacency[i]
    }

    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adjacency[u].binary_search_by_key(&v, |(n, _)| *n).is_ok()
    }

    /// Hop distances from `from`; `None` for unreachable nodes
    pub fn distances(&self, from: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.node_count()];
        let mut queue = VecDeque::new();
        dist[from] = Some(0);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let next = dist[current].map_or(0, |d| d + 1);
            for neighbor in self.neighbors(current) {
                if dist[neighbor].is_none() {
                    dist[neighbor] = Some(next);
                    queue.push_back(neighbor);
                }
            }
        }

        dist
    }

    /// Connected components, each sorted, ordered by smallest member
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.node_count()];
        let mut components = Vec::new();

        for start in 0..self.node_count() {
            if seen[start] {
                continue;
            }
            let mut component: Vec<usize> = self
                .distances(start)
                .iter()
                .enumerate()
                .filter_map(|(i, d)| d.map(|_| i))
                .collect();
            for &i in &component {
                seen[i] = true;
            }
            component.sort_unstable();
            components.push(component);
        }

        components
    }

    /// Largest component; on equal size the one holding the smallest id
    pub fn largest_component(&self) -> Vec<usize> {
        let mut best: Vec<usize> = Vec::new();
        for component in self.components() {
            if component.len() > best.len() {
                best = component;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Direction;
    use crate::coauthor::CollaborationEdge;

    fn edge(a: u64, b: u64) -> ClassifiedEdge {
        let mut evidence = CollaborationEdge::new(ResearcherId(a), ResearcherId(b));
        evidence.shared_publications = 1;
        ClassifiedEdge {
            evidence,
            direction: Direction::Peer,
            strength: 0.1,
        }
    }

    #[test]
    fn test_build_ignores_unknown_and_repeated_edges() {
        let ids = [30, 10, 20].map(ResearcherId);
        let graph = CollaborationGraph::build(ids, &[edge(10, 20), edge(10, 20), edge(20, 99)]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.ids(), &[ResearcherId(10), ResearcherId(20), ResearcherId(30)]);
        assert!(graph.has_edge(0, 1));
        assert!(!graph.has_edge(1, 2));
    }

    #[test]
    fn test_components_and_largest() {
        let ids = (1..=6).map(ResearcherId);
        let graph = CollaborationGraph::build(ids, &[edge(1, 2), edge(4, 5), edge(5, 6)]);

        assert_eq!(graph.components(), vec![vec![0, 1], vec![2], vec![3, 4, 5]]);
        assert_eq!(graph.largest_component(), vec![3, 4, 5]);
    }

    #[test]
    fn test_largest_component_tie_prefers_smallest_id() {
        let ids = (1..=4).map(ResearcherId);
        let graph = CollaborationGraph::build(ids, &[edge(3, 4), edge(1, 2)]);
        assert_eq!(graph.largest_component(), vec![0, 1]);
    }

    #[test]
    fn test_distances() {
        let ids = (1..=4).map(ResearcherId);
        let graph = CollaborationGraph::build(ids, &[edge(1, 2), edge(2, 3)]);
        assert_eq!(graph.distances(0), vec![Some(0), Some(1), Some(2), None]);
    }
}
