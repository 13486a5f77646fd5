//! Collaboration centrality
//!
//! Weighted PageRank over the undirected collaboration graph. Edge weight is
//! the shared-publication count.

use super::graph::CollaborationGraph;
use crate::snapshot::CentralResearcher;

/// PageRank configuration
#[derive(Debug, Clone)]
pub struct CentralityConfig {
    /// Damping factor (typically 0.85)
    pub damping: f64,

    /// Maximum iterations
    pub max_iterations: usize,

    /// Convergence threshold
    pub epsilon: f64,

    /// Researchers reported as most central
    pub top_k: usize,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            epsilon: 1e-6,
            top_k: 10,
        }
    }
}

/// PageRank scorer for collaboration graphs
#[derive(Debug, Clone, Default)]
pub struct CentralityScorer {
    config: CentralityConfig,
}

impl CentralityScorer {
    pub fn new(config: CentralityConfig) -> Self {
        Self { config }
    }

    /// Scores per node index, normalized so the maximum is 1
    pub fn compute(&self, graph: &CollaborationGraph) -> Vec<f64> {
        let n = graph.node_count();
        if n == 0 {
            return Vec::new();
        }

        let n_f64 = n as f64;
        let damping = self.config.damping;
        let teleport = (1.0 - damping) / n_f64;

        let strength: Vec<f64> = (0..n)
            .map(|i| graph.weighted_neighbors(i).iter().map(|(_, w)| w).sum())
            .collect();
        let mut scores = vec![1.0 / n_f64; n];

        for _ in 0..self.config.max_iterations {
            let mut max_diff: f64 = 0.0;
            let next: Vec<f64> = (0..n)
                .map(|i| {
                    let inflow: f64 = graph
                        .weighted_neighbors(i)
                        .iter()
                        .map(|&(j, w)| scores[j] * w / strength[j])
                        .sum();
                    let score = teleport + damping * inflow;
                    max_diff = max_diff.max((score - scores[i]).abs());
                    score
                })
                .collect();

            scores = next;

            if max_diff < self.config.epsilon {
                break;
            }
        }

        // Normalize to 0-1 range
        let max_score = scores.iter().copied().fold(0.0f64, f64::max);
        if max_score > 0.0 {
            for score in &mut scores {
                *score /= max_score;
            }
        }

        scores
    }

    /// Top researchers by score; ties go to the lower id
    pub fn most_central(&self, graph: &CollaborationGraph, scores: &[f64]) -> Vec<CentralResearcher> {
        let mut ranked: Vec<CentralResearcher> = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| CentralResearcher {
                id: graph.id(i),
                score,
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        ranked.truncate(self.config.top_k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifiedEdge, Direction};
    use crate::coauthor::CollaborationEdge;
    use scholarnet_common::models::ResearcherId;

    fn edge(a: u64, b: u64, shared: u32) -> ClassifiedEdge {
        let mut evidence = CollaborationEdge::new(ResearcherId(a), ResearcherId(b));
        evidence.shared_publications = shared;
        ClassifiedEdge {
            evidence,
            direction: Direction::Peer,
            strength: 0.1,
        }
    }

    #[test]
    fn test_hub_ranks_highest() {
        // Star around researcher 1
        let graph = CollaborationGraph::build(
            (1..=5).map(ResearcherId),
            &[edge(1, 2, 1), edge(1, 3, 1), edge(1, 4, 1), edge(1, 5, 1)],
        );
        let scorer = CentralityScorer::default();
        let scores = scorer.compute(&graph);

        assert_eq!(scores[0], 1.0);
        assert!(scores[1..].iter().all(|s| *s < 1.0));

        let top = scorer.most_central(&graph, &scores);
        assert_eq!(top[0].id, ResearcherId(1));
        assert_eq!(top[1].id, ResearcherId(2));
    }

    #[test]
    fn test_top_k_truncates() {
        let graph = CollaborationGraph::build((1..=15).map(ResearcherId), &[]);
        let scorer = CentralityScorer::default();
        let scores = scorer.compute(&graph);

        let top = scorer.most_central(&graph, &scores);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].id, ResearcherId(1));
    }

    #[test]
    fn test_empty_graph() {
        let scorer = CentralityScorer::default();
        assert!(scorer.compute(&CollaborationGraph::default()).is_empty());
    }
}
