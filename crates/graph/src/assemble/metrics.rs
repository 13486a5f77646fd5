//! Network metrics
//!
//! Path-based metrics (average path length, small-world coefficient) are
//! computed on the largest connected component only. Undefined values are 0.

use super::graph::CollaborationGraph;

/// `edges / (n * (n - 1) / 2)`, 0 for fewer than two nodes
pub fn density(nodes: usize, edges: usize) -> f64 {
    if nodes < 2 {
        return 0.0;
    }
    let possible = (nodes as f64) * (nodes as f64 - 1.0) / 2.0;
    edges as f64 / possible
}

pub fn average_degree(graph: &CollaborationGraph) -> f64 {
    if graph.node_count() == 0 {
        return 0.0;
    }
    2.0 * graph.edge_count() as f64 / graph.node_count() as f64
}

/// Local clustering coefficient; 0 for nodes with fewer than two neighbors
pub fn local_clustering(graph: &CollaborationGraph, i: usize) -> f64 {
    let neighbors: Vec<usize> = graph.neighbors(i).collect();
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }

    let mut links = 0usize;
    for (x, &u) in neighbors.iter().enumerate() {
        for &v in &neighbors[x + 1..] {
            if graph.has_edge(u, v) {
                links += 1;
            }
        }
    }

    links as f64 / (k * (k - 1) / 2) as f64
}

/// Mean local clustering over `nodes`
pub fn average_clustering(graph: &CollaborationGraph, nodes: &[usize]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }
    nodes.iter().map(|&i| local_clustering(graph, i)).sum::<f64>() / nodes.len() as f64
}

/// Modularity of a partition given as one community label per node index
pub fn modularity(graph: &CollaborationGraph, labels: &[usize]) -> f64 {
    let m = graph.edge_count() as f64;
    if m == 0.0 {
        return 0.0;
    }

    let communities = labels.iter().copied().max().map_or(0, |c| c + 1);
    let mut internal = vec![0usize; communities];
    let mut degree = vec![0usize; communities];

    for i in 0..graph.node_count() {
        degree[labels[i]] += graph.degree(i);
        for j in graph.neighbors(i) {
            if i < j && labels[i] == labels[j] {
                internal[labels[i]] += 1;
            }
        }
    }

    internal
        .iter()
        .zip(&degree)
        .map(|(&l, &d)| l as f64 / m - (d as f64 / (2.0 * m)).powi(2))
        .sum()
}

/// Mean shortest-path length over ordered pairs of `component`
pub fn average_path_length(graph: &CollaborationGraph, component: &[usize]) -> f64 {
    let k = component.len();
    if k < 2 {
        return 0.0;
    }

    let mut total = 0usize;
    for &from in component {
        let dist = graph.distances(from);
        total += component.iter().filter_map(|&to| dist[to]).sum::<usize>();
    }

    total as f64 / (k * (k - 1)) as f64
}

/// Small-world coefficient `(C / C_rand) / (L / L_rand)` of `component`,
/// with `C_rand = k / n` and `L_rand = ln n / ln k` for mean degree `k`
pub fn small_world(graph: &CollaborationGraph, component: &[usize]) -> f64 {
    let n = component.len();
    if n < 3 {
        return 0.0;
    }

    let degree_sum: usize = component.iter().map(|&i| graph.degree(i)).sum();
    let k = degree_sum as f64 / n as f64;
    if k <= 1.0 {
        return 0.0;
    }

    let clustering = average_clustering(graph, component);
    let path_length = average_path_length(graph, component);
    if path_length == 0.0 {
        return 0.0;
    }

    let c_rand = k / n as f64;
    let l_rand = (n as f64).ln() / k.ln();
    let sigma = (clustering / c_rand) / (path_length / l_rand);

    if sigma.is_finite() {
        sigma
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifiedEdge, Direction};
    use crate::coauthor::CollaborationEdge;
    use scholarnet_common::models::ResearcherId;

    fn edge(a: u64, b: u64) -> ClassifiedEdge {
        let mut evidence = CollaborationEdge::new(ResearcherId(a), ResearcherId(b));
        evidence.shared_publications = 1;
        ClassifiedEdge {
            evidence,
            direction: Direction::Peer,
            strength: 0.1,
        }
    }

    fn two_triangles() -> CollaborationGraph {
        CollaborationGraph::build(
            (1..=6).map(ResearcherId),
            &[edge(1, 2), edge(1, 3), edge(2, 3), edge(3, 4), edge(4, 5), edge(4, 6), edge(5, 6)],
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_density() {
        assert_eq!(density(0, 0), 0.0);
        assert_eq!(density(1, 0), 0.0);
        assert!(close(density(6, 7), 7.0 / 15.0));
    }

    #[test]
    fn test_clustering() {
        let graph = two_triangles();
        assert!(close(local_clustering(&graph, 0), 1.0));
        assert!(close(local_clustering(&graph, 2), 1.0 / 3.0));

        let all: Vec<usize> = (0..6).collect();
        assert!(close(average_clustering(&graph, &all), (4.0 + 2.0 / 3.0) / 6.0));
    }

    #[test]
    fn test_modularity() {
        let graph = two_triangles();
        let q = modularity(&graph, &[0, 0, 0, 1, 1, 1]);
        assert!(close(q, 2.0 * (3.0 / 7.0 - 0.25)));

        // Single community has zero modularity
        assert!(close(modularity(&graph, &[0; 6]), 0.0));
    }

    #[test]
    fn test_paths_and_small_world() {
        let graph = two_triangles();
        let component = graph.largest_component();

        assert!(close(average_path_length(&graph, &component), 1.8));
        assert!(small_world(&graph, &component) > 1.0);
    }

    #[test]
    fn test_undefined_metrics_are_zero() {
        let path = CollaborationGraph::build((1..=3).map(ResearcherId), &[edge(1, 2), edge(2, 3)]);
        let component = path.largest_component();

        // mean degree 4/3 > 1 but no triangles
        assert_eq!(small_world(&path, &component), 0.0);

        let pair = CollaborationGraph::build((1..=2).map(ResearcherId), &[edge(1, 2)]);
        assert_eq!(small_world(&pair, &pair.largest_component()), 0.0);

        let empty = CollaborationGraph::default();
        assert_eq!(average_degree(&empty), 0.0);
        assert_eq!(average_path_length(&empty, &[]), 0.0);
        assert_eq!(modularity(&empty, &[]), 0.0);
    }
}
