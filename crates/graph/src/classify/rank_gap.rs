//! Legacy policy: plain rank ratio

use super::{ClassificationPolicy, Direction};
use crate::coauthor::CollaborationEdge;
use crate::snapshot::GraphNode;

/// Labels the higher-ranked side mentor when its rank exceeds the other's by `ratio`
#[derive(Debug, Clone)]
pub struct RankGapPolicy {
    ratio: f64,
}

impl RankGapPolicy {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }
}

impl Default for RankGapPolicy {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl ClassificationPolicy for RankGapPolicy {
    fn name(&self) -> &'static str {
        "rank_gap"
    }

    fn direction(&self, _edge: &CollaborationEdge, a: &GraphNode, b: &GraphNode) -> Direction {
        if a.rank > b.rank * self.ratio {
            Direction::MentorToStudent
        } else if b.rank > a.rank * self.ratio {
            Direction::StudentToMentor
        } else {
            Direction::Peer
        }
    }
}
