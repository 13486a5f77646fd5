//! Citation-gap / authorship-position heuristic

use super::{ClassificationPolicy, Direction};
use crate::coauthor::CollaborationEdge;
use crate::snapshot::GraphNode;
use scholarnet_common::config::EngineConfig;

/// Priority-ordered heuristic: citation gap, then authorship position, then peer
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    /// Citation ratio that counts as a gap
    pub citation_gap_threshold: f64,
    /// First-author share marking the student side
    pub first_author_majority: f64,
    /// Last-author share marking the mentor side
    pub senior_author_majority: f64,
    /// Shared publications needed before positions are considered
    pub min_position_evidence: u32,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl HeuristicPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            citation_gap_threshold: config.citation_gap_threshold,
            first_author_majority: config.first_author_majority,
            senior_author_majority: config.senior_author_majority,
            min_position_evidence: config.min_position_evidence,
        }
    }

    /// Mentor side by citation gap: `Some(true)` when `a` is the mentor
    fn citation_gap(&self, a: &GraphNode, b: &GraphNode) -> Option<bool> {
        let ca = a.profile.citations as f64;
        let cb = b.profile.citations as f64;

        if ca > cb * self.citation_gap_threshold && a.rank > b.rank {
            Some(true)
        } else if cb > ca * self.citation_gap_threshold && b.rank > a.rank {
            Some(false)
        } else {
            None
        }
    }

    /// Mentor side by authorship position: `Some(true)` when `a` is the mentor
    fn authorship_position(&self, edge: &CollaborationEdge) -> Option<bool> {
        let shared = edge.shared_publications;
        if shared == 0 || shared < self.min_position_evidence {
            return None;
        }

        let share = |count: u32| f64::from(count) / f64::from(shared);
        let a_leads = share(edge.a_first_author) > self.first_author_majority;
        let b_leads = share(edge.b_first_author) > self.first_author_majority;
        let a_senior = share(edge.a_last_author) > self.senior_author_majority;
        let b_senior = share(edge.b_last_author) > self.senior_author_majority;

        match (a_leads && b_senior, b_leads && a_senior) {
            (true, false) => Some(false),
            (false, true) => Some(true),
            _ => None,
        }
    }
}

impl ClassificationPolicy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic_v1"
    }

    fn direction(&self, edge: &CollaborationEdge, a: &GraphNode, b: &GraphNode) -> Direction {
        match self
            .citation_gap(a, b)
            .or_else(|| self.authorship_position(edge))
        {
            Some(true) => Direction::MentorToStudent,
            Some(false) => Direction::StudentToMentor,
            None => Direction::Peer,
        }
    }
}
