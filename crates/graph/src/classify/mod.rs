//! Relationship classification
//!
//! Provides:
//! - `Direction` labels and `ClassifiedEdge`
//! - `ClassificationPolicy`: swappable direction heuristics
//! - `Classifier`: applies a policy plus the strength score to extracted edges
//!
//! Direction is read from `source` to `target`, where `source` is the lower
//! researcher id of the pair.

mod heuristic;
mod rank_gap;

pub use heuristic::HeuristicPolicy;
pub use rank_gap::RankGapPolicy;

use crate::coauthor::CollaborationEdge;
use crate::snapshot::GraphNode;
use scholarnet_common::config::{ClassifierKind, EngineConfig};
use scholarnet_common::models::ResearcherId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Inferred relationship direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Source is the mentor, target the student
    MentorToStudent,
    /// Source is the student, target the mentor
    StudentToMentor,
    /// No decisive signal
    Peer,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::MentorToStudent => "mentor_to_student",
            Direction::StudentToMentor => "student_to_mentor",
            Direction::Peer => "peer",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaboration edge annotated with direction and strength
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEdge {
    #[serde(flatten)]
    pub evidence: CollaborationEdge,

    pub direction: Direction,

    /// Normalized shared-publication count in [0, 1]
    pub strength: f64,
}

impl ClassifiedEdge {
    pub fn source(&self) -> ResearcherId {
        self.evidence.a
    }

    pub fn target(&self) -> ResearcherId {
        self.evidence.b
    }

    /// Whether `id` is an endpoint
    pub fn touches(&self, id: ResearcherId) -> bool {
        self.evidence.contains(id)
    }

    /// Mentor side, if the edge is directed
    pub fn mentor(&self) -> Option<ResearcherId> {
        match self.direction {
            Direction::MentorToStudent => Some(self.source()),
            Direction::StudentToMentor => Some(self.target()),
            Direction::Peer => None,
        }
    }

    /// Student side, if the edge is directed
    pub fn student(&self) -> Option<ResearcherId> {
        match self.direction {
            Direction::MentorToStudent => Some(self.target()),
            Direction::StudentToMentor => Some(self.source()),
            Direction::Peer => None,
        }
    }
}

/// Direction heuristic.
///
/// `a` is always the edge's `a` endpoint and `b` its `b` endpoint. Every call
/// must return a label; ambiguity resolves to `Peer`.
pub trait ClassificationPolicy: Send + Sync {
    /// Policy identifier, recorded in logs
    fn name(&self) -> &'static str;

    fn direction(&self, edge: &CollaborationEdge, a: &GraphNode, b: &GraphNode) -> Direction;
}

/// Build the policy selected by configuration
pub fn policy_from_config(config: &EngineConfig) -> Arc<dyn ClassificationPolicy> {
    match config.classifier {
        ClassifierKind::HeuristicV1 => Arc::new(HeuristicPolicy::from_config(config)),
        ClassifierKind::RankGap => Arc::new(RankGapPolicy::new(config.rank_gap_ratio)),
    }
}

/// Applies a policy and the strength score to extracted edges
#[derive(Clone)]
pub struct Classifier {
    policy: Arc<dyn ClassificationPolicy>,
    strength_saturation: u32,
}

impl Classifier {
    pub fn new(policy: Arc<dyn ClassificationPolicy>, strength_saturation: u32) -> Self {
        Self {
            policy,
            strength_saturation: strength_saturation.max(1),
        }
    }

    /// Classifier for the configured policy and saturation
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(policy_from_config(config), config.strength_saturation)
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// `min(1, shared / saturation)`
    pub fn strength(&self, shared_publications: u32) -> f64 {
        (f64::from(shared_publications) / f64::from(self.strength_saturation)).min(1.0)
    }

    /// Classify one edge. The two nodes may be given in either order.
    pub fn classify(&self, edge: &CollaborationEdge, x: &GraphNode, y: &GraphNode) -> ClassifiedEdge {
        let (a, b) = if x.id() == edge.a { (x, y) } else { (y, x) };

        ClassifiedEdge {
            evidence: edge.clone(),
            direction: self.policy.direction(edge, a, b),
            strength: self.strength(edge.shared_publications),
        }
    }

    /// Classify every edge whose endpoints are both known, preserving edge order
    pub fn classify_all(
        &self,
        edges: &[CollaborationEdge],
        nodes: &HashMap<ResearcherId, GraphNode>,
    ) -> Vec<ClassifiedEdge> {
        let classified: Vec<ClassifiedEdge> = edges
            .iter()
            .filter_map(|edge| {
                let a = nodes.get(&edge.a)?;
                let b = nodes.get(&edge.b)?;
                Some(self.classify(edge, a, b))
            })
            .collect();

        debug!(
            policy = self.policy.name(),
            edges = classified.len(),
            "Classified collaboration edges"
        );

        classified
    }
}
