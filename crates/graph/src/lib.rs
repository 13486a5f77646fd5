//! ScholarNet Collaboration Graph Engine
//!
//! Turns researcher profiles and publication lists into a weighted, directed
//! collaboration graph:
//! - `rank`: citation metrics -> rank score
//! - `coauthor`: shared publications -> collaboration edges
//! - `classify`: direction and strength per edge
//! - `assemble`: filtered, clustered snapshot with network metrics
//! - `sink`: where finished snapshots are published

pub mod assemble;
pub mod classify;
pub mod coauthor;
pub mod rank;
pub mod sink;
pub mod snapshot;

pub use assemble::GraphAssembler;
pub use classify::{ClassificationPolicy, ClassifiedEdge, Classifier, Direction};
pub use coauthor::{extract, CollaborationEdge, ExtractionReport};
pub use rank::{rank, MetricNormalizer};
pub use sink::{MemorySnapshotCache, RedisSnapshotSink, SnapshotSink};
pub use snapshot::{GraphNode, GraphSnapshot, NetworkMetrics};
