//! Researcher data model
//!
//! Types shared by the store adapter, the graph engine, and the job orchestrator.

mod filter;
mod publication;
mod region;
mod researcher;

pub use filter::{ClusteringMethod, GraphFilter, DEFAULT_MAX_NODES};
pub use publication::Publication;
pub use region::Region;
pub use researcher::{ResearcherId, ResearcherProfile};
