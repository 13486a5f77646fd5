//! Profile store adapter
//!
//! The graph engine reads researchers and publications exclusively through
//! [`ProfileStore`]. Scraping, persistence and rate limiting live behind it.

mod memory;
mod retry;

pub use memory::{Dataset, MemoryProfileStore};
pub use retry::{RetryPolicy, RetryingStore};

use crate::errors::Result;
use crate::models::{GraphFilter, Publication, ResearcherId, ResearcherProfile};
use async_trait::async_trait;
use std::sync::Arc;

/// Read interface to researcher records
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Candidate profiles for a build request.
    ///
    /// Implementations may pre-filter but must tolerate partial records
    /// (missing country, university, categories). The engine re-applies the
    /// full filter after enrichment.
    async fn fetch_profiles(&self, filter: &GraphFilter) -> Result<Vec<ResearcherProfile>>;

    /// Publications of one researcher, in the store's order
    async fn fetch_publications(&self, researcher_id: ResearcherId) -> Result<Vec<Publication>>;

    /// Name used in logs and error messages
    fn name(&self) -> &str {
        "profile-store"
    }
}

#[async_trait]
impl<S: ProfileStore + ?Sized> ProfileStore for Arc<S> {
    async fn fetch_profiles(&self, filter: &GraphFilter) -> Result<Vec<ResearcherProfile>> {
        (**self).fetch_profiles(filter).await
    }

    async fn fetch_publications(&self, researcher_id: ResearcherId) -> Result<Vec<Publication>> {
        (**self).fetch_publications(researcher_id).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
