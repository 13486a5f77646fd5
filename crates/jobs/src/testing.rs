//! Fixtures shared by the pipeline and orchestrator tests

use async_trait::async_trait;
use scholarnet_common::errors::{AppError, Result};
use scholarnet_common::models::{GraphFilter, Publication, Region, ResearcherId, ResearcherProfile};
use scholarnet_common::store::{Dataset, MemoryProfileStore, ProfileStore};
use std::time::Duration;

fn profile(id: u64, name: &str, citations: u64, h_index: u32, interest: &str) -> ResearcherProfile {
    let mut p = ResearcherProfile::new(id, name)
        .with_metrics(citations, h_index, h_index)
        .with_region(Region::Europe);
    p.interests = vec![interest.to_string()];
    p
}

/// Three researchers: 1 and 2 share three papers, all three share one.
/// Researcher 2 also lists a paper without authors.
pub(crate) fn sample_dataset() -> Dataset {
    let engines = Publication::new("Analytical Engines", Some(2019), ["Ada Lovelace", "Grace Hopper"]);
    let differences = Publication::new("Difference Engines", Some(2020), ["Grace Hopper", "Ada Lovelace"]);
    let notes = Publication::new(
        "Notes",
        Some(2021),
        ["Grace Hopper", "Alan Turing", "Ada Lovelace"],
    );
    let lost = Publication::new("Lost Manuscript", Some(2018), Vec::<String>::new());

    Dataset {
        researchers: vec![
            profile(1, "Ada Lovelace", 20000, 40, "Compilers"),
            profile(2, "Grace Hopper", 500, 8, "Programming languages"),
            profile(3, "Alan Turing", 3000, 20, "Visual SLAM"),
        ],
        publications: [
            (ResearcherId(1), vec![engines.clone(), differences.clone(), notes.clone()]),
            (ResearcherId(2), vec![engines, differences, lost]),
            (ResearcherId(3), vec![notes]),
        ]
        .into_iter()
        .collect(),
    }
}

pub(crate) fn sample_store() -> MemoryProfileStore {
    MemoryProfileStore::from_dataset(sample_dataset())
}

enum Fault {
    Unreachable,
    Malformed(ResearcherId),
    Slow(Duration),
    Panic,
}

/// Store wrapper injecting failures
pub(crate) struct FailingStore {
    inner: MemoryProfileStore,
    fault: Fault,
}

impl FailingStore {
    /// Every profile fetch fails with a data source error
    pub(crate) fn unreachable() -> Self {
        Self {
            inner: MemoryProfileStore::new(),
            fault: Fault::Unreachable,
        }
    }

    /// Publications of `id` come back as a malformed record
    pub(crate) fn malformed_publications(inner: MemoryProfileStore, id: ResearcherId) -> Self {
        Self {
            inner,
            fault: Fault::Malformed(id),
        }
    }

    /// Profile fetches panic
    pub(crate) fn panicking() -> Self {
        Self {
            inner: MemoryProfileStore::new(),
            fault: Fault::Panic,
        }
    }

    /// Profile fetches stall for `delay`
    pub(crate) fn slow(inner: MemoryProfileStore, delay: Duration) -> Self {
        Self {
            inner,
            fault: Fault::Slow(delay),
        }
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn fetch_profiles(&self, filter: &GraphFilter) -> Result<Vec<ResearcherProfile>> {
        match self.fault {
            Fault::Unreachable => Err(AppError::data_source("test", "connection refused")),
            Fault::Slow(delay) => {
                tokio::time::sleep(delay).await;
                self.inner.fetch_profiles(filter).await
            }
            Fault::Malformed(_) => self.inner.fetch_profiles(filter).await,
            Fault::Panic => panic!("profile store crashed"),
        }
    }

    async fn fetch_publications(&self, researcher_id: ResearcherId) -> Result<Vec<Publication>> {
        match self.fault {
            Fault::Malformed(id) if id == researcher_id => Err(AppError::malformed(
                "researcher",
                researcher_id.to_string(),
                "unparseable publication list",
            )),
            _ => self.inner.fetch_publications(researcher_id).await,
        }
    }

    fn name(&self) -> &str {
        "failing-store"
    }
}
