//! In-memory profile store, loadable from a JSON dataset

use super::ProfileStore;
use crate::errors::{AppError, Result};
use crate::models::{GraphFilter, Publication, ResearcherId, ResearcherProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Serialized dataset: profiles plus publications keyed by researcher id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub researchers: Vec<ResearcherProfile>,

    #[serde(default)]
    pub publications: BTreeMap<ResearcherId, Vec<Publication>>,
}

/// Profile store backed by process memory
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<BTreeMap<ResearcherId, ResearcherProfile>>,
    publications: RwLock<BTreeMap<ResearcherId, Vec<Publication>>>,
}

impl MemoryProfileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a dataset
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            profiles: RwLock::new(dataset.researchers.into_iter().map(|p| (p.id, p)).collect()),
            publications: RwLock::new(dataset.publications),
        }
    }

    /// Load a JSON dataset file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::data_source("dataset", format!("Failed to read {}: {}", path.display(), e))
        })?;
        let dataset: Dataset = serde_json::from_str(&raw)?;

        info!(
            path = %path.display(),
            researchers = dataset.researchers.len(),
            "Loaded researcher dataset"
        );

        Ok(Self::from_dataset(dataset))
    }

    /// Insert or replace a profile
    pub async fn upsert_profile(&self, profile: ResearcherProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    /// Replace the publication list of a researcher
    pub async fn set_publications(&self, researcher_id: ResearcherId, publications: Vec<Publication>) {
        self.publications.write().await.insert(researcher_id, publications);
    }

    /// Number of stored profiles
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    /// Applies only the citation floor: region and categories may still be
    /// unresolved at this point.
    async fn fetch_profiles(&self, filter: &GraphFilter) -> Result<Vec<ResearcherProfile>> {
        let profiles: Vec<ResearcherProfile> = self
            .profiles
            .read()
            .await
            .values()
            .filter(|p| p.citations >= filter.min_citations)
            .cloned()
            .collect();

        debug!(count = profiles.len(), "Fetched profiles from memory store");
        Ok(profiles)
    }

    async fn fetch_publications(&self, researcher_id: ResearcherId) -> Result<Vec<Publication>> {
        Ok(self
            .publications
            .read()
            .await
            .get(&researcher_id)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dataset_roundtrip_through_store() {
        let json = r#"{
            "researchers": [
                { "id": 2, "name": "B", "citations": 10 },
                { "id": 1, "name": "A", "citations": 5000 }
            ],
            "publications": {
                "1": [ { "title": "Joint", "year": 2019, "authors": ["A", "B"] } ]
            }
        }"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        let store = MemoryProfileStore::from_dataset(dataset);

        let all = store.fetch_profiles(&GraphFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![1, 2]);

        let floor = GraphFilter::default().with_min_citations(100);
        let filtered = store.fetch_profiles(&floor).await.unwrap();
        assert_eq!(filtered.len(), 1);

        let pubs = store.fetch_publications(ResearcherId(1)).await.unwrap();
        assert_eq!(pubs.len(), 1);
        assert!(store.fetch_publications(ResearcherId(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert() {
        let store = MemoryProfileStore::new();
        assert!(store.is_empty().await);

        store.upsert_profile(ResearcherProfile::new(3, "C")).await;
        store
            .set_publications(ResearcherId(3), vec![Publication::new("P", None, ["C"])])
            .await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.fetch_publications(ResearcherId(3)).await.unwrap().len(), 1);
    }
}
