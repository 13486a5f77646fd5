//! Inverted author index: normalized author name -> researcher

use scholarnet_common::models::{Publication, ResearcherId, ResearcherProfile};
use scholarnet_common::taxonomy::name_key;
use std::collections::HashMap;
use tracing::debug;

/// Resolves author strings to known researchers
#[derive(Debug, Default)]
pub struct AuthorIndex {
    by_key: HashMap<String, ResearcherId>,
}

impl AuthorIndex {
    /// Index researchers by the normalized form of their display name.
    ///
    /// When two researchers share a key the lower id keeps it.
    pub fn build(researchers: &[ResearcherProfile]) -> Self {
        let mut by_key: HashMap<String, ResearcherId> = HashMap::with_capacity(researchers.len());

        for profile in researchers {
            let key = name_key(&profile.name);
            if key.is_empty() {
                continue;
            }
            by_key
                .entry(key)
                .and_modify(|existing| {
                    if profile.id < *existing {
                        debug!(kept = %profile.id, dropped = %existing, "Ambiguous author key");
                        *existing = profile.id;
                    }
                })
                .or_insert(profile.id);
        }

        Self { by_key }
    }

    /// Researcher matching one author string
    pub fn resolve(&self, author: &str) -> Option<ResearcherId> {
        self.by_key.get(&name_key(author)).copied()
    }

    /// Known researchers on a publication with their author position.
    ///
    /// Positions count usable (non-blank) authors only. A researcher listed
    /// twice keeps its first position.
    pub fn authors_of(&self, publication: &Publication) -> Vec<(usize, ResearcherId)> {
        let mut found: Vec<(usize, ResearcherId)> = Vec::new();
        for (position, author) in publication.usable_authors().enumerate() {
            if let Some(id) = self.resolve(author) {
                if !found.iter().any(|(_, seen)| *seen == id) {
                    found.push((position, id));
                }
            }
        }
        found
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
