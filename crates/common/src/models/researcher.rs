//! Researcher profile records

use super::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric researcher id; lower ids win ranking ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearcherId(pub u64);

impl fmt::Display for ResearcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResearcherId {
    fn from(id: u64) -> Self {
        ResearcherId(id)
    }
}

/// Researcher profile as delivered by the profile store.
///
/// Read-only to the graph engine; location fields may be missing and are
/// resolved during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearcherProfile {
    /// Numeric id
    pub id: ResearcherId,

    /// External profile id (e.g. academic-profile provider id)
    #[serde(default)]
    pub scholar_id: String,

    /// Display name
    pub name: String,

    /// Raw affiliation string
    #[serde(default)]
    pub affiliation: Option<String>,

    /// University resolved from the affiliation
    #[serde(default)]
    pub university: Option<String>,

    /// Country resolved from the affiliation
    #[serde(default)]
    pub country: Option<String>,

    /// Region resolved from the country
    #[serde(default)]
    pub region: Region,

    /// Total citation count
    #[serde(default)]
    pub citations: u64,

    /// h-index
    #[serde(default)]
    pub h_index: u32,

    /// i10-index
    #[serde(default)]
    pub i10_index: u32,

    /// Topical interest tags
    #[serde(default)]
    pub interests: Vec<String>,

    /// Research-category tags
    #[serde(default)]
    pub research_categories: Vec<String>,

    /// Last time the record was refreshed
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl ResearcherProfile {
    /// Create a minimal profile; remaining fields take their defaults
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ResearcherId(id),
            scholar_id: String::new(),
            name: name.into(),
            affiliation: None,
            university: None,
            country: None,
            region: Region::Other,
            citations: 0,
            h_index: 0,
            i10_index: 0,
            interests: Vec::new(),
            research_categories: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Set citation metrics
    pub fn with_metrics(mut self, citations: u64, h_index: u32, i10_index: u32) -> Self {
        self.citations = citations;
        self.h_index = h_index;
        self.i10_index = i10_index;
        self
    }

    /// Set the region
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set research categories
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.research_categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the affiliation string
    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// Whether any research category matches `category` (case-insensitive)
    pub fn has_category(&self, category: &str) -> bool {
        self.research_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_record_deserializes() {
        let json = r#"{ "id": 7, "name": "Ada Lovelace", "citations": 1200 }"#;
        let profile: ResearcherProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.id, ResearcherId(7));
        assert_eq!(profile.region, Region::Other);
        assert!(profile.country.is_none());
        assert!(profile.research_categories.is_empty());
    }

    #[test]
    fn test_has_category() {
        let profile = ResearcherProfile::new(1, "A").with_categories(["slam", "Robot_Vision"]);
        assert!(profile.has_category("SLAM"));
        assert!(profile.has_category("robot_vision"));
        assert!(!profile.has_category("manipulation"));
    }
}
