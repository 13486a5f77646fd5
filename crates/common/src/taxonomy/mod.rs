//! Research taxonomy and profile enrichment
//!
//! Provides:
//! - Research-category keyword table and interest categorisation
//! - Affiliation parsing into university / country / region
//! - Name normalisation and profile de-duplication

mod location;
mod names;

pub use location::{normalize_country, resolve_location};
pub use names::{format_name, name_key};

use crate::models::{Region, ResearcherProfile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Research-category table: category id -> matching keywords
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTaxonomy {
    categories: BTreeMap<String, Vec<String>>,
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("general_robotics", &["robotics", "autonomous systems", "robot control"]),
            ("slam", &["slam", "simultaneous localization and mapping", "visual slam", "lidar slam"]),
            ("robot_vision", &["computer vision", "robot vision", "visual perception", "object detection"]),
            ("aerial_robotics", &["unmanned aerial vehicles", "drone", "quadcopter", "uav", "aerial robotics"]),
            ("marine_robotics", &["underwater robotics", "marine robotics", "auv", "autonomous underwater vehicle"]),
            ("space_robotics", &["space robotics", "planetary rovers", "satellite robotics"]),
            ("field_robotics", &["field robotics", "outdoor robotics", "agricultural robotics"]),
            ("path_planning", &["path planning", "motion planning", "trajectory planning", "navigation"]),
            ("human_robot_interaction", &["human robot interaction", "hri", "social robotics"]),
            ("swarm_robotics", &["swarm robotics", "multi-robot systems", "collective intelligence"]),
            ("medical_robotics", &["medical robotics", "surgical robotics", "rehabilitation robotics"]),
            ("manipulation", &["robot manipulation", "grasping", "dexterous manipulation"]),
        ];

        Self {
            categories: table
                .iter()
                .map(|(k, kws)| (k.to_string(), kws.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }
}

impl CategoryTaxonomy {
    /// Build from an explicit table
    pub fn new(categories: BTreeMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    /// Whether `category` is a known category id
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Categories whose keywords appear in any of `interests`.
    ///
    /// Returned in lexical order of category id.
    pub fn categorize(&self, interests: &[String]) -> Vec<String> {
        let text = interests
            .iter()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        self.categories
            .iter()
            .filter(|(_, kws)| kws.iter().any(|kw| text.contains(&kw.to_lowercase())))
            .map(|(category, _)| category.clone())
            .collect()
    }
}

/// Fill in location and category fields a profile is missing.
///
/// Existing country/region/category values are kept. Categories derived from
/// the profile's own interests are merged in without duplicates.
pub fn enrich_profile(mut profile: ResearcherProfile, taxonomy: &CategoryTaxonomy) -> ResearcherProfile {
    profile.name = format_name(&profile.name);

    if profile.country.is_none() || profile.university.is_none() {
        if let Some(affiliation) = profile.affiliation.as_deref() {
            let (university, country) = resolve_location(affiliation);
            if profile.university.is_none() {
                profile.university = university;
            }
            if profile.country.is_none() {
                profile.country = country;
            }
        }
    }

    if profile.region == Region::Other {
        profile.region = Region::from_country(profile.country.as_deref());
    }

    for category in taxonomy.categorize(&profile.interests) {
        if !profile.has_category(&category) {
            profile.research_categories.push(category);
        }
    }

    profile
}

/// Drop duplicate profiles by scholar id, then by normalised name. First occurrence wins.
pub fn deduplicate_profiles(profiles: Vec<ResearcherProfile>) -> Vec<ResearcherProfile> {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let before = profiles.len();

    let unique: Vec<ResearcherProfile> = profiles
        .into_iter()
        .filter(|p| {
            let scholar_id = p.scholar_id.trim();
            if !scholar_id.is_empty() && seen_ids.contains(scholar_id) {
                return false;
            }
            let key = name_key(&p.name);
            if seen_names.contains(&key) {
                return false;
            }
            if !scholar_id.is_empty() {
                seen_ids.insert(scholar_id.to_string());
            }
            seen_names.insert(key);
            true
        })
        .collect();

    if unique.len() < before {
        debug!(dropped = before - unique.len(), "Dropped duplicate researcher profiles");
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        let taxonomy = CategoryTaxonomy::default();
        let interests = vec!["Visual SLAM".to_string(), "Grasping".to_string()];
        let categories = taxonomy.categorize(&interests);

        assert_eq!(categories, vec!["manipulation".to_string(), "slam".to_string()]);
    }

    #[test]
    fn test_categorize_matches_substrings() {
        let taxonomy = CategoryTaxonomy::default();
        let categories = taxonomy.categorize(&["Quadcopter swarms".to_string()]);
        assert_eq!(categories, vec!["aerial_robotics".to_string()]);
    }

    #[test]
    fn test_enrich_fills_missing_location() {
        let taxonomy = CategoryTaxonomy::default();
        let mut profile = ResearcherProfile::new(1, "hiro  tanaka")
            .with_affiliation("University of Tokyo, Tokyo, Japan");
        profile.interests = vec!["Motion Planning".into()];

        let enriched = enrich_profile(profile, &taxonomy);

        assert_eq!(enriched.name, "Hiro Tanaka");
        assert_eq!(enriched.university.as_deref(), Some("University of Tokyo"));
        assert_eq!(enriched.country.as_deref(), Some("Japan"));
        assert_eq!(enriched.region, Region::Japan);
        assert!(enriched.has_category("path_planning"));
    }

    #[test]
    fn test_enrich_keeps_existing_values() {
        let taxonomy = CategoryTaxonomy::default();
        let mut profile = ResearcherProfile::new(2, "A B")
            .with_affiliation("MIT, Cambridge, USA")
            .with_region(Region::Europe)
            .with_categories(["slam"]);
        profile.country = Some("France".into());
        profile.interests = vec!["SLAM".into()];

        let enriched = enrich_profile(profile, &taxonomy);

        assert_eq!(enriched.country.as_deref(), Some("France"));
        assert_eq!(enriched.region, Region::Europe);
        assert_eq!(enriched.research_categories, vec!["slam".to_string()]);
    }

    #[test]
    fn test_enrich_without_affiliation() {
        let enriched = enrich_profile(ResearcherProfile::new(3, "X"), &CategoryTaxonomy::default());
        assert_eq!(enriched.region, Region::Other);
        assert!(enriched.country.is_none());
    }

    #[test]
    fn test_deduplicate() {
        let mut a = ResearcherProfile::new(1, "Jane Doe");
        a.scholar_id = "abc".into();
        let mut b = ResearcherProfile::new(2, "Someone Else");
        b.scholar_id = "abc".into();
        let c = ResearcherProfile::new(3, "jane  doe");
        let d = ResearcherProfile::new(4, "John Roe");

        let unique = deduplicate_profiles(vec![a, b, c, d]);
        let ids: Vec<u64> = unique.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 4]);
    }
}
