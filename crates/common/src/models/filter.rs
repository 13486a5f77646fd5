//! Build filter: which researchers make it into a graph snapshot

use super::{Region, ResearcherProfile};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use validator::Validate;

/// Default node cap
pub const DEFAULT_MAX_NODES: usize = 200;

/// Clustering strategy applied during graph assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringMethod {
    /// Cluster by resolved region
    #[default]
    Regional,
    /// Cluster by dominant research category
    Topical,
    /// Community detection over collaboration edges
    Collaborative,
}

impl ClusteringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringMethod::Regional => "regional",
            ClusteringMethod::Topical => "topical",
            ClusteringMethod::Collaborative => "collaborative",
        }
    }
}

impl fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter describing one graph build request.
///
/// Empty lists are unconstrained. Category and keyword matching is
/// case-insensitive; a researcher passes a list constraint when it matches
/// any entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GraphFilter {
    /// Research categories (any-of)
    #[serde(default)]
    #[validate(length(max = 50))]
    pub categories: Vec<String>,

    /// Regions (any-of)
    #[serde(default)]
    pub regions: Vec<Region>,

    /// Free-text keywords matched against interests and categories (any-of)
    #[serde(default)]
    #[validate(length(max = 10))]
    pub keywords: Vec<String>,

    /// Minimum citation count
    #[serde(default)]
    pub min_citations: u64,

    /// Maximum number of nodes in the snapshot
    #[serde(default = "default_max_nodes")]
    #[validate(range(min = 1, max = 10000))]
    pub max_nodes: usize,

    /// Clustering override; the engine default applies when unset
    #[serde(default)]
    pub clustering: Option<ClusteringMethod>,
}

fn default_max_nodes() -> usize {
    DEFAULT_MAX_NODES
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            regions: Vec::new(),
            keywords: Vec::new(),
            min_citations: 0,
            max_nodes: DEFAULT_MAX_NODES,
            clustering: None,
        }
    }
}

impl GraphFilter {
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.regions = regions.into_iter().collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_citations(mut self, min_citations: u64) -> Self {
        self.min_citations = min_citations;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_clustering(mut self, method: ClusteringMethod) -> Self {
        self.clustering = Some(method);
        self
    }

    /// Check category, region, keyword, and citation-floor constraints.
    ///
    /// The node cap is not a per-profile property and is applied by the assembler.
    pub fn matches(&self, profile: &ResearcherProfile) -> bool {
        if profile.citations < self.min_citations {
            return false;
        }

        if !self.regions.is_empty() && !self.regions.contains(&profile.region) {
            return false;
        }

        if !self.categories.is_empty() && !self.categories.iter().any(|c| profile.has_category(c)) {
            return false;
        }

        if !self.keywords.is_empty() {
            let tags: Vec<String> = profile
                .interests
                .iter()
                .chain(profile.research_categories.iter())
                .map(|t| t.to_lowercase())
                .collect();

            let hit = self.keywords.iter().any(|k| {
                let k = k.trim().to_lowercase();
                !k.is_empty() && tags.iter().any(|t| t.contains(&k))
            });
            if !hit {
                return false;
            }
        }

        true
    }

    /// Canonical, order-insensitive cache key for this filter under `method`
    pub fn fingerprint(&self, method: ClusteringMethod) -> String {
        let normalize = |items: &[String]| {
            let mut v: Vec<String> = items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            v.sort();
            v.dedup();
            v.join(",")
        };

        let mut regions: Vec<&str> = self.regions.iter().map(Region::label).collect();
        regions.sort_unstable();
        regions.dedup();

        let canonical = format!(
            "categories={};regions={};keywords={};min_citations={};max_nodes={};method={}",
            normalize(&self.categories),
            regions.join(","),
            normalize(&self.keywords),
            self.min_citations,
            self.max_nodes,
            method,
        );

        hex::encode(Sha256::digest(canonical.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ResearcherProfile {
        let mut p = ResearcherProfile::new(1, "Grace")
            .with_metrics(5000, 40, 80)
            .with_region(Region::Europe)
            .with_categories(["slam", "path_planning"]);
        p.interests = vec!["Visual SLAM".into(), "Legged Locomotion".into()];
        p
    }

    #[test]
    fn test_default_filter_accepts() {
        assert!(GraphFilter::default().matches(&profile()));
    }

    #[test]
    fn test_filter_constraints() {
        let p = profile();
        assert!(!GraphFilter::default().with_min_citations(6000).matches(&p));
        assert!(!GraphFilter::default().with_regions([Region::Japan]).matches(&p));
        assert!(GraphFilter::default().with_regions([Region::Japan, Region::Europe]).matches(&p));
        assert!(GraphFilter::default().with_categories(["SLAM"]).matches(&p));
        assert!(!GraphFilter::default().with_categories(["manipulation"]).matches(&p));
        assert!(GraphFilter::default().with_keywords(["locomotion"]).matches(&p));
        assert!(!GraphFilter::default().with_keywords(["drone"]).matches(&p));
    }

    #[test]
    fn test_fingerprint_is_order_insensitive() {
        let a = GraphFilter::default()
            .with_categories(["slam", "Manipulation"])
            .with_regions([Region::Europe, Region::Japan]);
        let b = GraphFilter::default()
            .with_categories(["manipulation", "SLAM"])
            .with_regions([Region::Japan, Region::Europe]);

        assert_eq!(
            a.fingerprint(ClusteringMethod::Regional),
            b.fingerprint(ClusteringMethod::Regional)
        );
        assert_ne!(
            a.fingerprint(ClusteringMethod::Regional),
            a.fingerprint(ClusteringMethod::Topical)
        );
        assert_eq!(a.fingerprint(ClusteringMethod::Regional).len(), 64);
    }

    #[test]
    fn test_validation() {
        assert!(GraphFilter::default().validate().is_ok());
        assert!(GraphFilter::default().with_max_nodes(0).validate().is_err());

        let too_many: Vec<String> = (0..11).map(|i| format!("kw{}", i)).collect();
        assert!(GraphFilter::default().with_keywords(too_many).validate().is_err());
    }
}
