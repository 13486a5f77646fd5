//! Co-authorship extraction
//!
//! Provides:
//! - `CollaborationEdge`: one unordered researcher pair with shared-publication evidence
//! - `extract`: pair detection over publication lists through an inverted author index
//!
//! Publications reached through several researchers are counted once.
//! Malformed publications (no usable authors) are skipped and counted.

mod index;

pub use index::AuthorIndex;

use scholarnet_common::models::{Publication, ResearcherId, ResearcherProfile};
use scholarnet_common::taxonomy::name_key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Collaboration between two researchers, stored canonically with `a < b`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationEdge {
    /// Lower researcher id
    pub a: ResearcherId,

    /// Higher researcher id
    pub b: ResearcherId,

    /// Number of distinct shared publications
    pub shared_publications: u32,

    /// Years of shared publications, ascending (undated ones omitted)
    #[serde(default)]
    pub years: Vec<i32>,

    pub first_year: Option<i32>,
    pub last_year: Option<i32>,

    /// Shared publications where `a` is first author
    pub a_first_author: u32,

    /// Shared publications where `b` is first author
    pub b_first_author: u32,

    /// Shared publications where `a` is last author (two or more authors)
    pub a_last_author: u32,

    /// Shared publications where `b` is last author (two or more authors)
    pub b_last_author: u32,
}

impl CollaborationEdge {
    /// Empty edge between two distinct researchers, in canonical order
    pub fn new(x: ResearcherId, y: ResearcherId) -> Self {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self {
            a,
            b,
            shared_publications: 0,
            years: Vec::new(),
            first_year: None,
            last_year: None,
            a_first_author: 0,
            b_first_author: 0,
            a_last_author: 0,
            b_last_author: 0,
        }
    }

    /// Whether `id` is an endpoint
    pub fn contains(&self, id: ResearcherId) -> bool {
        self.a == id || self.b == id
    }

    /// The endpoint that is not `id`
    pub fn other(&self, id: ResearcherId) -> Option<ResearcherId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }

    /// First-author count for one endpoint
    pub fn first_author_count(&self, id: ResearcherId) -> u32 {
        if id == self.a {
            self.a_first_author
        } else if id == self.b {
            self.b_first_author
        } else {
            0
        }
    }

    /// Last-author count for one endpoint
    pub fn last_author_count(&self, id: ResearcherId) -> u32 {
        if id == self.a {
            self.a_last_author
        } else if id == self.b {
            self.b_last_author
        } else {
            0
        }
    }

    /// Add one shared publication. Positions are 0-based among `author_count` usable authors.
    fn record(&mut self, year: Option<i32>, pos_a: usize, pos_b: usize, author_count: usize) {
        self.shared_publications += 1;

        if let Some(year) = year {
            let at = self.years.partition_point(|y| *y <= year);
            self.years.insert(at, year);
            self.first_year = Some(self.first_year.map_or(year, |y| y.min(year)));
            self.last_year = Some(self.last_year.map_or(year, |y| y.max(year)));
        }

        let last = author_count.saturating_sub(1);
        if pos_a == 0 {
            self.a_first_author += 1;
        }
        if pos_b == 0 {
            self.b_first_author += 1;
        }
        if author_count >= 2 {
            if pos_a == last {
                self.a_last_author += 1;
            }
            if pos_b == last {
                self.b_last_author += 1;
            }
        }
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Edges ordered by `(a, b)`
    pub edges: Vec<CollaborationEdge>,

    /// Unique publications skipped as malformed
    pub skipped_records: usize,

    /// Unique publications examined
    pub publications_scanned: usize,
}

/// Dedup key: normalized title plus year. Untitled publications are never merged.
fn publication_key(publication: &Publication) -> Option<(String, Option<i32>)> {
    let title = name_key(&publication.title);
    if title.is_empty() {
        None
    } else {
        Some((title, publication.year))
    }
}

/// Derive collaboration edges among `researchers` from `publications`.
///
/// Co-authors outside the researcher set are ignored. Every emitted pair
/// co-authors at least one publication and both endpoints are known researchers.
pub fn extract<'a, I>(researchers: &[ResearcherProfile], publications: I) -> ExtractionReport
where
    I: IntoIterator<Item = &'a Publication>,
{
    let index = AuthorIndex::build(researchers);
    let mut seen: HashSet<(String, Option<i32>)> = HashSet::new();
    let mut edges: BTreeMap<(ResearcherId, ResearcherId), CollaborationEdge> = BTreeMap::new();
    let mut report = ExtractionReport::default();

    for publication in publications {
        if let Some(key) = publication_key(publication) {
            if !seen.insert(key) {
                continue;
            }
        }
        report.publications_scanned += 1;

        if publication.is_malformed() {
            warn!(
                title = %publication.title,
                year = ?publication.year,
                "Skipping publication without usable authors"
            );
            report.skipped_records += 1;
            continue;
        }

        let author_count = publication.usable_authors().count();
        let known = index.authors_of(publication);

        for (i, &(pos_x, x)) in known.iter().enumerate() {
            for &(pos_y, y) in &known[i + 1..] {
                let edge = edges
                    .entry(if x < y { (x, y) } else { (y, x) })
                    .or_insert_with(|| CollaborationEdge::new(x, y));
                let (pos_a, pos_b) = if x < y { (pos_x, pos_y) } else { (pos_y, pos_x) };
                edge.record(publication.year, pos_a, pos_b, author_count);
            }
        }
    }

    report.edges = edges.into_values().collect();

    debug!(
        researchers = researchers.len(),
        publications = report.publications_scanned,
        edges = report.edges.len(),
        skipped = report.skipped_records,
        "Co-authorship extraction complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn researchers() -> Vec<ResearcherProfile> {
        vec![
            ResearcherProfile::new(1, "Ana Ruiz"),
            ResearcherProfile::new(2, "Bo Chen"),
            ResearcherProfile::new(3, "Cy Okafor"),
        ]
    }

    #[test]
    fn test_edges_aggregate_shared_publications() {
        let pubs = vec![
            Publication::new("Mapping", Some(2018), ["Bo Chen", "Ana Ruiz"]),
            Publication::new("Planning", Some(2021), ["Bo Chen", "X Y", "Ana Ruiz"]),
            Publication::new("Grasping", None, ["Ana Ruiz", "Bo Chen"]),
        ];

        let report = extract(&researchers(), &pubs);
        assert_eq!(report.edges.len(), 1);

        let edge = &report.edges[0];
        assert_eq!((edge.a, edge.b), (ResearcherId(1), ResearcherId(2)));
        assert_eq!(edge.shared_publications, 3);
        assert_eq!(edge.years, vec![2018, 2021]);
        assert_eq!(edge.first_year, Some(2018));
        assert_eq!(edge.last_year, Some(2021));
        assert_eq!(edge.first_author_count(ResearcherId(2)), 2);
        assert_eq!(edge.first_author_count(ResearcherId(1)), 1);
        assert_eq!(edge.last_author_count(ResearcherId(1)), 2);
        assert_eq!(edge.last_author_count(ResearcherId(2)), 1);
    }

    #[test]
    fn test_outsiders_produce_no_edges() {
        let pubs = vec![Publication::new("Solo", Some(2020), ["Ana Ruiz", "Dee Outsider"])];
        let report = extract(&researchers(), &pubs);

        assert!(report.edges.is_empty());
        assert_eq!(report.skipped_records, 0);
    }

    #[test]
    fn test_malformed_publication_is_skipped() {
        let pubs = vec![
            Publication::new("Good", Some(2019), ["Ana Ruiz", "Cy Okafor"]),
            Publication::new("Broken", Some(2019), Vec::<String>::new()),
            Publication::new("Blank", Some(2020), [" ", ""]),
            Publication::new("Also Good", Some(2020), ["Bo Chen", "Cy Okafor"]),
        ];

        let report = extract(&researchers(), &pubs);

        assert_eq!(report.skipped_records, 2);
        assert_eq!(report.edges.len(), 2);
        for edge in &report.edges {
            assert!(edge.shared_publications >= 1);
        }
    }

    #[test]
    fn test_duplicate_publications_counted_once() {
        let shared = Publication::new("Visual SLAM", Some(2022), ["Ana Ruiz", "Bo Chen"]);
        let same_title = Publication::new("visual  slam.", Some(2022), ["Ana Ruiz", "Bo Chen"]);
        let untitled = Publication::new("", Some(2022), ["Ana Ruiz", "Bo Chen"]);
        let broken = Publication::new("Broken", None, Vec::<String>::new());

        let pubs = vec![
            shared.clone(),
            same_title,
            untitled.clone(),
            untitled,
            broken.clone(),
            broken,
        ];
        let report = extract(&researchers(), &pubs);

        assert_eq!(report.edges[0].shared_publications, 3);
        assert_eq!(report.skipped_records, 1);
        assert_eq!(report.publications_scanned, 4);
    }

    #[test]
    fn test_three_way_publication() {
        let pubs = vec![Publication::new(
            "Swarm",
            Some(2017),
            ["Cy Okafor", "Ana Ruiz", "Bo Chen"],
        )];
        let report = extract(&researchers(), &pubs);

        let pairs: Vec<(u64, u64)> = report.edges.iter().map(|e| (e.a.0, e.b.0)).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);

        let edge_13 = &report.edges[1];
        assert_eq!(edge_13.b_first_author, 1);
        assert_eq!(edge_13.a_last_author, 0);
        assert_eq!(edge_13.other(ResearcherId(3)), Some(ResearcherId(1)));
    }
}
