//! Publication records fetched per researcher

use serde::{Deserialize, Serialize};

/// A publication with its ordered author list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Title
    #[serde(default)]
    pub title: String,

    /// Publication year, when known
    #[serde(default)]
    pub year: Option<i32>,

    /// Author names in byline order (first author first)
    #[serde(default)]
    pub authors: Vec<String>,

    /// Citation count of this publication
    #[serde(default)]
    pub citations: u64,
}

impl Publication {
    /// Create a publication
    pub fn new<I, S>(title: impl Into<String>, year: Option<i32>, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            year,
            authors: authors.into_iter().map(Into::into).collect(),
            citations: 0,
        }
    }

    /// Author names that are not blank
    pub fn usable_authors(&self) -> impl Iterator<Item = &str> {
        self.authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
    }

    /// A record with no usable author contributes nothing to the graph
    pub fn is_malformed(&self) -> bool {
        self.usable_authors().next().is_none()
    }
}
