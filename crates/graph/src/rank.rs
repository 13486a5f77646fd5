//! Metric normalizer
//!
//! Collapses citation metrics into one comparable rank score:
//! `w1 * ln(1 + citations) + w2 * h_index + w3 * i10_index`.

use scholarnet_common::config::RankWeights;
use scholarnet_common::models::ResearcherProfile;

/// Rank score from raw metrics.
///
/// Never negative, never NaN. All-zero metrics score 0.
pub fn rank(citations: u64, h_index: u32, i10_index: u32, weights: &RankWeights) -> f64 {
    let score = weights.citations.max(0.0) * (citations as f64).ln_1p()
        + weights.h_index.max(0.0) * f64::from(h_index)
        + weights.i10_index.max(0.0) * f64::from(i10_index);

    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

/// Rank scorer bound to one set of weights
#[derive(Debug, Clone, Default)]
pub struct MetricNormalizer {
    weights: RankWeights,
}

impl MetricNormalizer {
    pub fn new(weights: RankWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RankWeights {
        &self.weights
    }

    /// Score raw metrics
    pub fn score(&self, citations: u64, h_index: u32, i10_index: u32) -> f64 {
        rank(citations, h_index, i10_index, &self.weights)
    }

    /// Score a profile's metrics
    pub fn score_profile(&self, profile: &ResearcherProfile) -> f64 {
        self.score(profile.citations, profile.h_index, profile.i10_index)
    }
}
