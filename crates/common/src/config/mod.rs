//! Configuration management for ScholarNet
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use crate::errors::{AppError, Result};
use crate::models::{ClusteringMethod, GraphFilter, DEFAULT_MAX_NODES};
use crate::taxonomy::CategoryTaxonomy;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Graph engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Build-job orchestration
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Snapshot cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Research-category keyword table
    #[serde(default)]
    pub taxonomy: CategoryTaxonomy,
}

/// Weights of the rank score: `w1*ln(1+citations) + w2*h_index + w3*i10_index`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RankWeights {
    #[serde(default = "default_citation_weight")]
    pub citations: f64,

    #[serde(default = "default_h_index_weight")]
    pub h_index: f64,

    #[serde(default = "default_i10_weight")]
    pub i10_index: f64,
}

impl RankWeights {
    pub fn new(citations: f64, h_index: f64, i10_index: f64) -> Self {
        Self {
            citations,
            h_index,
            i10_index,
        }
    }

    fn is_valid(&self) -> bool {
        [self.citations, self.h_index, self.i10_index]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
    }
}

impl Default for RankWeights {
    fn default() -> Self {
        Self::new(
            default_citation_weight(),
            default_h_index_weight(),
            default_i10_weight(),
        )
    }
}

/// Relationship classification policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ClassifierKind {
    /// Citation gap, then authorship position, then peer
    #[default]
    #[serde(rename = "heuristic_v1")]
    HeuristicV1,

    /// Plain rank ratio
    #[serde(rename = "rank_gap")]
    RankGap,
}

impl ClassifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeuristicV1 => "heuristic_v1",
            Self::RankGap => "rank_gap",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Citation ratio above which the more-cited side is taken as mentor
    #[serde(default = "default_citation_gap_threshold")]
    pub citation_gap_threshold: f64,

    /// Shared-publication count at which edge strength saturates to 1.0
    #[serde(default = "default_strength_saturation")]
    pub strength_saturation: u32,

    /// Clustering used when a filter does not name one
    #[serde(default)]
    pub clustering_method: ClusteringMethod,

    /// Default node cap
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    #[serde(default)]
    pub rank_weights: RankWeights,

    /// Share of joint publications one side must lead as first author
    #[serde(default = "default_first_author_majority")]
    pub first_author_majority: f64,

    /// Share of joint publications the other side must close as last author
    #[serde(default = "default_senior_author_majority")]
    pub senior_author_majority: f64,

    /// Shared publications needed before the position signal is considered
    #[serde(default = "default_min_position_evidence")]
    pub min_position_evidence: u32,

    /// Rank ratio used by the `rank_gap` policy
    #[serde(default = "default_rank_gap_ratio")]
    pub rank_gap_ratio: f64,

    #[serde(default)]
    pub classifier: ClassifierKind,

    /// Default citation floor
    #[serde(default)]
    pub min_citations: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// Wall-clock budget per build job in seconds
    #[serde(default = "default_job_timeout")]
    pub timeout_secs: u64,

    /// Jobs allowed to run at the same time
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Terminal jobs kept for status queries
    #[serde(default = "default_retained_jobs")]
    pub retained_jobs: usize,

    /// Concurrent publication fetches within one job
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Snapshots held by the in-memory cache
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Redis URL; the in-memory cache is used when absent
    pub redis_url: Option<String>,

    /// Redis TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Key prefix for namespacing
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_citation_weight() -> f64 { 1.0 }
fn default_h_index_weight() -> f64 { 0.1 }
fn default_i10_weight() -> f64 { 0.02 }
fn default_citation_gap_threshold() -> f64 { 5.0 }
fn default_strength_saturation() -> u32 { 10 }
fn default_max_nodes() -> usize { DEFAULT_MAX_NODES }
fn default_first_author_majority() -> f64 { 0.6 }
fn default_senior_author_majority() -> f64 { 0.5 }
fn default_min_position_evidence() -> u32 { 2 }
fn default_rank_gap_ratio() -> f64 { 1.5 }
fn default_job_timeout() -> u64 { 600 }
fn default_max_concurrent_jobs() -> usize { 4 }
fn default_retained_jobs() -> usize { 256 }
fn default_fetch_concurrency() -> usize { 8 }
fn default_cache_capacity() -> usize { 64 }
fn default_cache_ttl() -> u64 { 3600 }
fn default_key_prefix() -> String { "scholarnet".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "scholarnet".to_string() }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            citation_gap_threshold: default_citation_gap_threshold(),
            strength_saturation: default_strength_saturation(),
            clustering_method: ClusteringMethod::default(),
            max_nodes: default_max_nodes(),
            rank_weights: RankWeights::default(),
            first_author_majority: default_first_author_majority(),
            senior_author_majority: default_senior_author_majority(),
            min_position_evidence: default_min_position_evidence(),
            rank_gap_ratio: default_rank_gap_ratio(),
            classifier: ClassifierKind::default(),
            min_citations: 0,
        }
    }
}

impl EngineConfig {
    /// Filter seeded with the engine's default cap and citation floor
    pub fn default_filter(&self) -> GraphFilter {
        GraphFilter::default()
            .with_max_nodes(self.max_nodes)
            .with_min_citations(self.min_citations)
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_job_timeout(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            retained_jobs: default_retained_jobs(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl JobsConfig {
    /// Get the job budget as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            redis_url: None,
            ttl_secs: default_cache_ttl(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("engine.clustering_method", "regional")?
            .set_default("engine.classifier", "heuristic_v1")?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__ENGINE__MAX_NODES=50
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;

        if !engine.rank_weights.is_valid() {
            return Err(invalid("engine.rank_weights must be finite and non-negative"));
        }
        if !engine.citation_gap_threshold.is_finite() || engine.citation_gap_threshold <= 1.0 {
            return Err(invalid("engine.citation_gap_threshold must be greater than 1.0"));
        }
        if !engine.rank_gap_ratio.is_finite() || engine.rank_gap_ratio <= 1.0 {
            return Err(invalid("engine.rank_gap_ratio must be greater than 1.0"));
        }
        if engine.strength_saturation == 0 {
            return Err(invalid("engine.strength_saturation must be positive"));
        }
        if engine.max_nodes == 0 {
            return Err(invalid("engine.max_nodes must be positive"));
        }
        for (name, value) in [
            ("engine.first_author_majority", engine.first_author_majority),
            ("engine.senior_author_majority", engine.senior_author_majority),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(&format!("{} must be in (0, 1]", name)));
            }
        }
        if self.jobs.timeout_secs == 0 {
            return Err(invalid("jobs.timeout_secs must be positive"));
        }
        if self.jobs.max_concurrent_jobs == 0 || self.jobs.fetch_concurrency == 0 {
            return Err(invalid("jobs concurrency limits must be positive"));
        }
        if self.cache.capacity == 0 {
            return Err(invalid("cache.capacity must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Configuration {
        message: message.to_string(),
    }
}
