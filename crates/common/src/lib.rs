//! ScholarNet Common Library
//!
//! Shared code for the collaboration graph engine including:
//! - Researcher, publication, region and filter models
//! - Research taxonomy and profile enrichment
//! - Profile store adapter contract
//! - Error types and handling
//! - Configuration management
//! - Metrics and Redis cache utilities

pub mod cache;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod store;
pub mod taxonomy;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use store::ProfileStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
