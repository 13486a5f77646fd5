//! Error types for ScholarNet
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for pipeline-fatal and record-level failures
//! - Error codes for client handling
//! - Retry classification for caller-side retry policies
//!
//! Ambiguous relationship classification is deliberately absent: an edge
//! that no heuristic can decide resolves to `peer`, never to an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFilter,

    // Data source errors (2xxx)
    DataSourceError,
    MalformedRecord,

    // Job errors (3xxx)
    JobNotFound,
    JobTimeout,
    JobCancelled,

    // Cache errors (4xxx)
    CacheError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFilter => 1002,

            // Data source (2xxx)
            ErrorCode::DataSourceError => 2001,
            ErrorCode::MalformedRecord => 2002,

            // Jobs (3xxx)
            ErrorCode::JobNotFound => 3001,
            ErrorCode::JobTimeout => 3002,
            ErrorCode::JobCancelled => 3003,

            // Cache (4xxx)
            ErrorCode::CacheError => 4001,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] validator::ValidationErrors),

    // Data source errors
    #[error("Data source error ({source_name}): {message}")]
    DataSource {
        source_name: String,
        message: String,
    },

    #[error("Malformed {record_type} record {id}: {reason}")]
    MalformedRecord {
        record_type: String,
        id: String,
        reason: String,
    },

    // Job errors
    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    #[error("Job timed out after {budget_secs}s (during {phase})")]
    JobTimeout { budget_secs: u64, phase: String },

    #[error("Job cancelled (observed before {phase})")]
    JobCancelled { phase: String },

    // Cache errors
    #[error("Cache error: {message}")]
    CacheError { message: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a data source failure
    pub fn data_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::DataSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a malformed record
    pub fn malformed(
        record_type: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        AppError::MalformedRecord {
            record_type: record_type.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFilter(_) => ErrorCode::InvalidFilter,
            AppError::DataSource { .. } => ErrorCode::DataSourceError,
            AppError::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            AppError::JobNotFound { .. } => ErrorCode::JobNotFound,
            AppError::JobTimeout { .. } => ErrorCode::JobTimeout,
            AppError::JobCancelled { .. } => ErrorCode::JobCancelled,
            AppError::CacheError { .. } => ErrorCode::CacheError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Transient failures a caller may retry with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::DataSource { .. } | AppError::CacheError { .. })
    }

    /// Failures scoped to a single record; absorbed and counted, never fatal to a job
    pub fn is_record_level(&self) -> bool {
        matches!(self, AppError::MalformedRecord { .. })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::JobNotFound { id: "test".into() };
        assert_eq!(err.code(), ErrorCode::JobNotFound);
        assert_eq!(err.code().as_code(), 3001);
    }

    #[test]
    fn test_retry_classification() {
        let err = AppError::data_source("profiles", "connection refused");
        assert!(err.is_retryable());
        assert!(!err.is_record_level());

        let err = AppError::malformed("publication", "p-1", "empty author list");
        assert!(err.is_record_level());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_timeout_message() {
        let err = AppError::JobTimeout {
            budget_secs: 30,
            phase: "assembly".into(),
        };
        assert_eq!(err.code(), ErrorCode::JobTimeout);
        assert!(err.to_string().contains("30s"));
        assert!(err.to_string().contains("assembly"));
    }

    #[test]
    fn test_cancelled_code() {
        let err = AppError::JobCancelled {
            phase: "assembly".into(),
        };
        assert_eq!(err.code(), ErrorCode::JobCancelled);
        assert!(err.to_string().contains("cancelled"));
    }
}
