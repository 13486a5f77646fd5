//! Caller-side retry decorator for profile stores
//!
//! The engine never retries on its own. Callers that want retries wrap their
//! store in [`RetryingStore`]; only transient data-source errors are retried.

use super::ProfileStore;
use crate::errors::Result;
use crate::models::{GraphFilter, Publication, ResearcherId, ResearcherProfile};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoffBuilder};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::warn;

/// Backoff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First delay in milliseconds
    pub initial_interval_ms: u64,
    /// Delay ceiling in milliseconds
    pub max_interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval_ms: 200,
            max_interval_ms: 5_000,
        }
    }
}

/// Store wrapper retrying transient failures with exponential backoff
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: ProfileStore> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn with_retry<'a, T, F, Fut>(&'a self, operation: &'static str, op: F) -> Result<T>
    where
        F: Fn(&'a S) -> Fut,
        Fut: Future<Output = Result<T>> + 'a,
    {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.policy.initial_interval_ms))
            .with_max_interval(Duration::from_millis(self.policy.max_interval_ms))
            .with_max_elapsed_time(None)
            .build();

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let inner = &self.inner;
        let op = &op;
        let max_retries = self.policy.max_retries;

        retry(backoff, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match op(inner).await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() && attempt <= max_retries => {
                    warn!(
                        store = inner.name(),
                        operation,
                        attempt,
                        error = %e,
                        "Transient store failure, retrying"
                    );
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }
}

#[async_trait]
impl<S: ProfileStore> ProfileStore for RetryingStore<S> {
    async fn fetch_profiles(&self, filter: &GraphFilter) -> Result<Vec<ResearcherProfile>> {
        self.with_retry("fetch_profiles", |s| s.fetch_profiles(filter))
            .await
    }

    async fn fetch_publications(&self, researcher_id: ResearcherId) -> Result<Vec<Publication>> {
        self.with_retry("fetch_publications", |s| s.fetch_publications(researcher_id))
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
