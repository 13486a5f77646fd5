//! Redis cache client
//!
//! Provides:
//! - Auto-reconnecting connection (`ConnectionManager`), cloned per command
//! - JSON values under a namespaced key, written with a TTL
//! - Atomic counters for snapshot versions
//! - Key builders for snapshot storage

use crate::config::CacheConfig;
use crate::errors::{AppError, Result};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

/// Namespaced JSON cache on Redis
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    key_prefix: String,
    ttl_secs: u64,
}

impl Cache {
    /// Connect using the `cache` configuration section
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let url = config.redis_url.as_deref().ok_or_else(|| AppError::Configuration {
            message: "cache.redis_url is not set".to_string(),
        })?;

        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        info!(prefix = %config.key_prefix, ttl_secs = config.ttl_secs, "Connected to Redis");

        Ok(Self {
            connection,
            key_prefix: config.key_prefix.clone(),
            ttl_secs: config.ttl_secs,
        })
    }

    /// Full Redis key for `key`
    pub fn key(&self, key: &str) -> String {
        keys::prefixed(&self.key_prefix, key)
    }

    /// Read and decode a JSON value; `None` when the key is absent or expired
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.key(key);
        let mut conn = self.connection.clone();

        let raw: Option<String> = conn.get(&full_key).await?;
        debug!(key = %full_key, hit = raw.is_some(), "Cache read");

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(AppError::from)
    }

    /// Encode and store a JSON value with the configured TTL
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let full_key = self.key(key);
        let json = serde_json::to_string(value)?;
        let mut conn = self.connection.clone();

        conn.set_ex::<_, _, ()>(&full_key, json, self.ttl_secs).await?;
        debug!(key = %full_key, ttl_secs = self.ttl_secs, "Cache write");
        Ok(())
    }

    /// Atomically increment a counter, creating it at 1. Counters carry no TTL.
    pub async fn incr(&self, key: &str) -> Result<u64> {
        let full_key = self.key(key);
        let mut conn = self.connection.clone();

        let value: u64 = conn.incr(&full_key, 1u64).await?;
        debug!(key = %full_key, value, "Counter incremented");
        Ok(value)
    }

    /// Round-trip check used at startup
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Cache key builders
pub mod keys {
    /// `{prefix}:{key}`, or `key` alone for an empty prefix
    pub fn prefixed(prefix: &str, key: &str) -> String {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", prefix, key)
        }
    }

    /// Latest snapshot for a filter fingerprint
    pub fn snapshot(filter_key: &str) -> String {
        format!("snapshot:{}", filter_key)
    }

    /// Version counter for a filter fingerprint
    pub fn snapshot_version(filter_key: &str) -> String {
        format!("snapshot_version:{}", filter_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_key_layout() {
        assert_eq!(keys::snapshot("ab12"), "snapshot:ab12");
        assert_eq!(
            keys::prefixed("scholarnet", &keys::snapshot("ab12")),
            "scholarnet:snapshot:ab12"
        );
        assert_eq!(keys::snapshot_version("ab12"), "snapshot_version:ab12");
        assert_eq!(keys::prefixed("", "x"), "x");
    }

    #[tokio::test]
    async fn test_connect_requires_url() {
        let err = Cache::connect(&CacheConfig::default()).await.err().unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
