//! Cache / result sink
//!
//! Provides:
//! - `SnapshotSink`: publish complete snapshots, fetch the latest per filter key
//! - `MemorySnapshotCache`: size-bounded LRU held in process
//! - `RedisSnapshotSink`: JSON snapshots in Redis with TTL
//!
//! The sink owns version numbering: `publish` assigns the next version for
//! the snapshot's filter key and stores it in one step, so concurrent builds
//! of the same filter never share a version.

use crate::snapshot::GraphSnapshot;
use async_trait::async_trait;
use lru::LruCache;
use scholarnet_common::cache::{keys, Cache};
use scholarnet_common::errors::Result;
use scholarnet_common::metrics::record_cache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Destination for published snapshots
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Assign the next version for the snapshot's filter key and store it
    /// as the latest. Returns the published snapshot.
    async fn publish(&self, snapshot: GraphSnapshot) -> Result<Arc<GraphSnapshot>>;

    /// Latest snapshot for a filter key
    async fn get_latest(&self, filter_key: &str) -> Result<Option<Arc<GraphSnapshot>>>;
}

struct MemoryState {
    snapshots: LruCache<String, Arc<GraphSnapshot>>,
    /// Last version per filter key; outlives LRU eviction of the snapshot
    versions: HashMap<String, u64>,
}

/// In-process snapshot cache with LRU eviction
pub struct MemorySnapshotCache {
    state: Mutex<MemoryState>,
}

impl MemorySnapshotCache {
    /// Cache holding at most `capacity` filter keys (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(MemoryState {
                snapshots: LruCache::new(capacity),
                versions: HashMap::new(),
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.snapshots.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.snapshots.is_empty()
    }
}

#[async_trait]
impl SnapshotSink for MemorySnapshotCache {
    async fn publish(&self, snapshot: GraphSnapshot) -> Result<Arc<GraphSnapshot>> {
        let mut state = self.state.lock().await;

        let version = state.versions.entry(snapshot.filter_key.clone()).or_insert(0);
        *version += 1;
        let snapshot = Arc::new(snapshot.with_version(*version));

        debug!(
            filter_key = %snapshot.filter_key,
            version = snapshot.version,
            "Caching snapshot"
        );
        state
            .snapshots
            .put(snapshot.filter_key.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn get_latest(&self, filter_key: &str) -> Result<Option<Arc<GraphSnapshot>>> {
        let found = self.state.lock().await.snapshots.get(filter_key).cloned();
        record_cache(found.is_some(), "snapshot_memory");
        Ok(found)
    }
}

/// Snapshot sink backed by Redis.
///
/// Versions come from a per-key `INCR` counter. Writes from this process are
/// serialized so the stored snapshot is always the highest version issued here.
pub struct RedisSnapshotSink {
    cache: Cache,
    publish_lock: Mutex<()>,
}

impl RedisSnapshotSink {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            publish_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl SnapshotSink for RedisSnapshotSink {
    async fn publish(&self, snapshot: GraphSnapshot) -> Result<Arc<GraphSnapshot>> {
        let _guard = self.publish_lock.lock().await;

        let version = self
            .cache
            .incr(&keys::snapshot_version(&snapshot.filter_key))
            .await?;
        let snapshot = Arc::new(snapshot.with_version(version));

        self.cache
            .put_json(&keys::snapshot(&snapshot.filter_key), snapshot.as_ref())
            .await?;
        Ok(snapshot)
    }

    async fn get_latest(&self, filter_key: &str) -> Result<Option<Arc<GraphSnapshot>>> {
        let found: Option<GraphSnapshot> = self.cache.get_json(&keys::snapshot(filter_key)).await?;
        record_cache(found.is_some(), "snapshot_redis");
        Ok(found.map(Arc::new))
    }
}
