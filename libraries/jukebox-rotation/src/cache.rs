//! Head cache and the in-memory `Cache`
//!
//! All per-queue keys are built here:
//!
//! | Key | Value | Lifetime |
//! |---|---|---|
//! | `queue:{id}:head` | head `QueuedTrack` snapshot | remaining track time |
//! | `queue:{id}:tracks` | queue listing | `listing_ttl_secs` |
//! | `queue:{id}:pool` | replenishment candidates | until invalidated |
//! | `queue:{id}:previous` | last popped track id | until replaced |

use crate::config::RotationConfig;
use async_trait::async_trait;
use jukebox_core::types::{QueueId, QueuedTrack, TrackId};
use jukebox_core::Cache;
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

fn head_key(queue_id: QueueId) -> String {
    format!("queue:{queue_id}:head")
}

fn listing_key(queue_id: QueueId) -> String {
    format!("queue:{queue_id}:tracks")
}

fn pool_key(queue_id: QueueId) -> String {
    format!("queue:{queue_id}:pool")
}

fn previous_key(queue_id: QueueId) -> String {
    format!("queue:{queue_id}:previous")
}

/// Whole seconds of `ms`, floored at `min_secs`
fn ttl_from_ms(ms: i64, min_secs: u64) -> Duration {
    let secs = (ms.max(0) / 1000) as u64;
    Duration::from_secs(secs.max(min_secs))
}

/// Typed view over a `Cache` for queue state
///
/// Every read treats a missing or undecodable value as absent.
#[derive(Clone)]
pub struct HeadCache {
    cache: Arc<dyn Cache>,
    min_ttl_secs: u64,
    listing_ttl: Duration,
}

impl HeadCache {
    pub fn new(cache: Arc<dyn Cache>, config: &RotationConfig) -> Self {
        Self {
            cache,
            min_ttl_secs: config.min_head_ttl_secs,
            listing_ttl: config.listing_ttl(),
        }
    }

    /// Cached head of a queue
    pub async fn get(&self, queue_id: QueueId) -> Option<QueuedTrack> {
        self.read(&head_key(queue_id)).await
    }

    /// Cache a head for an explicit lifetime
    pub async fn set(&self, queued: &QueuedTrack, ttl: Duration) {
        self.write(&head_key(queued.queue_id), queued, Some(ttl))
            .await;
    }

    /// Cache a freshly assigned head; lives for the track's full duration
    pub async fn set_new_head(&self, queued: &QueuedTrack) {
        self.set(queued, self.new_head_ttl(queued)).await;
    }

    /// Re-cache a head after a playback update; lives for the remaining time
    pub async fn set_in_flight(&self, queued: &QueuedTrack) {
        self.set(queued, self.in_flight_ttl(queued)).await;
    }

    pub async fn invalidate(&self, queue_id: QueueId) {
        self.cache.delete(&head_key(queue_id)).await;
    }

    pub fn new_head_ttl(&self, queued: &QueuedTrack) -> Duration {
        ttl_from_ms(queued.track.duration_ms, self.min_ttl_secs)
    }

    pub fn in_flight_ttl(&self, queued: &QueuedTrack) -> Duration {
        ttl_from_ms(queued.remaining_ms(), self.min_ttl_secs)
    }

    pub async fn get_listing(&self, queue_id: QueueId) -> Option<Vec<QueuedTrack>> {
        self.read(&listing_key(queue_id)).await
    }

    pub async fn set_listing(&self, queue_id: QueueId, listing: &[QueuedTrack]) {
        self.write(&listing_key(queue_id), listing, Some(self.listing_ttl))
            .await;
    }

    pub async fn invalidate_listing(&self, queue_id: QueueId) {
        self.cache.delete(&listing_key(queue_id)).await;
    }

    /// Remaining replenishment candidates of a queue
    pub async fn get_pool(&self, queue_id: QueueId) -> Option<Vec<TrackId>> {
        self.read(&pool_key(queue_id)).await
    }

    pub async fn set_pool(&self, queue_id: QueueId, pool: &[TrackId]) {
        self.write(&pool_key(queue_id), pool, None).await;
    }

    pub async fn invalidate_pool(&self, queue_id: QueueId) {
        self.cache.delete(&pool_key(queue_id)).await;
    }

    /// Track most recently advanced past in a queue
    pub async fn get_previous(&self, queue_id: QueueId) -> Option<TrackId> {
        self.read(&previous_key(queue_id)).await
    }

    pub async fn set_previous(&self, queue_id: QueueId, track_id: TrackId) {
        self.write(&previous_key(queue_id), &track_id, None).await;
    }

    /// Drop every key of a queue
    pub async fn forget_queue(&self, queue_id: QueueId) {
        for key in [
            head_key(queue_id),
            listing_key(queue_id),
            pool_key(queue_id),
            previous_key(queue_id),
        ] {
            self.cache.delete(&key).await;
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                self.cache.delete(key).await;
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_value(value) {
            Ok(value) => self.cache.set(key, value, ttl).await,
            Err(e) => tracing::warn!(key, error = %e, "Could not encode cache entry"),
        }
    }
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Bounded in-process cache with per-entry expiry
///
/// Least recently used entries are evicted once `capacity` is reached.
/// Expired entries are dropped lazily on access.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key.to_string(), Entry { value, expires_at });
    }

    async fn delete(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop(key);
    }
}
