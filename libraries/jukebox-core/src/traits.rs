/// Collaborator traits for the rotation engine
use crate::error::{JukeboxError, Result};
use crate::events::Notification;
use crate::types::{SourceType, TrackData};
use async_trait::async_trait;
use std::time::Duration;

/// Third-party metadata backend (Spotify, Soundcloud, Youtube)
///
/// Implementations wrap the backend's HTTP API. Callers bound every call with
/// a timeout, so implementations need not enforce one themselves.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Backend this source serves
    fn source_type(&self) -> SourceType;

    /// Whether `fetch_associated_track` is implemented
    fn supports_associated_tracks(&self) -> bool {
        false
    }

    /// Look a track up by its backend id
    ///
    /// Returns `Ok(None)` when the backend reports the track as gone.
    ///
    /// # Errors
    /// Returns `JukeboxError::Source` when the backend cannot be reached
    async fn lookup_track(&self, source_id: &str) -> Result<Option<TrackData>>;

    /// Search the backend catalogue
    ///
    /// # Errors
    /// Returns `JukeboxError::Source` on backend failure
    async fn search_tracks(&self, query: &str, limit: u32, offset: u32)
        -> Result<Vec<TrackData>>;

    /// Fetch a track related to an artist or track id ("artist radio")
    ///
    /// # Errors
    /// Returns `JukeboxError::InvalidBackend` if the backend has no such capability
    async fn fetch_associated_track(&self, source_id: &str) -> Result<TrackData> {
        let _ = source_id;
        Err(JukeboxError::InvalidBackend(format!(
            "{} does not support associated tracks",
            self.source_type()
        )))
    }
}

/// Key/value cache with optional expiry
///
/// Misses are never errors. Implementations swallow their own transport
/// failures and report them as absence.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value, `None` if absent or expired
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store a value; `ttl = None` keeps it until deleted or evicted
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>);

    /// Remove a value
    async fn delete(&self, key: &str);
}

/// Fire-and-forget pub/sub sink for mutation notifications
pub trait NotificationPublisher: Send + Sync {
    /// Publish a notification; no acknowledgement, no retry
    fn publish(&self, channel: &str, notification: Notification);
}
