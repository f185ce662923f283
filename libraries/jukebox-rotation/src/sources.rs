//! Registered metadata backends
//!
//! Every call goes through `tokio::time::timeout`; a stalled backend surfaces
//! as `JukeboxError::Source` instead of stalling the queue.

use jukebox_core::types::{SourceType, TrackData};
use jukebox_core::{JukeboxError, MetadataSource, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Metadata sources keyed by backend
#[derive(Clone)]
pub struct SourceRegistry {
    sources: HashMap<SourceType, Arc<dyn MetadataSource>>,
    timeout: Duration,
}

impl SourceRegistry {
    /// Create an empty registry with a per-call timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: HashMap::new(),
            timeout,
        }
    }

    /// Register a source under its own `source_type()`, replacing any previous one
    pub fn register(&mut self, source: Arc<dyn MetadataSource>) {
        let source_type = source.source_type();
        tracing::info!(backend = %source_type, "Metadata source registered");
        self.sources.insert(source_type, source);
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.register(source);
        self
    }

    /// Get the source of a backend
    ///
    /// # Errors
    /// Returns `JukeboxError::InvalidBackend` if nothing is registered for it
    pub fn get(&self, source_type: SourceType) -> Result<&Arc<dyn MetadataSource>> {
        self.sources
            .get(&source_type)
            .ok_or_else(|| JukeboxError::InvalidBackend(source_type.to_string()))
    }

    pub fn contains(&self, source_type: SourceType) -> bool {
        self.sources.contains_key(&source_type)
    }

    /// Registered backends
    pub fn backends(&self) -> Vec<SourceType> {
        SourceType::ALL
            .into_iter()
            .filter(|source_type| self.contains(*source_type))
            .collect()
    }

    pub fn supports_associated_tracks(&self, source_type: SourceType) -> bool {
        self.sources
            .get(&source_type)
            .is_some_and(|source| source.supports_associated_tracks())
    }

    pub async fn lookup_track(
        &self,
        source_type: SourceType,
        source_id: &str,
    ) -> Result<Option<TrackData>> {
        let source = self.get(source_type)?;
        self.bounded(source_type, source.lookup_track(source_id)).await
    }

    pub async fn search_tracks(
        &self,
        source_type: SourceType,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackData>> {
        let source = self.get(source_type)?;
        self.bounded(source_type, source.search_tracks(query, limit, offset))
            .await
    }

    pub async fn fetch_associated_track(
        &self,
        source_type: SourceType,
        source_id: &str,
    ) -> Result<TrackData> {
        let source = self.get(source_type)?;
        self.bounded(source_type, source.fetch_associated_track(source_id))
            .await
    }

    async fn bounded<T>(
        &self,
        source_type: SourceType,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(JukeboxError::source(
                source_type,
                format!("timed out after {}ms", self.timeout.as_millis()),
            )),
        }
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("backends", &self.backends())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct SlowSource;

    #[async_trait]
    impl MetadataSource for SlowSource {
        fn source_type(&self) -> SourceType {
            SourceType::Youtube
        }

        async fn lookup_track(&self, _source_id: &str) -> Result<Option<TrackData>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn search_tracks(&self, query: &str, _limit: u32, _offset: u32) -> Result<Vec<TrackData>> {
            Ok(vec![TrackData::new(SourceType::Youtube, "yt-1", query)])
        }
    }

    fn registry() -> SourceRegistry {
        SourceRegistry::new(Duration::from_millis(50)).with_source(Arc::new(SlowSource))
    }

    #[tokio::test]
    async fn unregistered_backend_is_invalid() {
        let err = registry()
            .lookup_track(SourceType::Spotify, "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, JukeboxError::InvalidBackend(name) if name == "spotify"));
    }

    #[tokio::test]
    async fn slow_source_times_out_as_source_error() {
        let err = registry()
            .lookup_track(SourceType::Youtube, "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, JukeboxError::Source { ref backend, .. } if backend == "youtube"));
    }

    #[tokio::test]
    async fn default_associated_tracks_is_unsupported() {
        let registry = registry();
        assert!(!registry.supports_associated_tracks(SourceType::Youtube));
        assert!(!registry.supports_associated_tracks(SourceType::Spotify));

        let err = registry
            .fetch_associated_track(SourceType::Youtube, "abc")
            .await
            .unwrap_err();
        assert!(matches!(err, JukeboxError::InvalidBackend(_)));
    }

    #[tokio::test]
    async fn search_passes_through() {
        let results = registry()
            .search_tracks(SourceType::Youtube, "lofi", 10, 0)
            .await
            .unwrap();
        assert_eq!(results[0].name, "lofi");
        assert_eq!(registry().backends(), vec![SourceType::Youtube]);
    }
}
