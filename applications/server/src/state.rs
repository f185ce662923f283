/// Shared application state
use crate::config::ServerConfig;
use jukebox_core::NotificationPublisher;
use jukebox_rotation::{MemoryCache, PlaylistService, RotationEngine, SourceRegistry};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RotationEngine>,
    pub playlists: PlaylistService,
}

impl AppState {
    pub fn new(engine: Arc<RotationEngine>, playlists: PlaylistService) -> Self {
        Self { engine, playlists }
    }

    /// Wire the engine and playlist service over one pool and publisher
    pub fn build(
        pool: SqlitePool,
        sources: SourceRegistry,
        publisher: Arc<dyn NotificationPublisher>,
        config: &ServerConfig,
    ) -> Self {
        let engine = RotationEngine::new(
            pool.clone(),
            sources,
            Arc::new(MemoryCache::new(config.cache.capacity)),
            Arc::clone(&publisher),
            config.rotation.clone(),
        );
        let playlists = PlaylistService::new(pool, publisher);

        Self::new(Arc::new(engine), playlists)
    }
}
