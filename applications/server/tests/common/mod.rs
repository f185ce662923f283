/// Common test utilities and fixtures
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jukebox_core::types::{ArtistData, SourceType, Track, TrackData};
use jukebox_core::{JukeboxError, MetadataSource};
use jukebox_rotation::{SourceRegistry, TracingPublisher};
use jukebox_server::{config::ServerConfig, create_router, state::AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Spotify stand-in: ids starting with `gone` do not exist, queries
/// containing `outage` fail
pub struct StubSpotify;

#[async_trait]
impl MetadataSource for StubSpotify {
    fn source_type(&self) -> SourceType {
        SourceType::Spotify
    }

    async fn lookup_track(&self, source_id: &str) -> jukebox_core::Result<Option<TrackData>> {
        if source_id.starts_with("gone") {
            return Ok(None);
        }
        Ok(Some(
            TrackData::new(SourceType::Spotify, source_id, format!("Song {source_id}"))
                .with_duration_ms(200_000)
                .with_artist(ArtistData::new(SourceType::Spotify, "band", "The Band")),
        ))
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        _offset: u32,
    ) -> jukebox_core::Result<Vec<TrackData>> {
        if query.contains("outage") {
            return Err(JukeboxError::source(SourceType::Spotify, "502 Bad Gateway"));
        }
        Ok((0..limit)
            .map(|i| TrackData::new(SourceType::Spotify, format!("s{i}"), format!("{query} {i}")))
            .collect())
    }
}

/// Router over a temporary database; keep the `TempDir` alive for the test
pub async fn create_test_app() -> (Router, SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}", temp_dir.path().join("api.db").display());

    let pool = jukebox_storage::create_pool(&db_url, 5).await.unwrap();
    jukebox_storage::run_migrations(&pool).await.unwrap();

    let config = ServerConfig::default();
    let sources =
        SourceRegistry::new(config.rotation.source_timeout()).with_source(Arc::new(StubSpotify));
    let app_state = AppState::build(pool.clone(), sources, Arc::new(TracingPublisher), &config);

    (create_router(app_state), pool, temp_dir)
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

/// Test fixture: Store a Spotify track
pub async fn create_test_track(pool: &SqlitePool, source_id: &str) -> Track {
    let data = TrackData::new(SourceType::Spotify, source_id, format!("Song {source_id}"))
        .with_duration_ms(200_000);
    jukebox_storage::tracks::get_or_create(pool, &data, None)
        .await
        .unwrap()
}
