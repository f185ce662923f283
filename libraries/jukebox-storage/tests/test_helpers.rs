//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! so every pool connection sees the same database, migrations and constraints.

#![allow(dead_code)]

use jukebox_core::types::*;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = jukebox_storage::create_pool(&db_url, 5)
            .await
            .expect("Failed to create pool");

        jukebox_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Test fixture: Create a test user
pub async fn create_test_user(pool: &SqlitePool, name: &str) -> UserId {
    jukebox_storage::users::create(pool, name)
        .await
        .expect("Failed to create test user")
        .id
}

/// Test fixture: Create a test queue
pub async fn create_test_queue(pool: &SqlitePool, name: &str) -> QueueId {
    jukebox_storage::queues::create(
        pool,
        CreateQueue {
            name: name.to_string(),
            description: None,
            owner_id: None,
        },
    )
    .await
    .expect("Failed to create test queue")
    .id
}

/// Test fixture: Create a Spotify track with one artist
pub async fn create_test_track(pool: &SqlitePool, source_id: &str, name: &str) -> Track {
    let data = TrackData::new(SourceType::Spotify, source_id, name)
        .with_duration_ms(200_000)
        .with_artist(ArtistData::new(
            SourceType::Spotify,
            format!("artist-{source_id}"),
            format!("Artist of {name}"),
        ));

    jukebox_storage::tracks::get_or_create(pool, &data, None)
        .await
        .expect("Failed to create test track")
}

/// Positions of a queue in play order
pub async fn positions(pool: &SqlitePool, queue_id: QueueId) -> Vec<i64> {
    jukebox_storage::queue_tracks::list(pool, queue_id)
        .await
        .expect("Failed to list queue")
        .into_iter()
        .map(|queued| queued.position)
        .collect()
}

/// Track IDs of a queue in play order
pub async fn queued_track_ids(pool: &SqlitePool, queue_id: QueueId) -> Vec<TrackId> {
    jukebox_storage::queue_tracks::list(pool, queue_id)
        .await
        .expect("Failed to list queue")
        .into_iter()
        .map(|queued| queued.track.id)
        .collect()
}
