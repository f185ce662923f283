//! Jukebox Storage
//!
//! `SQLite` persistence for the shared radio queue.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each feature owns its own queries and logic
//! - **Get-or-create**: Tracks, albums and artists are deduplicated by
//!   `(source_type, source_id)` using UNIQUE constraints
//! - **Dense positions**: Every queue mutation that can open a gap renumbers
//!   inside the same transaction
//!
//! # Example
//!
//! ```rust,no_run
//! use jukebox_core::types::{CreateQueue, SourceType, TrackData};
//! use jukebox_storage::{create_pool, run_migrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://jukebox.db", 5).await?;
//! run_migrations(&pool).await?;
//!
//! let data = TrackData::new(SourceType::Spotify, "4uLU6hMCjMI75M1A2tKUQC", "Song");
//! let track = jukebox_storage::tracks::get_or_create(&pool, &data, None).await?;
//! let queue = jukebox_storage::queues::create(
//!     &pool,
//!     CreateQueue { name: "Office".into(), description: None, owner_id: None },
//! )
//! .await?;
//! jukebox_storage::queue_tracks::append(&pool, queue.id, track.id, None, true).await?;
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod playlists;
pub mod queue_history;
pub mod queue_tracks;
pub mod queues;
pub mod tracks;
pub mod users;

pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))
}

/// Create a new `SQLite` pool
///
/// The database file (and its parent directory) is created if missing.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://jukebox.db`)
/// * `max_connections` - Pool size
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the connection fails
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    tracing::info!(max_connections, "SQLite pool ready");

    Ok(pool)
}
