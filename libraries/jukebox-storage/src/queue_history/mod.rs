//! Append-only log of tracks queued by users
//!
//! The history of a queue is the candidate pool for automatic replenishment.

use jukebox_core::{error::Result, types::*, JukeboxError};
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Append a history row
pub async fn record(
    pool: &SqlitePool,
    queue_id: QueueId,
    track_id: TrackId,
    owner_id: Option<UserId>,
) -> Result<()> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| JukeboxError::not_saved("QueueHistory", e))?;

    record_with(&mut conn, queue_id, track_id, owner_id)
        .await
        .map_err(|e| JukeboxError::not_saved("QueueHistory", e))
}

pub(crate) async fn record_with(
    conn: &mut SqliteConnection,
    queue_id: QueueId,
    track_id: TrackId,
    owner_id: Option<UserId>,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO queue_history (queue_id, track_id, owner_id) VALUES (?, ?, ?)")
        .bind(queue_id)
        .bind(track_id)
        .bind(owner_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Distinct track IDs from a queue's history, most recently queued first
pub async fn distinct_tracks(pool: &SqlitePool, queue_id: QueueId) -> Result<Vec<TrackId>> {
    let rows = sqlx::query(
        r#"
        SELECT track_id
        FROM queue_history
        WHERE queue_id = ?
        GROUP BY track_id
        ORDER BY MAX(id) DESC
        "#,
    )
    .bind(queue_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("track_id")).collect())
}

/// Latest history rows of a queue, newest first
pub async fn list(pool: &SqlitePool, queue_id: QueueId, limit: u32) -> Result<Vec<QueueHistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, queue_id, track_id, owner_id, created_at
        FROM queue_history
        WHERE queue_id = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(queue_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| QueueHistoryEntry {
            id: row.get("id"),
            queue_id: row.get("queue_id"),
            track_id: row.get("track_id"),
            owner_id: row.get("owner_id"),
            created_at: row.get("created_at"),
        })
        .collect())
}
