//! Queued tracks: the ordered contents of a queue
//!
//! Positions are 1-based and dense. Every transaction here opens with a write
//! so `SQLite` takes the write lock before any read, serializing concurrent
//! mutations of the same database instead of failing them with a stale
//! snapshot.

use crate::{queue_history, tracks};
use jukebox_core::{error::Result, types::*, JukeboxError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

const QUEUED_COLUMNS: &str =
    "id, queue_id, track_id, position, state, time_position, owner_id, created_at, updated_at";

/// `QUEUED_COLUMNS` for reads joined against `tracks t`
const JOINED_COLUMNS: &str = "qt.id AS id, qt.queue_id AS queue_id, qt.track_id AS track_id, \
     qt.position AS position, qt.state AS state, qt.time_position AS time_position, \
     qt.owner_id AS owner_id, qt.created_at AS created_at, qt.updated_at AS updated_at";

/// Append one track at the end of a queue
pub async fn append(
    pool: &SqlitePool,
    queue_id: QueueId,
    track_id: TrackId,
    owner_id: Option<UserId>,
    record_history: bool,
) -> Result<QueuedTrack> {
    append_many(pool, queue_id, &[track_id], owner_id, record_history)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| JukeboxError::not_found("QueuedTrack", track_id))
}

/// Append tracks at the end of a queue, in order, in one transaction
///
/// Each row gets `position = count(existing) + 1`, computed by the INSERT
/// itself. History rows are written alongside when `record_history` is set.
pub async fn append_many(
    pool: &SqlitePool,
    queue_id: QueueId,
    track_ids: &[TrackId],
    owner_id: Option<UserId>,
    record_history: bool,
) -> Result<Vec<QueuedTrack>> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;

    if !touch_queue(&mut tx, queue_id)
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?
    {
        return Err(JukeboxError::not_found("Queue", queue_id));
    }

    let mut ids = Vec::with_capacity(track_ids.len());
    for &track_id in track_ids {
        let exists = sqlx::query("SELECT COUNT(*) AS count FROM tracks WHERE id = ?")
            .bind(track_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?
            .get::<i64, _>("count")
            > 0;
        if !exists {
            return Err(JukeboxError::not_found("Track", track_id));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO queue_tracks (queue_id, track_id, position, owner_id)
            SELECT ?, ?, COUNT(*) + 1, ?
            FROM queue_tracks
            WHERE queue_id = ?
            "#,
        )
        .bind(queue_id)
        .bind(track_id)
        .bind(owner_id)
        .bind(queue_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;
        ids.push(result.last_insert_rowid());

        if record_history {
            queue_history::record_with(&mut tx, queue_id, track_id, owner_id)
                .await
                .map_err(|e| JukeboxError::not_saved("QueueHistory", e))?;
        }
    }

    tx.commit()
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;

    let mut queued = Vec::with_capacity(ids.len());
    for id in ids {
        queued.push(get_required(pool, id).await?);
    }

    Ok(queued)
}

/// Reassign positions 1..N ordered by `(position, id)`
pub async fn renumber(pool: &SqlitePool, queue_id: QueueId) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;

    touch_queue(&mut tx, queue_id)
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;
    renumber_with(&mut tx, queue_id)
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;

    tx.commit()
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))
}

/// Renumber on an open transaction; only rows out of place are written
pub(crate) async fn renumber_with(
    conn: &mut SqliteConnection,
    queue_id: QueueId,
) -> std::result::Result<(), sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, position FROM queue_tracks WHERE queue_id = ? ORDER BY position, id",
    )
    .bind(queue_id)
    .fetch_all(&mut *conn)
    .await?;

    for (index, row) in rows.iter().enumerate() {
        let expected = index as i64 + 1;
        if row.get::<i64, _>("position") != expected {
            sqlx::query(
                "UPDATE queue_tracks SET position = ?, updated_at = datetime('now') WHERE id = ?",
            )
            .bind(expected)
            .bind(row.get::<i64, _>("id"))
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(())
}

/// Delete a queued track without renumbering
///
/// Returns `false` if the row was already gone.
pub async fn remove(pool: &SqlitePool, id: QueuedTrackId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM queue_tracks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    Ok(result.rows_affected() > 0)
}

/// Delete a queued track and close the gap in one transaction
///
/// Returns `false` if the row was already gone.
pub async fn remove_and_renumber(pool: &SqlitePool, id: QueuedTrackId) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    let deleted = sqlx::query("DELETE FROM queue_tracks WHERE id = ? RETURNING queue_id")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    let Some(row) = deleted else {
        return Ok(false);
    };

    renumber_with(&mut tx, row.get("queue_id"))
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    tx.commit()
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    Ok(true)
}

/// Pop a queued track: delete it, count one play and renumber
///
/// Returns `false` if the row was already gone (another consumer popped it).
pub async fn pop(pool: &SqlitePool, id: QueuedTrackId) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    let deleted =
        sqlx::query("DELETE FROM queue_tracks WHERE id = ? RETURNING queue_id, track_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    let Some(row) = deleted else {
        return Ok(false);
    };
    let queue_id: QueueId = row.get("queue_id");
    let track_id: TrackId = row.get("track_id");

    sqlx::query(
        "UPDATE tracks SET play_count = play_count + 1, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(track_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| JukeboxError::not_saved("Track", e))?;

    renumber_with(&mut tx, queue_id)
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    tx.commit()
        .await
        .map_err(|e| JukeboxError::delete_failed("QueuedTrack", e))?;

    Ok(true)
}

/// Move a queued track to a new position, clamped to `1..=N`
pub async fn move_to(pool: &SqlitePool, id: QueuedTrackId, new_position: i64) -> Result<QueuedTrack> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;

    let current = sqlx::query(
        "UPDATE queue_tracks SET updated_at = datetime('now') WHERE id = ? RETURNING queue_id, position",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;

    let Some(current) = current else {
        return Err(JukeboxError::not_found("QueuedTrack", id));
    };
    let queue_id: QueueId = current.get("queue_id");
    let old_position: i64 = current.get("position");

    let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM queue_tracks WHERE queue_id = ?")
        .bind(queue_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?
        .get("count");
    let new_position = new_position.clamp(1, count.max(1));

    if new_position != old_position {
        if new_position < old_position {
            // Moving up: shift tracks down
            sqlx::query(
                r#"
                UPDATE queue_tracks
                SET position = position + 1
                WHERE queue_id = ?
                  AND position >= ?
                  AND position < ?
                "#,
            )
            .bind(queue_id)
            .bind(new_position)
            .bind(old_position)
            .execute(&mut *tx)
            .await
            .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;
        } else {
            // Moving down: shift tracks up
            sqlx::query(
                r#"
                UPDATE queue_tracks
                SET position = position - 1
                WHERE queue_id = ?
                  AND position > ?
                  AND position <= ?
                "#,
            )
            .bind(queue_id)
            .bind(old_position)
            .bind(new_position)
            .execute(&mut *tx)
            .await
            .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;
        }

        sqlx::query("UPDATE queue_tracks SET position = ? WHERE id = ?")
            .bind(new_position)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;
    }

    tx.commit()
        .await
        .map_err(|e| JukeboxError::not_saved("QueuedTrack", e))?;

    get_required(pool, id).await
}

/// Queued track at the lowest position, if any
///
/// Rows whose track has been deleted are skipped, so a purge racing this read
/// yields the next row instead of an error.
pub async fn head(pool: &SqlitePool, queue_id: QueueId) -> Result<Option<QueuedTrack>> {
    let query = format!(
        "SELECT {JOINED_COLUMNS} FROM queue_tracks qt JOIN tracks t ON t.id = qt.track_id \
         WHERE qt.queue_id = ? ORDER BY qt.position, qt.id LIMIT 1"
    );

    // A miss during hydration means the track (and its row) went away after the read
    loop {
        let Some(row) = sqlx::query(&query)
            .bind(queue_id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        if let Some(queued) = queued_from_row(pool, &row).await? {
            return Ok(Some(queued));
        }
        tracing::debug!(queue_id, "Head track vanished during read, retrying");
    }
}

/// Get queued track by ID
///
/// `None` also when the row's track no longer exists.
pub async fn get_by_id(pool: &SqlitePool, id: QueuedTrackId) -> Result<Option<QueuedTrack>> {
    let query = format!("SELECT {QUEUED_COLUMNS} FROM queue_tracks WHERE id = ?");
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

    match row {
        Some(row) => queued_from_row(pool, &row).await,
        None => Ok(None),
    }
}

/// All queued tracks of a queue in play order
pub async fn list(pool: &SqlitePool, queue_id: QueueId) -> Result<Vec<QueuedTrack>> {
    let query = format!(
        "SELECT {JOINED_COLUMNS} FROM queue_tracks qt JOIN tracks t ON t.id = qt.track_id \
         WHERE qt.queue_id = ? ORDER BY qt.position, qt.id"
    );
    let rows = sqlx::query(&query).bind(queue_id).fetch_all(pool).await?;

    let mut queued = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(entry) = queued_from_row(pool, row).await? {
            queued.push(entry);
        }
    }

    Ok(queued)
}

/// Number of queued tracks in a queue
pub async fn count(pool: &SqlitePool, queue_id: QueueId) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM queue_tracks WHERE queue_id = ?")
        .bind(queue_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get("count"))
}

/// Queues holding at least one row for the track
pub async fn queues_referencing_track(pool: &SqlitePool, track_id: TrackId) -> Result<Vec<QueueId>> {
    let rows = sqlx::query(
        "SELECT DISTINCT queue_id FROM queue_tracks WHERE track_id = ? ORDER BY queue_id",
    )
    .bind(track_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("queue_id")).collect())
}

async fn get_required(pool: &SqlitePool, id: QueuedTrackId) -> Result<QueuedTrack> {
    get_by_id(pool, id)
        .await?
        .ok_or_else(|| JukeboxError::not_found("QueuedTrack", id))
}

/// Bump the queue's `updated_at`; opens the write lock. `false` if no such queue.
async fn touch_queue(
    conn: &mut SqliteConnection,
    queue_id: QueueId,
) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE queues SET updated_at = datetime('now') WHERE id = ?")
        .bind(queue_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// `None` when the referenced track is gone
async fn queued_from_row(pool: &SqlitePool, row: &SqliteRow) -> Result<Option<QueuedTrack>> {
    let Some(track) = tracks::find_by_id(pool, row.get("track_id")).await? else {
        return Ok(None);
    };
    let state = row
        .get::<Option<String>, _>("state")
        .as_deref()
        .map(str::parse::<PlayState>)
        .transpose()?;

    Ok(Some(QueuedTrack {
        id: row.get("id"),
        queue_id: row.get("queue_id"),
        track,
        position: row.get("position"),
        state,
        time_position: row.get("time_position"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}
