//! Track metadata: get-or-create, hydration, play counts

use crate::{albums, artists, queue_tracks};
use jukebox_core::{error::Result, types::*, JukeboxError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const TRACK_COLUMNS: &str = r#"
    t.id, t.source_type, t.source_id, t.name, t.duration_ms, t.preview_url,
    t.track_number, t.image_small, t.image_medium, t.image_large, t.uri,
    t.play_count, t.album_id, t.owner_id, t.created_at, t.updated_at
"#;

/// Get or create a track with its album and artists
///
/// Album, artists, the track row and the artist links are written in one
/// transaction. A concurrent caller with the same `(source_type, source_id)`
/// resolves to the same row. Metadata of an existing track is left untouched.
pub async fn get_or_create(
    pool: &SqlitePool,
    data: &TrackData,
    owner_id: Option<UserId>,
) -> Result<Track> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::not_saved("Track", e))?;

    let album_id = match &data.album {
        Some(album) => Some(albums::get_or_create_with(&mut tx, album).await?),
        None => None,
    };

    let mut artist_ids = Vec::with_capacity(data.artists.len());
    for artist in &data.artists {
        artist_ids.push(artists::get_or_create_with(&mut tx, artist).await?);
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO tracks (
            source_type, source_id, name, duration_ms, preview_url, track_number,
            image_small, image_medium, image_large, uri, album_id, owner_id
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(source_type, source_id) DO NOTHING
        "#,
    )
    .bind(data.source_type.as_str())
    .bind(&data.source_id)
    .bind(&data.name)
    .bind(data.duration_ms)
    .bind(&data.preview_url)
    .bind(data.track_number)
    .bind(&data.image_small)
    .bind(&data.image_medium)
    .bind(&data.image_large)
    .bind(&data.uri)
    .bind(album_id)
    .bind(owner_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| JukeboxError::not_saved("Track", e))?
    .rows_affected()
        > 0;

    let row = sqlx::query("SELECT id FROM tracks WHERE source_type = ? AND source_id = ?")
        .bind(data.source_type.as_str())
        .bind(&data.source_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| JukeboxError::not_saved("Track", e))?;
    let track_id: TrackId = row.get("id");

    if inserted {
        for (position, artist_id) in artist_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO track_artists (track_id, artist_id, position)
                VALUES (?, ?, ?)
                ON CONFLICT(track_id, artist_id) DO NOTHING
                "#,
            )
            .bind(track_id)
            .bind(artist_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| JukeboxError::not_saved("Track", e))?;
        }
    }

    tx.commit()
        .await
        .map_err(|e| JukeboxError::not_saved("Track", e))?;

    if inserted {
        tracing::debug!(track_id, source = %data.source_type, source_id = %data.source_id, "Track created");
    }

    get_by_id(pool, track_id).await
}

/// Get a hydrated track by ID
pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Track> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| JukeboxError::not_found("Track", id))
}

/// Get a hydrated track by ID, `None` if absent
pub async fn find_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let query = format!("SELECT {TRACK_COLUMNS} FROM tracks t WHERE t.id = ?");
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

    match row {
        Some(row) => Ok(Some(hydrate(pool, &row).await?)),
        None => Ok(None),
    }
}

/// Find a track by its backend identity
pub async fn find_by_source(
    pool: &SqlitePool,
    source_type: SourceType,
    source_id: &str,
) -> Result<Option<Track>> {
    let query = format!(
        "SELECT {TRACK_COLUMNS} FROM tracks t WHERE t.source_type = ? AND t.source_id = ?"
    );
    let row = sqlx::query(&query)
        .bind(source_type.as_str())
        .bind(source_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(hydrate(pool, &row).await?)),
        None => Ok(None),
    }
}

/// Atomically add one play to a track
pub async fn increment_play_count(pool: &SqlitePool, id: TrackId) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tracks SET play_count = play_count + 1, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| JukeboxError::not_saved("Track", e))?;

    if result.rows_affected() == 0 {
        return Err(JukeboxError::not_found("Track", id));
    }

    Ok(())
}

/// IDs of the globally least-played tracks
pub async fn least_played(pool: &SqlitePool, limit: u32) -> Result<Vec<TrackId>> {
    let rows = sqlx::query("SELECT id FROM tracks ORDER BY play_count ASC, id ASC LIMIT ?")
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("id")).collect())
}

/// Delete a track and renumber every queue that held it
///
/// Queued tracks, history rows, playlist entries and artist links go with it.
/// Returns the queues whose composition changed.
pub async fn delete(pool: &SqlitePool, id: TrackId) -> Result<Vec<QueueId>> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::delete_failed("Track", e))?;

    // Write first so the transaction holds the write lock before reading
    let touched = sqlx::query("UPDATE tracks SET updated_at = datetime('now') WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| JukeboxError::delete_failed("Track", e))?;

    if touched.rows_affected() == 0 {
        return Err(JukeboxError::not_found("Track", id));
    }

    let queue_ids: Vec<QueueId> =
        sqlx::query("SELECT DISTINCT queue_id FROM queue_tracks WHERE track_id = ? ORDER BY queue_id")
            .bind(id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| JukeboxError::delete_failed("Track", e))?
            .into_iter()
            .map(|row| row.get("queue_id"))
            .collect();

    sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| JukeboxError::delete_failed("Track", e))?;

    for queue_id in &queue_ids {
        queue_tracks::renumber_with(&mut tx, *queue_id)
            .await
            .map_err(|e| JukeboxError::delete_failed("Track", e))?;
    }

    tx.commit()
        .await
        .map_err(|e| JukeboxError::delete_failed("Track", e))?;

    tracing::debug!(track_id = id, queues = queue_ids.len(), "Track deleted");

    Ok(queue_ids)
}

/// Search stored tracks by track, artist or album name
pub async fn search(pool: &SqlitePool, query: &str, limit: u32) -> Result<Vec<Track>> {
    let pattern = format!("%{}%", query.trim());
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT t.id, t.play_count
        FROM tracks t
        LEFT JOIN albums al ON al.id = t.album_id
        LEFT JOIN track_artists ta ON ta.track_id = t.id
        LEFT JOIN artists ar ON ar.id = ta.artist_id
        WHERE t.name LIKE ? OR ar.name LIKE ? OR al.name LIKE ?
        ORDER BY t.play_count DESC, t.id ASC
        LIMIT ?
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    let mut tracks = Vec::with_capacity(rows.len());
    for row in rows {
        tracks.push(get_by_id(pool, row.get("id")).await?);
    }

    Ok(tracks)
}

async fn hydrate(pool: &SqlitePool, row: &SqliteRow) -> Result<Track> {
    let id: TrackId = row.get("id");
    let album_id: Option<AlbumId> = row.get("album_id");

    let album = match album_id {
        Some(album_id) => albums::get_by_id(pool, album_id).await?,
        None => None,
    };
    let artists = artists::get_for_track(pool, id).await?;

    Ok(Track {
        id,
        source_type: row.get::<String, _>("source_type").parse()?,
        source_id: row.get("source_id"),
        name: row.get("name"),
        duration_ms: row.get("duration_ms"),
        preview_url: row.get("preview_url"),
        track_number: row.get("track_number"),
        image_small: row.get("image_small"),
        image_medium: row.get("image_medium"),
        image_large: row.get("image_large"),
        uri: row.get("uri"),
        play_count: row.get("play_count"),
        owner_id: row.get("owner_id"),
        album,
        artists,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
