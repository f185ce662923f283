use jukebox_core::{error::Result, types::*, JukeboxError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Create new playlist
pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<Playlist> {
    if playlist.name.trim().is_empty() {
        return Err(JukeboxError::invalid_input("playlist name must not be empty"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO playlists (name, description, owner_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(playlist.owner_id)
    .execute(pool)
    .await
    .map_err(|e| JukeboxError::not_saved("Playlist", e))?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| JukeboxError::not_found("Playlist", id))
}

/// Get playlist by ID
pub async fn get_by_id(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, owner_id, created_at, updated_at
        FROM playlists
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(playlist_from_row))
}

/// Get playlist with all tracks
pub async fn get_with_tracks(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let Some(mut playlist) = get_by_id(pool, id).await? else {
        return Ok(None);
    };

    let track_rows = sqlx::query(
        r#"
        SELECT pt.track_id, pt.position, pt.added_at, t.name, t.duration_ms
        FROM playlist_tracks pt
        INNER JOIN tracks t ON pt.track_id = t.id
        WHERE pt.playlist_id = ?
        ORDER BY pt.position
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let tracks = track_rows
        .into_iter()
        .map(|row| PlaylistTrack {
            track_id: row.get("track_id"),
            position: row.get("position"),
            added_at: row.get("added_at"),
            name: Some(row.get("name")),
            duration_ms: Some(row.get("duration_ms")),
        })
        .collect();

    playlist.tracks = Some(tracks);

    Ok(Some(playlist))
}

/// Track IDs of a playlist in order
pub async fn track_ids(pool: &SqlitePool, id: PlaylistId) -> Result<Vec<TrackId>> {
    let rows = sqlx::query(
        "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? ORDER BY position, track_id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("track_id")).collect())
}

/// Add track to the end of a playlist
///
/// Returns `false` if the track was already in the playlist.
pub async fn add_track(pool: &SqlitePool, playlist_id: PlaylistId, track_id: TrackId) -> Result<bool> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::not_saved("PlaylistTrack", e))?;

    let touched = sqlx::query("UPDATE playlists SET updated_at = datetime('now') WHERE id = ?")
        .bind(playlist_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| JukeboxError::not_saved("PlaylistTrack", e))?;

    if touched.rows_affected() == 0 {
        return Err(JukeboxError::not_found("Playlist", playlist_id));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO playlist_tracks (playlist_id, track_id, position)
        SELECT ?, ?, COALESCE(MAX(position), 0) + 1
        FROM playlist_tracks
        WHERE playlist_id = ?
        ON CONFLICT(playlist_id, track_id) DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(track_id)
    .bind(playlist_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| JukeboxError::not_saved("PlaylistTrack", e))?;

    tx.commit()
        .await
        .map_err(|e| JukeboxError::not_saved("PlaylistTrack", e))?;

    Ok(result.rows_affected() > 0)
}

/// Delete playlist
pub async fn delete(pool: &SqlitePool, id: PlaylistId) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| JukeboxError::delete_failed("Playlist", e))?;

    if result.rows_affected() == 0 {
        return Err(JukeboxError::not_found("Playlist", id));
    }

    Ok(())
}

fn playlist_from_row(row: &SqliteRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        tracks: None,
    }
}
