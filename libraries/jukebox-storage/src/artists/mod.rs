//! Artist get-or-create and lookup

use jukebox_core::{error::Result, types::*, JukeboxError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Get or create artists, returning them in input order
///
/// Duplicated entries in `artists` resolve to the same row.
pub async fn get_or_create_many(pool: &SqlitePool, artists: &[ArtistData]) -> Result<Vec<Artist>> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::not_saved("Artist", e))?;

    let mut ids = Vec::with_capacity(artists.len());
    for artist in artists {
        ids.push(get_or_create_with(&mut tx, artist).await?);
    }

    tx.commit()
        .await
        .map_err(|e| JukeboxError::not_saved("Artist", e))?;

    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        let artist = get_by_id(pool, id)
            .await?
            .ok_or_else(|| JukeboxError::not_found("Artist", id))?;
        result.push(artist);
    }

    Ok(result)
}

/// Get or create a single artist on an open connection (usually a transaction)
pub(crate) async fn get_or_create_with(
    conn: &mut SqliteConnection,
    artist: &ArtistData,
) -> Result<ArtistId> {
    sqlx::query(
        r#"
        INSERT INTO artists (source_type, source_id, name, uri)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(source_type, source_id) DO NOTHING
        "#,
    )
    .bind(artist.source_type.as_str())
    .bind(&artist.source_id)
    .bind(&artist.name)
    .bind(&artist.uri)
    .execute(&mut *conn)
    .await
    .map_err(|e| JukeboxError::not_saved("Artist", e))?;

    let row = sqlx::query("SELECT id FROM artists WHERE source_type = ? AND source_id = ?")
        .bind(artist.source_type.as_str())
        .bind(&artist.source_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| JukeboxError::not_saved("Artist", e))?;

    Ok(row.get("id"))
}

/// Get artist by ID
pub async fn get_by_id(pool: &SqlitePool, id: ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query(
        r#"
        SELECT id, source_type, source_id, name, uri, created_at, updated_at
        FROM artists
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(artist_from_row).transpose()
}

/// Artists linked to a track, primary artist first
pub async fn get_for_track(pool: &SqlitePool, track_id: TrackId) -> Result<Vec<Artist>> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.source_type, a.source_id, a.name, a.uri, a.created_at, a.updated_at
        FROM artists a
        INNER JOIN track_artists ta ON ta.artist_id = a.id
        WHERE ta.track_id = ?
        ORDER BY ta.position, a.id
        "#,
    )
    .bind(track_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(artist_from_row).collect()
}

fn artist_from_row(row: &SqliteRow) -> Result<Artist> {
    Ok(Artist {
        id: row.get("id"),
        source_type: row.get::<String, _>("source_type").parse()?,
        source_id: row.get("source_id"),
        name: row.get("name"),
        uri: row.get("uri"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
