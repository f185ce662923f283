use jukebox_core::{error::Result, types::*, JukeboxError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Get or create an album keyed by `(source_type, source_id)`
pub async fn get_or_create(pool: &SqlitePool, album: &AlbumData) -> Result<Album> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| JukeboxError::not_saved("Album", e))?;

    let id = get_or_create_with(&mut tx, album).await?;

    tx.commit()
        .await
        .map_err(|e| JukeboxError::not_saved("Album", e))?;

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| JukeboxError::not_found("Album", id))
}

pub(crate) async fn get_or_create_with(
    conn: &mut SqliteConnection,
    album: &AlbumData,
) -> Result<AlbumId> {
    sqlx::query(
        r#"
        INSERT INTO albums (source_type, source_id, name, uri, image_small, image_medium, image_large)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(source_type, source_id) DO NOTHING
        "#,
    )
    .bind(album.source_type.as_str())
    .bind(&album.source_id)
    .bind(&album.name)
    .bind(&album.uri)
    .bind(&album.image_small)
    .bind(&album.image_medium)
    .bind(&album.image_large)
    .execute(&mut *conn)
    .await
    .map_err(|e| JukeboxError::not_saved("Album", e))?;

    let row = sqlx::query("SELECT id FROM albums WHERE source_type = ? AND source_id = ?")
        .bind(album.source_type.as_str())
        .bind(&album.source_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| JukeboxError::not_saved("Album", e))?;

    Ok(row.get("id"))
}

/// Get album by ID
pub async fn get_by_id(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(
        r#"
        SELECT id, source_type, source_id, name, uri,
               image_small, image_medium, image_large, created_at, updated_at
        FROM albums
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(album_from_row).transpose()
}

fn album_from_row(row: &SqliteRow) -> Result<Album> {
    Ok(Album {
        id: row.get("id"),
        source_type: row.get::<String, _>("source_type").parse()?,
        source_id: row.get("source_id"),
        name: row.get("name"),
        uri: row.get("uri"),
        image_small: row.get("image_small"),
        image_medium: row.get("image_medium"),
        image_large: row.get("image_large"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
