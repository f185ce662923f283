use jukebox_core::{error::Result, types::*, JukeboxError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Create a new queue
pub async fn create(pool: &SqlitePool, queue: CreateQueue) -> Result<Queue> {
    if queue.name.trim().is_empty() {
        return Err(JukeboxError::invalid_input("queue name must not be empty"));
    }

    let result = sqlx::query("INSERT INTO queues (name, description, owner_id) VALUES (?, ?, ?)")
        .bind(&queue.name)
        .bind(&queue.description)
        .bind(queue.owner_id)
        .execute(pool)
        .await
        .map_err(|e| JukeboxError::not_saved("Queue", e))?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| JukeboxError::not_found("Queue", id))
}

/// Get queue by ID
pub async fn get_by_id(pool: &SqlitePool, id: QueueId) -> Result<Option<Queue>> {
    let row = sqlx::query(
        "SELECT id, name, description, owner_id, created_at, updated_at FROM queues WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(queue_from_row))
}

/// Get all queues
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Queue>> {
    let rows = sqlx::query(
        "SELECT id, name, description, owner_id, created_at, updated_at FROM queues ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(queue_from_row).collect())
}

/// Whether a queue exists
pub async fn exists(pool: &SqlitePool, id: QueueId) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM queues WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count") > 0)
}

/// Delete a queue with its queued tracks and history
pub async fn delete(pool: &SqlitePool, id: QueueId) -> Result<()> {
    let result = sqlx::query("DELETE FROM queues WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| JukeboxError::delete_failed("Queue", e))?;

    if result.rows_affected() == 0 {
        return Err(JukeboxError::not_found("Queue", id));
    }

    Ok(())
}

fn queue_from_row(row: &SqliteRow) -> Queue {
    Queue {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
