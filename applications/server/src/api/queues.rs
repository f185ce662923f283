/// Queue API routes: contents, head and history
use crate::{error::Result, error::ServerError, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jukebox_core::types::{
    AppendRequest, CreateQueue, HeadUpdate, PlaylistId, Queue, QueueHistoryEntry, QueueId,
    QueuedTrack, QueuedTrackId, TrackId, UserId,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppendTracksRequest {
    #[serde(default)]
    pub track: Option<TrackId>,
    #[serde(default)]
    pub playlist: Option<PlaylistId>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

impl AppendTracksRequest {
    fn append_request(&self) -> Result<AppendRequest> {
        match (self.track, self.playlist) {
            (Some(track_id), None) => Ok(AppendRequest::Track(track_id)),
            (None, Some(playlist_id)) => Ok(AppendRequest::Playlist(playlist_id)),
            _ => Err(ServerError::BadRequest(
                "exactly one of `track` or `playlist` is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveTrackRequest {
    pub position: i64,
}

#[derive(Debug, Deserialize)]
pub struct HeadQuery {
    /// Replenish an empty queue (default true)
    #[serde(default = "default_autofill")]
    pub autofill: bool,
}

fn default_autofill() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    50
}

/// GET /api/queues
pub async fn list_queues(State(app_state): State<AppState>) -> Result<Json<Vec<Queue>>> {
    let queues = app_state.engine.list_queues().await?;
    Ok(Json(queues))
}

/// POST /api/queues
pub async fn create_queue(
    State(app_state): State<AppState>,
    Json(req): Json<CreateQueue>,
) -> Result<(StatusCode, Json<Queue>)> {
    let queue = app_state.engine.create_queue(req).await?;
    Ok((StatusCode::CREATED, Json(queue)))
}

/// GET /api/queues/:id
pub async fn get_queue(
    Path(id): Path<QueueId>,
    State(app_state): State<AppState>,
) -> Result<Json<Queue>> {
    let queue = app_state.engine.get_queue(id).await?;
    Ok(Json(queue))
}

/// DELETE /api/queues/:id
pub async fn delete_queue(
    Path(id): Path<QueueId>,
    State(app_state): State<AppState>,
) -> Result<StatusCode> {
    app_state.engine.delete_queue(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/queues/:id/tracks
pub async fn list_tracks(
    Path(id): Path<QueueId>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<QueuedTrack>>> {
    let tracks = app_state.engine.list_tracks(id).await?;
    Ok(Json(tracks))
}

/// POST /api/queues/:id/tracks
/// Body: `{"track": id}` or `{"playlist": id}`, optional `owner_id`
pub async fn append_tracks(
    Path(id): Path<QueueId>,
    State(app_state): State<AppState>,
    Json(req): Json<AppendTracksRequest>,
) -> Result<(StatusCode, Json<Vec<QueuedTrack>>)> {
    let request = req.append_request()?;
    let appended = app_state
        .engine
        .append_tracks(id, request, req.owner_id)
        .await?;
    Ok((StatusCode::CREATED, Json(appended)))
}

/// PUT /api/queues/:id/tracks/:queued_track_id
pub async fn move_track(
    Path((id, queued_track_id)): Path<(QueueId, QueuedTrackId)>,
    State(app_state): State<AppState>,
    Json(req): Json<MoveTrackRequest>,
) -> Result<Json<QueuedTrack>> {
    let moved = app_state
        .engine
        .move_track(id, queued_track_id, req.position)
        .await?;
    Ok(Json(moved))
}

/// DELETE /api/queues/:id/tracks/:queued_track_id
pub async fn remove_track(
    Path((id, queued_track_id)): Path<(QueueId, QueuedTrackId)>,
    State(app_state): State<AppState>,
) -> Result<StatusCode> {
    app_state.engine.remove_track(id, queued_track_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/queues/:id/head
/// What is playing now; `?autofill=false` reports an empty queue instead of refilling it
pub async fn get_head(
    Path(id): Path<QueueId>,
    Query(query): Query<HeadQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<QueuedTrack>> {
    let head = app_state.engine.get_head(id, query.autofill).await?;
    Ok(Json(head))
}

/// PATCH /api/queues/:id/head
/// Playback state from a player; 204 when there is no head to update
pub async fn update_head(
    Path(id): Path<QueueId>,
    State(app_state): State<AppState>,
    Json(update): Json<HeadUpdate>,
) -> Result<Response> {
    let response = match app_state.engine.update_head(id, update).await? {
        Some(head) => Json(head).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    };
    Ok(response)
}

/// DELETE /api/queues/:id/head
/// Advance past the head and return the next one
pub async fn advance(
    Path(id): Path<QueueId>,
    State(app_state): State<AppState>,
) -> Result<Json<QueuedTrack>> {
    let next = app_state.engine.advance(id).await?;
    Ok(Json(next))
}

/// GET /api/queues/:id/history
pub async fn history(
    Path(id): Path<QueueId>,
    Query(query): Query<HistoryQuery>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<QueueHistoryEntry>>> {
    let entries = app_state.engine.history(id, query.limit).await?;
    Ok(Json(entries))
}
