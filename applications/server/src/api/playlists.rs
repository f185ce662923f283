/// Playlists API routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use jukebox_core::types::{CreatePlaylist, Playlist, PlaylistId, TrackId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: TrackId,
}

/// POST /api/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    Json(req): Json<CreatePlaylist>,
) -> Result<(StatusCode, Json<Playlist>)> {
    let playlist = app_state.playlists.create(req).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/:id
/// Get playlist details with tracks
pub async fn get_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
) -> Result<Json<Playlist>> {
    let playlist = app_state.playlists.get(id).await?;
    Ok(Json(playlist))
}

/// POST /api/playlists/:id/tracks
pub async fn add_track(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
    Json(req): Json<AddTrackRequest>,
) -> Result<Json<Playlist>> {
    let playlist = app_state.playlists.add_track(id, req.track_id).await?;
    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    Path(id): Path<PlaylistId>,
    State(app_state): State<AppState>,
) -> Result<StatusCode> {
    app_state.playlists.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
