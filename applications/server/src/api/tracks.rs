/// Tracks API routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use jukebox_core::types::{SourceType, Track, TrackId, UserId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ImportTrackRequest {
    pub source: SourceType,
    pub source_id: String,
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

/// POST /api/tracks/import
/// Store a backend track (looked up only if unknown)
pub async fn import_track(
    State(app_state): State<AppState>,
    Json(req): Json<ImportTrackRequest>,
) -> Result<Json<Track>> {
    let track = app_state
        .engine
        .import_track(req.source, &req.source_id, req.owner_id)
        .await?;
    Ok(Json(track))
}

/// GET /api/tracks/:id
pub async fn get_track(
    Path(id): Path<TrackId>,
    State(app_state): State<AppState>,
) -> Result<Json<Track>> {
    let track = jukebox_storage::tracks::get_by_id(app_state.engine.pool(), id).await?;
    Ok(Json(track))
}
