/// Health check API routes
use crate::state::AppState;
use axum::{extract::State, Json};
use jukebox_core::types::SourceType;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Backends with a registered metadata source
    pub backends: Vec<SourceType>,
}

/// GET /api/health - Health check endpoint
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends: app_state.engine.sources().backends(),
    })
}
