/// Search API route
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use jukebox_core::types::{SourceType, Track, TrackData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Backend to search; stored tracks are searched when absent
    pub source: Option<String>,
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Remote(Vec<TrackData>),
    Local(Vec<Track>),
}

/// GET /api/search?source=&q=&limit=&offset=
pub async fn search(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>> {
    let results = match query.source.as_deref() {
        Some(source) => {
            let source_type: SourceType = source.parse()?;
            let hits = app_state
                .engine
                .search(source_type, &query.q, query.limit, query.offset)
                .await?;
            SearchResults::Remote(hits)
        }
        None => SearchResults::Local(app_state.engine.search_local(&query.q, query.limit).await?),
    };

    Ok(Json(results))
}
