/// API route modules
pub mod health;
pub mod playlists;
pub mod queues;
pub mod search;
pub mod tracks;

use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

/// Every `/api` route, without middleware
pub fn create_router(app_state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        // Queues
        .route("/queues", get(queues::list_queues).post(queues::create_queue))
        .route(
            "/queues/:id",
            get(queues::get_queue).delete(queues::delete_queue),
        )
        .route(
            "/queues/:id/tracks",
            get(queues::list_tracks).post(queues::append_tracks),
        )
        .route(
            "/queues/:id/tracks/:queued_track_id",
            put(queues::move_track).delete(queues::remove_track),
        )
        .route(
            "/queues/:id/head",
            get(queues::get_head)
                .patch(queues::update_head)
                .delete(queues::advance),
        )
        .route("/queues/:id/history", get(queues::history))
        // Playlists
        .route("/playlists", post(playlists::create_playlist))
        .route(
            "/playlists/:id",
            get(playlists::get_playlist).delete(playlists::delete_playlist),
        )
        .route("/playlists/:id/tracks", post(playlists::add_track))
        // Tracks
        .route("/search", get(search::search))
        .route("/tracks/import", post(tracks::import_track))
        .route("/tracks/:id", get(tracks::get_track));

    Router::new().nest("/api", routes).with_state(app_state)
}
