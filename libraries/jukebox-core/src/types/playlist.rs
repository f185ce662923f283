//! Playlist types

use super::{TrackId, UserId};
use serde::{Deserialize, Serialize};

pub type PlaylistId = i64;

/// A playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<UserId>,
    pub created_at: String,
    pub updated_at: String,
    pub tracks: Option<Vec<PlaylistTrack>>, // Populated when fetching with tracks
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

/// Track entry in a playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub track_id: TrackId,
    pub position: i64,
    pub added_at: String,
    pub name: Option<String>,
    pub duration_ms: Option<i64>,
}
