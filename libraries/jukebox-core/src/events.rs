//! Mutation Events
//!
//! Every create/update/delete of a queue, queued track, playlist or playlist
//! track is described by an [`EventSubject`] plus an [`EventStatus`]. The
//! subject is chosen explicitly at the call site and decides the channel the
//! resulting [`Notification`] is published on.

use crate::types::{PlayState, PlaylistId, QueueId, QueuedTrackId, TrackId};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Channel carrying queue and queued-track mutations
pub const QUEUES_CHANNEL: &str = "queues";

/// Channel carrying playlist and playlist-track mutations
pub const PLAYLISTS_CHANNEL: &str = "playlists";

/// Channel carrying head playback-state changes
pub const QUEUE_HEADS_CHANNEL: &str = "queue-heads";

/// Kind of mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Entity was inserted
    Created,
    /// Entity was modified in place
    Updated,
    /// Entity was removed
    Deleted,
}

/// Entity a mutation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    /// A queue itself
    Queue {
        /// Queue id
        queue_id: QueueId,
    },

    /// A track occupying a position in a queue
    QueueTrack {
        /// Owning queue
        queue_id: QueueId,
        /// Queued track row id
        queued_track_id: QueuedTrackId,
        /// Position at the time of the mutation
        position: i64,
    },

    /// A playlist itself
    Playlist {
        /// Playlist id
        playlist_id: PlaylistId,
    },

    /// A track entry in a playlist
    PlaylistTrack {
        /// Owning playlist
        playlist_id: PlaylistId,
        /// Track id
        track_id: TrackId,
    },
}

impl EventSubject {
    /// Channel notifications about this subject are published on
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Queue { .. } | Self::QueueTrack { .. } => QUEUES_CHANNEL,
            Self::Playlist { .. } | Self::PlaylistTrack { .. } => PLAYLISTS_CHANNEL,
        }
    }

    /// Whether the subject is a track inside a container
    pub fn is_track(&self) -> bool {
        matches!(self, Self::QueueTrack { .. } | Self::PlaylistTrack { .. })
    }

    /// Whether the subject is the head row of a queue
    pub fn is_queue_head(&self) -> bool {
        matches!(self, Self::QueueTrack { position: 1, .. })
    }

    /// Build the generic notification payload for this subject
    pub fn notification(&self, status: EventStatus) -> Notification {
        let data = match self {
            Self::Queue { queue_id } | Self::QueueTrack { queue_id, .. } => {
                json!({ "queue_id": queue_id, "is_track": self.is_track() })
            }
            Self::Playlist { playlist_id } | Self::PlaylistTrack { playlist_id, .. } => {
                json!({ "playlist_id": playlist_id, "is_track": self.is_track() })
            }
        };

        Notification { status, data }
    }
}

/// Payload published to a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Kind of mutation
    pub status: EventStatus,
    /// Subject-specific data
    pub data: serde_json::Value,
}

impl Notification {
    /// Head playback-state change for the `queue-heads` channel
    pub fn head_state(
        queue_id: QueueId,
        queued_track_id: QueuedTrackId,
        state: Option<PlayState>,
    ) -> Self {
        Self {
            status: EventStatus::Updated,
            data: json!({
                "queue_id": queue_id,
                "queued_track_id": queued_track_id,
                "state": state,
            }),
        }
    }
}
