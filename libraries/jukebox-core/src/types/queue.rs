//! Queue types
//!
//! A queue is an ordered list of `QueuedTrack` rows. Position 1 is the head
//! ("now playing"); positions are dense and 1-based.

use super::{PlaylistId, Track, TrackId, UserId};
use crate::error::JukeboxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type QueueId = i64;
pub type QueuedTrackId = i64;

/// A shared playback queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub id: QueueId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<UserId>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
}

/// Playback state reported by a player for the head track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Playing,
    Paused,
    Stopped,
}

impl PlayState {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayState {
    type Err = JukeboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playing" => Ok(Self::Playing),
            "paused" => Ok(Self::Paused),
            "stopped" => Ok(Self::Stopped),
            other => Err(JukeboxError::invalid_input(format!(
                "unknown playback state: {other}"
            ))),
        }
    }
}

/// A track occupying a position in a queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedTrack {
    pub id: QueuedTrackId,
    pub queue_id: QueueId,
    pub track: Track,

    /// 1-based position, 1 = head
    pub position: i64,

    /// Playback state, only ever set on the cached head snapshot
    pub state: Option<PlayState>,

    /// Milliseconds elapsed in the track
    pub time_position: Option<i64>,

    pub owner_id: Option<UserId>,
    pub created_at: String,
    pub updated_at: String,
}

impl QueuedTrack {
    /// Whether this row is the head of its queue
    pub fn is_head(&self) -> bool {
        self.position == 1
    }

    /// Whether the player reported this track as playing
    pub fn is_playing(&self) -> bool {
        self.state == Some(PlayState::Playing)
    }

    /// Milliseconds left until the track ends, never negative
    pub fn remaining_ms(&self) -> i64 {
        (self.track.duration_ms - self.time_position.unwrap_or(0)).max(0)
    }
}

/// Partial update posted by a player for the current head
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadUpdate {
    /// Queued track the player believes is the head; mismatches are ignored
    #[serde(default)]
    pub id: Option<QueuedTrackId>,
    #[serde(default)]
    pub state: Option<PlayState>,
    #[serde(default)]
    pub time_position: Option<i64>,
}

/// What to append to a queue: `{"track": id}` or `{"playlist": id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppendRequest {
    Track(TrackId),
    Playlist(PlaylistId),
}

/// One row of the append-only queue history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueHistoryEntry {
    pub id: i64,
    pub queue_id: QueueId,
    pub track_id: TrackId,
    pub owner_id: Option<UserId>,
    pub created_at: String,
}
