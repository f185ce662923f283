//! Jukebox Core
//!
//! Storage-agnostic types, traits, and error handling for the shared radio queue.
//!
//! This crate provides the building blocks used by the storage layer, the
//! rotation engine and the HTTP server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Queue`, `QueuedTrack`, `Playlist`, etc.
//! - **Collaborator Traits**: `MetadataSource`, `Cache`, `NotificationPublisher`
//! - **Events**: `EventSubject` and the `Notification` payload published on mutation
//! - **Error Handling**: Unified `JukeboxError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use jukebox_core::types::{AppendRequest, SourceType, TrackData};
//!
//! let data = TrackData::new(SourceType::Spotify, "4uLU6hMCjMI75M1A2tKUQC", "Never Gonna Give You Up")
//!     .with_duration_ms(213_000);
//! assert_eq!(data.duration_ms, 213_000);
//!
//! let request: AppendRequest = serde_json::from_str(r#"{"track": 5}"#).unwrap();
//! assert_eq!(request, AppendRequest::Track(5));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{BoxError, JukeboxError, Result};
pub use events::{EventStatus, EventSubject, Notification};
pub use traits::{Cache, MetadataSource, NotificationPublisher};

pub use types::{
    Album, AlbumData, AlbumId, AppendRequest, Artist, ArtistData, ArtistId, CreatePlaylist,
    CreateQueue, HeadUpdate, PlayState, Playlist, PlaylistId, PlaylistTrack, Queue,
    QueueHistoryEntry, QueueId, QueuedTrack, QueuedTrackId, SourceType, Track, TrackData, TrackId,
    User, UserId,
};
