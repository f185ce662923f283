//! Playlist operations that publish on the `playlists` channel

use crate::notify::Notifier;
use jukebox_core::types::{CreatePlaylist, Playlist, PlaylistId, TrackId};
use jukebox_core::{EventStatus, EventSubject, JukeboxError, NotificationPublisher, Result};
use jukebox_storage::{playlists, tracks};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct PlaylistService {
    pool: SqlitePool,
    notifier: Notifier,
}

impl PlaylistService {
    pub fn new(pool: SqlitePool, publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self {
            pool,
            notifier: Notifier::new(publisher),
        }
    }

    pub async fn create(&self, playlist: CreatePlaylist) -> Result<Playlist> {
        let playlist = playlists::create(&self.pool, playlist).await?;
        tracing::info!(playlist_id = playlist.id, name = %playlist.name, "Playlist created");

        self.notifier.mutation(
            EventSubject::Playlist {
                playlist_id: playlist.id,
            },
            EventStatus::Created,
        );

        Ok(playlist)
    }

    /// Playlist with its tracks in order
    pub async fn get(&self, playlist_id: PlaylistId) -> Result<Playlist> {
        playlists::get_with_tracks(&self.pool, playlist_id)
            .await?
            .ok_or_else(|| JukeboxError::not_found("Playlist", playlist_id))
    }

    /// Add a track at the end; adding a track twice is a no-op
    pub async fn add_track(&self, playlist_id: PlaylistId, track_id: TrackId) -> Result<Playlist> {
        if tracks::find_by_id(&self.pool, track_id).await?.is_none() {
            return Err(JukeboxError::not_found("Track", track_id));
        }

        if playlists::add_track(&self.pool, playlist_id, track_id).await? {
            tracing::debug!(playlist_id, track_id, "Track added to playlist");
            self.notifier.mutation(
                EventSubject::PlaylistTrack {
                    playlist_id,
                    track_id,
                },
                EventStatus::Created,
            );
        }

        self.get(playlist_id).await
    }

    pub async fn delete(&self, playlist_id: PlaylistId) -> Result<()> {
        playlists::delete(&self.pool, playlist_id).await?;
        self.notifier
            .mutation(EventSubject::Playlist { playlist_id }, EventStatus::Deleted);
        Ok(())
    }
}
