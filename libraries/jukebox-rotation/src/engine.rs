//! The rotation engine
//!
//! Players poll [`RotationEngine::get_head`], post playback state through
//! [`RotationEngine::update_head`] and call [`RotationEngine::advance`] when a
//! track ends. The head cache answers polls between database writes; every
//! miss is resolved from the queue store.
//!
//! # Head resolution
//!
//! ```text
//! get_head ──► cache hit? ──yes──► return
//!                  │ no
//!                  ▼
//!          position 1 row? ──no──► replenish (or QueueEmpty)
//!                  │ yes                 │
//!                  ▼                     ▼
//!          still upstream? ◄─────────────┘
//!             │ yes     │ gone
//!             ▼         ▼
//!           cache    delete track, retry
//! ```

use crate::cache::HeadCache;
use crate::config::{RotationConfig, UpdateMissPolicy};
use crate::notify::Notifier;
use crate::replenish::Purged;
use crate::sources::SourceRegistry;
use jukebox_core::types::{
    AppendRequest, CreateQueue, HeadUpdate, Queue, QueueHistoryEntry, QueueId, QueuedTrack,
    QueuedTrackId, SourceType, Track, TrackData, UserId,
};
use jukebox_core::{Cache, EventStatus, EventSubject, JukeboxError, NotificationPublisher, Result};
use jukebox_storage::{playlists, queue_history, queue_tracks, queues, tracks};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Head resolution, playback updates and rotation for every queue
///
/// Cheap to share behind an `Arc`; holds no lock across calls.
pub struct RotationEngine {
    pool: SqlitePool,
    sources: SourceRegistry,
    cache: HeadCache,
    notifier: Notifier,
    config: RotationConfig,
}

impl RotationEngine {
    pub fn new(
        pool: SqlitePool,
        sources: SourceRegistry,
        cache: Arc<dyn Cache>,
        publisher: Arc<dyn NotificationPublisher>,
        config: RotationConfig,
    ) -> Self {
        Self {
            pool,
            sources,
            cache: HeadCache::new(cache, &config),
            notifier: Notifier::new(publisher),
            config,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn cache(&self) -> &HeadCache {
        &self.cache
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Current head of a queue
    ///
    /// A cached head is returned as is. On a miss the position 1 row is
    /// checked against its backend; tracks the backend reports as gone are
    /// deleted and the next row is tried. An empty queue is replenished when
    /// `allow_auto_fill` is set.
    ///
    /// # Errors
    /// - `JukeboxError::RecordNotFound` if the queue does not exist
    /// - `JukeboxError::QueueEmpty` if nothing is queued and no candidate exists
    pub async fn get_head(&self, queue_id: QueueId, allow_auto_fill: bool) -> Result<QueuedTrack> {
        if let Some(head) = self.cache.get(queue_id).await {
            tracing::debug!(queue_id, queued_track_id = head.id, "Head cache hit");
            return Ok(head);
        }
        tracing::debug!(queue_id, "Head cache miss");

        self.ensure_queue(queue_id).await?;

        let head = self.resolve_head(queue_id, allow_auto_fill).await?;

        self.cache.set_new_head(&head).await;
        self.cache.invalidate_listing(queue_id).await;

        Ok(head)
    }

    async fn resolve_head(&self, queue_id: QueueId, allow_auto_fill: bool) -> Result<QueuedTrack> {
        // Each pass returns or deletes one track, and `purged` keeps artist
        // radio from recreating a deleted one
        let mut purged = Purged::default();
        loop {
            let head = match queue_tracks::head(&self.pool, queue_id).await? {
                Some(head) => head,
                None if allow_auto_fill => {
                    let queued = self.replenish(queue_id, &purged).await?;
                    if !queued.is_head() {
                        // A concurrent append landed first
                        continue;
                    }
                    queued
                }
                None => return Err(JukeboxError::QueueEmpty(queue_id)),
            };

            if self.is_live(&head).await {
                return Ok(head);
            }

            purged.insert(head.track.source_type, &head.track.source_id);
            self.purge(queue_id, &head).await?;
        }
    }

    /// Whether the head's track still exists at its backend
    ///
    /// Only a definite "gone" answer fails validation.
    async fn is_live(&self, head: &QueuedTrack) -> bool {
        if !self.config.validate_heads {
            return true;
        }

        let track = &head.track;
        match self
            .sources
            .lookup_track(track.source_type, &track.source_id)
            .await
        {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(JukeboxError::InvalidBackend(_)) => {
                tracing::debug!(
                    track_id = track.id,
                    backend = %track.source_type,
                    "No source registered, head not validated"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    queue_id = head.queue_id,
                    track_id = track.id,
                    backend = %track.source_type,
                    error = %e,
                    "Head validation failed, keeping track"
                );
                true
            }
        }
    }

    /// Delete a track that vanished upstream, with every queue row holding it
    async fn purge(&self, queue_id: QueueId, head: &QueuedTrack) -> Result<()> {
        let affected = match tracks::delete(&self.pool, head.track.id).await {
            Ok(affected) => affected,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };

        tracing::warn!(
            queue_id,
            track_id = head.track.id,
            backend = %head.track.source_type,
            source_id = %head.track.source_id,
            "Track gone upstream, removed"
        );

        for &affected_queue in &affected {
            self.cache.invalidate(affected_queue).await;
            self.cache.invalidate_listing(affected_queue).await;
            if affected_queue != queue_id {
                self.notifier.mutation(
                    EventSubject::Queue {
                        queue_id: affected_queue,
                    },
                    EventStatus::Updated,
                );
            }
        }

        self.notifier.mutation(
            EventSubject::QueueTrack {
                queue_id,
                queued_track_id: head.id,
                position: head.position,
            },
            EventStatus::Deleted,
        );

        Ok(())
    }

    /// Apply a player's playback state to the cached head
    ///
    /// The database row is never written. An update naming another queued
    /// track is stale and leaves the head untouched. With nothing cached the
    /// outcome follows `update_miss_policy`.
    ///
    /// Returns the head after the update, or `None` when there is no head to
    /// update.
    pub async fn update_head(
        &self,
        queue_id: QueueId,
        update: HeadUpdate,
    ) -> Result<Option<QueuedTrack>> {
        let cached = match self.cache.get(queue_id).await {
            Some(head) => head,
            None => match self.config.update_miss_policy {
                UpdateMissPolicy::Ignore => {
                    tracing::debug!(queue_id, "No cached head, update dropped");
                    return Ok(None);
                }
                UpdateMissPolicy::Resolve => match self.get_head(queue_id, false).await {
                    Ok(head) => head,
                    Err(JukeboxError::QueueEmpty(_)) => return Ok(None),
                    Err(e) => return Err(e),
                },
            },
        };

        if update.id.is_some_and(|id| id != cached.id) {
            tracing::debug!(
                queue_id,
                cached = cached.id,
                requested = ?update.id,
                "Stale head update ignored"
            );
            return Ok(Some(cached));
        }

        let mut updated = cached.clone();
        if let Some(state) = update.state {
            updated.state = Some(state);
        }
        if let Some(time_position) = update.time_position {
            updated.time_position = Some(time_position.max(0));
        }

        self.cache.set_in_flight(&updated).await;

        self.notifier.mutation(
            EventSubject::QueueTrack {
                queue_id,
                queued_track_id: updated.id,
                position: updated.position,
            },
            EventStatus::Updated,
        );
        self.notifier.head_state(&cached, &updated);

        Ok(Some(updated))
    }

    /// Pop the head and return the next one
    ///
    /// The popped track gains one play. When a concurrent advance popped the
    /// same row first, nothing is counted twice and the new head is returned.
    ///
    /// # Errors
    /// - `JukeboxError::RecordNotFound` if the queue does not exist or is empty
    /// - `JukeboxError::QueueEmpty` if the pop emptied the queue and no
    ///   candidate exists
    pub async fn advance(&self, queue_id: QueueId) -> Result<QueuedTrack> {
        self.ensure_queue(queue_id).await?;

        let Some(head) = queue_tracks::head(&self.pool, queue_id).await? else {
            return Err(JukeboxError::not_found(
                "QueuedTrack",
                format!("head of queue {queue_id}"),
            ));
        };

        if queue_tracks::pop(&self.pool, head.id).await? {
            tracing::info!(
                queue_id,
                queued_track_id = head.id,
                track_id = head.track.id,
                "Advanced past head"
            );
            self.cache.set_previous(queue_id, head.track.id).await;
            self.notifier.mutation(
                EventSubject::QueueTrack {
                    queue_id,
                    queued_track_id: head.id,
                    position: head.position,
                },
                EventStatus::Deleted,
            );
        } else {
            tracing::debug!(
                queue_id,
                queued_track_id = head.id,
                "Head already popped by a concurrent advance"
            );
        }

        self.cache.invalidate(queue_id).await;
        self.cache.invalidate_listing(queue_id).await;

        self.get_head(queue_id, true).await
    }

    /// Append a track or a whole playlist to the end of a queue
    ///
    /// Explicit appends are recorded in the queue history and reset the
    /// replenishment pool.
    pub async fn append_tracks(
        &self,
        queue_id: QueueId,
        request: AppendRequest,
        owner_id: Option<UserId>,
    ) -> Result<Vec<QueuedTrack>> {
        self.ensure_queue(queue_id).await?;

        let track_ids = match request {
            AppendRequest::Track(track_id) => vec![track_id],
            AppendRequest::Playlist(playlist_id) => {
                if playlists::get_by_id(&self.pool, playlist_id).await?.is_none() {
                    return Err(JukeboxError::not_found("Playlist", playlist_id));
                }
                playlists::track_ids(&self.pool, playlist_id).await?
            }
        };

        if track_ids.is_empty() {
            return Ok(Vec::new());
        }

        let appended =
            queue_tracks::append_many(&self.pool, queue_id, &track_ids, owner_id, true).await?;

        self.cache.invalidate_pool(queue_id).await;
        self.cache.invalidate_listing(queue_id).await;
        if appended.iter().any(QueuedTrack::is_head) {
            self.cache.invalidate(queue_id).await;
        }

        for queued in &appended {
            self.notifier.mutation(
                EventSubject::QueueTrack {
                    queue_id,
                    queued_track_id: queued.id,
                    position: queued.position,
                },
                EventStatus::Created,
            );
        }

        tracing::info!(queue_id, count = appended.len(), "Tracks appended");

        Ok(appended)
    }

    /// Remove a queued track and close the gap
    pub async fn remove_track(&self, queue_id: QueueId, queued_track_id: QueuedTrackId) -> Result<()> {
        let queued = self.queued_in(queue_id, queued_track_id).await?;

        if !queue_tracks::remove_and_renumber(&self.pool, queued_track_id).await? {
            return Err(JukeboxError::not_found("QueuedTrack", queued_track_id));
        }

        self.cache.invalidate_listing(queue_id).await;
        if queued.is_head() {
            self.cache.invalidate(queue_id).await;
        }

        self.notifier.mutation(
            EventSubject::QueueTrack {
                queue_id,
                queued_track_id,
                position: queued.position,
            },
            EventStatus::Deleted,
        );

        Ok(())
    }

    /// Move a queued track; the position is clamped to the queue
    pub async fn move_track(
        &self,
        queue_id: QueueId,
        queued_track_id: QueuedTrackId,
        position: i64,
    ) -> Result<QueuedTrack> {
        let before = self.queued_in(queue_id, queued_track_id).await?;
        let moved = queue_tracks::move_to(&self.pool, queued_track_id, position).await?;

        self.cache.invalidate_listing(queue_id).await;
        if before.is_head() || moved.is_head() {
            self.cache.invalidate(queue_id).await;
        }

        self.notifier.mutation(
            EventSubject::QueueTrack {
                queue_id,
                queued_track_id,
                position: moved.position,
            },
            EventStatus::Updated,
        );

        Ok(moved)
    }

    /// Queue contents in order, with the live head snapshot at position 1
    pub async fn list_tracks(&self, queue_id: QueueId) -> Result<Vec<QueuedTrack>> {
        let mut listing = match self.cache.get_listing(queue_id).await {
            Some(listing) => listing,
            None => {
                self.ensure_queue(queue_id).await?;
                let listing = queue_tracks::list(&self.pool, queue_id).await?;
                self.cache.set_listing(queue_id, &listing).await;
                listing
            }
        };

        if let Some(head) = self.cache.get(queue_id).await {
            if let Some(first) = listing.first_mut() {
                if first.id == head.id {
                    *first = head;
                }
            }
        }

        Ok(listing)
    }

    pub async fn create_queue(&self, queue: CreateQueue) -> Result<Queue> {
        let queue = queues::create(&self.pool, queue).await?;
        tracing::info!(queue_id = queue.id, name = %queue.name, "Queue created");

        self.notifier.mutation(
            EventSubject::Queue { queue_id: queue.id },
            EventStatus::Created,
        );

        Ok(queue)
    }

    pub async fn get_queue(&self, queue_id: QueueId) -> Result<Queue> {
        queues::get_by_id(&self.pool, queue_id)
            .await?
            .ok_or_else(|| JukeboxError::not_found("Queue", queue_id))
    }

    pub async fn list_queues(&self) -> Result<Vec<Queue>> {
        queues::get_all(&self.pool).await
    }

    /// Delete a queue with its queued tracks and history
    pub async fn delete_queue(&self, queue_id: QueueId) -> Result<()> {
        queues::delete(&self.pool, queue_id).await?;
        self.cache.forget_queue(queue_id).await;

        tracing::info!(queue_id, "Queue deleted");
        self.notifier
            .mutation(EventSubject::Queue { queue_id }, EventStatus::Deleted);

        Ok(())
    }

    /// Most recent history entries of a queue
    pub async fn history(&self, queue_id: QueueId, limit: u32) -> Result<Vec<QueueHistoryEntry>> {
        self.ensure_queue(queue_id).await?;
        queue_history::list(&self.pool, queue_id, limit).await
    }

    /// Search a backend's catalogue
    ///
    /// # Errors
    /// - `JukeboxError::InvalidInput` for a blank query
    /// - `JukeboxError::InvalidBackend` if the backend is not registered
    /// - `JukeboxError::Source` on backend failure or timeout
    pub async fn search(
        &self,
        source_type: SourceType,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackData>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(JukeboxError::invalid_input("search query must not be empty"));
        }

        self.sources
            .search_tracks(source_type, query, limit, offset)
            .await
    }

    /// Search tracks already stored
    pub async fn search_local(&self, query: &str, limit: u32) -> Result<Vec<Track>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(JukeboxError::invalid_input("search query must not be empty"));
        }

        tracks::search(&self.pool, query, limit).await
    }

    /// Store a backend track, looking it up only if it is not known yet
    pub async fn import_track(
        &self,
        source_type: SourceType,
        source_id: &str,
        owner_id: Option<UserId>,
    ) -> Result<Track> {
        if let Some(track) = tracks::find_by_source(&self.pool, source_type, source_id).await? {
            return Ok(track);
        }

        let data = self
            .sources
            .lookup_track(source_type, source_id)
            .await?
            .ok_or_else(|| JukeboxError::not_found("Track", format!("{source_type}:{source_id}")))?;

        let track = tracks::get_or_create(&self.pool, &data, owner_id).await?;
        tracing::info!(track_id = track.id, backend = %source_type, "Track imported");

        Ok(track)
    }

    async fn ensure_queue(&self, queue_id: QueueId) -> Result<()> {
        if queues::exists(&self.pool, queue_id).await? {
            Ok(())
        } else {
            Err(JukeboxError::not_found("Queue", queue_id))
        }
    }

    /// A queued track, provided it belongs to `queue_id`
    async fn queued_in(&self, queue_id: QueueId, queued_track_id: QueuedTrackId) -> Result<QueuedTrack> {
        queue_tracks::get_by_id(&self.pool, queued_track_id)
            .await?
            .filter(|queued| queued.queue_id == queue_id)
            .ok_or_else(|| JukeboxError::not_found("QueuedTrack", queued_track_id))
    }
}
