//! Refilling an empty queue
//!
//! The history pick draws from a shrinking per-queue pool cached under
//! `queue:{id}:pool`: the queue's distinct history, or the globally
//! least-played tracks when the queue has none. Artist radio asks the
//! previous track's backend for a related track and falls back to the
//! history pick on any failure.
//!
//! A head resolution that keeps finding gone tracks must still end. Tracks
//! purged during one resolution are remembered in [`Purged`]: artist radio may
//! not bring them back, and after [`ARTIST_RADIO_PURGE_BUDGET`] purges it is
//! skipped for the rest of the resolution.

use crate::config::ReplenishStrategy;
use crate::engine::RotationEngine;
use jukebox_core::types::{QueueId, QueuedTrack, SourceType, TrackData, TrackId};
use jukebox_core::{EventStatus, EventSubject, JukeboxError, Result};
use jukebox_storage::{queue_history, queue_tracks, tracks};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Purges tolerated in one head resolution before artist radio is skipped
pub(crate) const ARTIST_RADIO_PURGE_BUDGET: usize = 3;

/// Backend identities of the tracks removed during one head resolution
#[derive(Debug, Default)]
pub(crate) struct Purged {
    keys: HashSet<(SourceType, String)>,
}

impl Purged {
    pub(crate) fn insert(&mut self, source_type: SourceType, source_id: &str) {
        self.keys.insert((source_type, source_id.to_string()));
    }

    pub(crate) fn contains(&self, data: &TrackData) -> bool {
        self.keys.contains(&(data.source_type, data.source_id.clone()))
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    fn radio_exhausted(&self) -> bool {
        self.len() >= ARTIST_RADIO_PURGE_BUDGET
    }
}

/// Pick a candidate uniformly at random
///
/// `previous` is excluded while the pool holds more than one candidate.
pub(crate) fn choose_candidate(pool: &[TrackId], previous: Option<TrackId>) -> Option<TrackId> {
    let eligible: Vec<TrackId> = match previous {
        Some(previous) if pool.len() > 1 => pool
            .iter()
            .copied()
            .filter(|id| *id != previous)
            .collect(),
        _ => pool.to_vec(),
    };

    // A pool made only of repeats of `previous` still has to yield something
    let eligible = if eligible.is_empty() { pool } else { eligible.as_slice() };

    eligible.choose(&mut rand::thread_rng()).copied()
}

impl RotationEngine {
    /// Append an auto-selected track to an empty queue
    ///
    /// Auto-fills are not written to the queue history. `purged` holds the
    /// tracks already removed by the calling resolution.
    ///
    /// # Errors
    /// Returns `JukeboxError::QueueEmpty` when no strategy finds a candidate
    pub(crate) async fn replenish(&self, queue_id: QueueId, purged: &Purged) -> Result<QueuedTrack> {
        let candidate = match self.config().strategy {
            ReplenishStrategy::History => self.history_pick(queue_id).await?,
            ReplenishStrategy::ArtistRadio if purged.radio_exhausted() => {
                tracing::warn!(
                    queue_id,
                    purged = purged.len(),
                    "Artist radio keeps yielding gone tracks, using history"
                );
                self.history_pick(queue_id).await?
            }
            ReplenishStrategy::ArtistRadio => match self.artist_radio_pick(queue_id, purged).await {
                Ok(Some(track_id)) => Some(track_id),
                Ok(None) => self.history_pick(queue_id).await?,
                Err(e) => {
                    tracing::warn!(
                        queue_id,
                        error = %e,
                        "Artist radio failed, falling back to history"
                    );
                    self.history_pick(queue_id).await?
                }
            },
        };

        let Some(track_id) = candidate else {
            tracing::info!(queue_id, "No replenishment candidate");
            return Err(JukeboxError::QueueEmpty(queue_id));
        };

        let queued = queue_tracks::append(self.pool(), queue_id, track_id, None, false).await?;

        tracing::info!(
            queue_id,
            track_id,
            position = queued.position,
            "Queue replenished"
        );

        self.notifier().mutation(
            EventSubject::QueueTrack {
                queue_id,
                queued_track_id: queued.id,
                position: queued.position,
            },
            EventStatus::Created,
        );

        Ok(queued)
    }

    /// Random pick from the cached pool, rebuilt once if it runs dry
    async fn history_pick(&self, queue_id: QueueId) -> Result<Option<TrackId>> {
        let previous = self.cache().get_previous(queue_id).await;

        if let Some(pool) = self.cache().get_pool(queue_id).await {
            if let Some(track_id) = self.draw(queue_id, pool, previous).await? {
                return Ok(Some(track_id));
            }
        }

        let pool = self.build_pool(queue_id).await?;
        let picked = self.draw(queue_id, pool, previous).await?;
        if picked.is_none() {
            self.cache().invalidate_pool(queue_id).await;
        }

        Ok(picked)
    }

    async fn build_pool(&self, queue_id: QueueId) -> Result<Vec<TrackId>> {
        let history = queue_history::distinct_tracks(self.pool(), queue_id).await?;
        if !history.is_empty() {
            tracing::debug!(queue_id, candidates = history.len(), "Pool built from history");
            return Ok(history);
        }

        let least_played = tracks::least_played(self.pool(), self.config().least_played_limit).await?;
        tracing::debug!(
            queue_id,
            candidates = least_played.len(),
            "No history, pool built from least played"
        );
        Ok(least_played)
    }

    /// Draw until a candidate still exists in the store, caching what is left
    async fn draw(
        &self,
        queue_id: QueueId,
        mut pool: Vec<TrackId>,
        previous: Option<TrackId>,
    ) -> Result<Option<TrackId>> {
        while let Some(track_id) = choose_candidate(&pool, previous) {
            pool.retain(|id| *id != track_id);
            self.cache().set_pool(queue_id, &pool).await;

            if tracks::find_by_id(self.pool(), track_id).await?.is_some() {
                return Ok(Some(track_id));
            }
            tracing::debug!(queue_id, track_id, "Skipping deleted candidate");
        }

        Ok(None)
    }

    /// Related track from the seed track's backend
    ///
    /// The seed is the last track advanced past, else the most recent history
    /// entry. `Ok(None)` means artist radio does not apply, including when
    /// the related track was already purged in this resolution.
    async fn artist_radio_pick(&self, queue_id: QueueId, purged: &Purged) -> Result<Option<TrackId>> {
        let seed_id = match self.cache().get_previous(queue_id).await {
            Some(track_id) => Some(track_id),
            None => queue_history::distinct_tracks(self.pool(), queue_id)
                .await?
                .first()
                .copied(),
        };
        let Some(seed_id) = seed_id else {
            return Ok(None);
        };
        let Some(seed) = tracks::find_by_id(self.pool(), seed_id).await? else {
            return Ok(None);
        };

        if !self.sources().supports_associated_tracks(seed.source_type) {
            tracing::debug!(
                queue_id,
                backend = %seed.source_type,
                "Backend has no artist radio"
            );
            return Ok(None);
        }

        let lookup_id = seed
            .primary_artist()
            .map_or(seed.source_id.as_str(), |artist| artist.source_id.as_str());

        let data = self
            .sources()
            .fetch_associated_track(seed.source_type, lookup_id)
            .await?;

        if purged.contains(&data) {
            tracing::debug!(
                queue_id,
                source_id = %data.source_id,
                "Artist radio returned a track already removed"
            );
            return Ok(None);
        }

        let track = tracks::get_or_create(self.pool(), &data, None).await?;

        if track.id == seed.id {
            tracing::debug!(queue_id, track_id = track.id, "Artist radio returned the seed");
            return Ok(None);
        }

        tracing::info!(
            queue_id,
            seed_id,
            track_id = track.id,
            backend = %seed.source_type,
            "Artist radio pick"
        );

        Ok(Some(track.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_pool_yields_nothing() {
        assert_eq!(choose_candidate(&[], None), None);
        assert_eq!(choose_candidate(&[], Some(3)), None);
    }

    #[test]
    fn previous_is_never_repeated_when_there_is_a_choice() {
        for _ in 0..200 {
            let picked = choose_candidate(&[1, 2, 3], Some(2)).unwrap();
            assert_ne!(picked, 2);
        }
    }

    #[test]
    fn single_candidate_is_picked_even_if_previous() {
        assert_eq!(choose_candidate(&[7], Some(7)), Some(7));
        assert_eq!(choose_candidate(&[7, 7], Some(7)), Some(7));
    }

    #[test]
    fn purged_matches_on_backend_identity() {
        let mut purged = Purged::default();
        assert!(!purged.radio_exhausted());

        purged.insert(SourceType::Spotify, "gone");

        assert!(purged.contains(&TrackData::new(SourceType::Spotify, "gone", "Gone")));
        assert!(!purged.contains(&TrackData::new(SourceType::Spotify, "other", "Other")));
        assert!(!purged.contains(&TrackData::new(SourceType::Youtube, "gone", "Gone")));
    }

    #[test]
    fn radio_is_exhausted_after_budget() {
        let mut purged = Purged::default();
        for i in 0..ARTIST_RADIO_PURGE_BUDGET {
            assert!(!purged.radio_exhausted());
            purged.insert(SourceType::Spotify, &format!("gone-{i}"));
        }
        assert!(purged.radio_exhausted());
    }

    #[test]
    fn every_candidate_is_reachable() {
        let seen: HashSet<TrackId> = (0..500)
            .filter_map(|_| choose_candidate(&[1, 2, 3, 4], None))
            .collect();
        assert_eq!(seen, HashSet::from([1, 2, 3, 4]));
    }
}
