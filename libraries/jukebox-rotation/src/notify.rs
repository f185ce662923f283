//! Mutation notifications
//!
//! `Notifier` applies the publishing rules; publishers only deliver.

use jukebox_core::events::QUEUE_HEADS_CHANNEL;
use jukebox_core::types::QueuedTrack;
use jukebox_core::{EventStatus, EventSubject, Notification, NotificationPublisher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Publishes mutation events
///
/// Updates to the head row (position 1) are suppressed on the generic
/// channel; the head reports playback-state changes on `queue-heads` instead.
#[derive(Clone)]
pub struct Notifier {
    publisher: Arc<dyn NotificationPublisher>,
}

impl Notifier {
    pub fn new(publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self { publisher }
    }

    /// Publish a create/update/delete of a subject
    pub fn mutation(&self, subject: EventSubject, status: EventStatus) {
        if status == EventStatus::Updated && subject.is_queue_head() {
            tracing::trace!(?subject, "Head update suppressed on generic channel");
            return;
        }

        self.publisher
            .publish(subject.channel(), subject.notification(status));
    }

    /// Publish a head playback-state change, if the state changed
    pub fn head_state(&self, before: &QueuedTrack, after: &QueuedTrack) {
        if before.id == after.id && before.state == after.state {
            return;
        }

        self.publisher.publish(
            QUEUE_HEADS_CHANNEL,
            Notification::head_state(after.queue_id, after.id, after.state),
        );
    }
}

/// Logs every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl NotificationPublisher for TracingPublisher {
    fn publish(&self, channel: &str, notification: Notification) {
        tracing::info!(
            channel,
            status = ?notification.status,
            data = %notification.data,
            "Notification"
        );
    }
}

/// Message delivered to `BroadcastPublisher` subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub channel: String,
    pub notification: Notification,
}

/// In-process fan-out over a tokio broadcast channel
///
/// Slow subscribers lag and lose messages; publishing never blocks.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<ChannelMessage>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

impl NotificationPublisher for BroadcastPublisher {
    fn publish(&self, channel: &str, notification: Notification) {
        let message = ChannelMessage {
            channel: channel.to_string(),
            notification,
        };
        if self.sender.send(message).is_err() {
            tracing::trace!(channel, "Notification dropped, no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_core::events::{PLAYLISTS_CHANNEL, QUEUES_CHANNEL};
    use jukebox_core::types::{PlayState, SourceType, Track};

    fn notifier() -> (Notifier, broadcast::Receiver<ChannelMessage>) {
        let publisher = BroadcastPublisher::new(16);
        let receiver = publisher.subscribe();
        (Notifier::new(Arc::new(publisher)), receiver)
    }

    fn head(state: Option<PlayState>) -> QueuedTrack {
        QueuedTrack {
            id: 5,
            queue_id: 2,
            track: Track {
                id: 1,
                source_type: SourceType::Spotify,
                source_id: "abc".to_string(),
                name: "Song".to_string(),
                duration_ms: 1_000,
                preview_url: None,
                track_number: None,
                image_small: None,
                image_medium: None,
                image_large: None,
                uri: None,
                play_count: 0,
                owner_id: None,
                album: None,
                artists: Vec::new(),
                created_at: String::new(),
                updated_at: String::new(),
            },
            position: 1,
            state,
            time_position: None,
            owner_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn head_updates_are_suppressed_but_other_positions_are_not() {
        let (notifier, mut receiver) = notifier();

        notifier.mutation(
            EventSubject::QueueTrack {
                queue_id: 2,
                queued_track_id: 5,
                position: 1,
            },
            EventStatus::Updated,
        );
        assert!(receiver.try_recv().is_err());

        notifier.mutation(
            EventSubject::QueueTrack {
                queue_id: 2,
                queued_track_id: 6,
                position: 2,
            },
            EventStatus::Updated,
        );
        let message = receiver.try_recv().unwrap();
        assert_eq!(message.channel, QUEUES_CHANNEL);
        assert_eq!(message.notification.status, EventStatus::Updated);
    }

    #[test]
    fn head_creation_and_deletion_are_published() {
        let (notifier, mut receiver) = notifier();
        let subject = EventSubject::QueueTrack {
            queue_id: 2,
            queued_track_id: 5,
            position: 1,
        };

        notifier.mutation(subject, EventStatus::Created);
        notifier.mutation(subject, EventStatus::Deleted);

        assert_eq!(receiver.try_recv().unwrap().notification.status, EventStatus::Created);
        assert_eq!(receiver.try_recv().unwrap().notification.status, EventStatus::Deleted);
    }

    #[test]
    fn head_state_only_on_change() {
        let (notifier, mut receiver) = notifier();

        notifier.head_state(&head(Some(PlayState::Playing)), &head(Some(PlayState::Playing)));
        assert!(receiver.try_recv().is_err());

        notifier.head_state(&head(Some(PlayState::Playing)), &head(Some(PlayState::Paused)));
        let message = receiver.try_recv().unwrap();
        assert_eq!(message.channel, QUEUE_HEADS_CHANNEL);
        assert_eq!(message.notification.data["state"], "paused");
        assert_eq!(message.notification.data["queued_track_id"], 5);
    }

    #[test]
    fn playlist_events_use_playlist_channel() {
        let (notifier, mut receiver) = notifier();
        notifier.mutation(EventSubject::Playlist { playlist_id: 3 }, EventStatus::Updated);

        let message = receiver.try_recv().unwrap();
        assert_eq!(message.channel, PLAYLISTS_CHANNEL);
        assert_eq!(message.notification.data["playlist_id"], 3);
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let publisher = BroadcastPublisher::default();
        publisher.publish(QUEUES_CHANNEL, EventSubject::Queue { queue_id: 1 }.notification(EventStatus::Created));
    }
}
