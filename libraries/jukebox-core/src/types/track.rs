/// Track domain types
use super::{Album, AlbumData, Artist, ArtistData, SourceType, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type TrackId = i64;

/// Persisted track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Backend the track came from
    pub source_type: SourceType,

    /// Backend-specific identifier
    pub source_id: String,

    /// Track title
    pub name: String,

    /// Track duration in milliseconds
    pub duration_ms: i64,

    /// Preview clip URL
    pub preview_url: Option<String>,

    /// Track number in album
    pub track_number: Option<i32>,

    pub image_small: Option<String>,
    pub image_medium: Option<String>,
    pub image_large: Option<String>,

    /// External URI (e.g. `spotify:track:...`)
    pub uri: Option<String>,

    /// Number of times the track was advanced past as head
    pub play_count: i64,

    /// User who first added the track
    pub owner_id: Option<UserId>,

    /// Album (optional)
    pub album: Option<Album>,

    /// Artists (order irrelevant)
    pub artists: Vec<Artist>,

    pub created_at: String,
    pub updated_at: String,
}

impl Track {
    /// Get the track duration as a Duration
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms.max(0) as u64)
    }

    /// First linked artist, used to seed artist radio
    pub fn primary_artist(&self) -> Option<&Artist> {
        self.artists.first()
    }
}

/// Track as reported by a metadata source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackData {
    pub source_type: SourceType,
    pub source_id: String,
    pub name: String,
    #[serde(default)]
    pub duration_ms: i64,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub track_number: Option<i32>,
    #[serde(default)]
    pub image_small: Option<String>,
    #[serde(default)]
    pub image_medium: Option<String>,
    #[serde(default)]
    pub image_large: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistData>,
    #[serde(default)]
    pub album: Option<AlbumData>,
}

impl TrackData {
    /// Create track data with minimal metadata
    pub fn new(
        source_type: SourceType,
        source_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            source_type,
            source_id: source_id.into(),
            name: name.into(),
            duration_ms: 0,
            preview_url: None,
            track_number: None,
            image_small: None,
            image_medium: None,
            image_large: None,
            uri: None,
            artists: Vec::new(),
            album: None,
        }
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn with_artist(mut self, artist: ArtistData) -> Self {
        self.artists.push(artist);
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: AlbumData) -> Self {
        self.album = Some(album);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_data_builder() {
        let data = TrackData::new(SourceType::Youtube, "dQw4w9WgXcQ", "Song")
            .with_duration_ms(180_000)
            .with_artist(ArtistData::new(SourceType::Youtube, "UC1", "Artist"))
            .with_album(AlbumData::new(SourceType::Youtube, "PL1", "Album"));

        assert_eq!(data.duration_ms, 180_000);
        assert_eq!(data.artists.len(), 1);
        assert_eq!(data.album.unwrap().name, "Album");
    }

    #[test]
    fn track_data_deserializes_with_defaults() {
        let data: TrackData = serde_json::from_str(
            r#"{"source_type": "spotify", "source_id": "abc", "name": "Minimal"}"#,
        )
        .unwrap();

        assert_eq!(data.duration_ms, 0);
        assert!(data.artists.is_empty());
        assert!(data.album.is_none());
    }
}
