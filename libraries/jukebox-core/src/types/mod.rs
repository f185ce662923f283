mod album;
mod artist;
mod playlist;
mod queue;
mod source;
mod track;
mod user;

pub use album::{Album, AlbumData, AlbumId};
pub use artist::{Artist, ArtistData, ArtistId};
pub use playlist::{CreatePlaylist, Playlist, PlaylistId, PlaylistTrack};
pub use queue::{
    AppendRequest, CreateQueue, HeadUpdate, PlayState, Queue, QueueHistoryEntry, QueueId,
    QueuedTrack, QueuedTrackId,
};
pub use source::SourceType;
pub use track::{Track, TrackData, TrackId};
pub use user::{User, UserId};
