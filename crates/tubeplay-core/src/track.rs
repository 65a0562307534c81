//! Track and playlist value objects.
//!
//! Field names serialize in camelCase so the documents match the shape the
//! realtime store holds (`youtubeId`, `albumCover`, ...).

use serde::{Deserialize, Serialize};

/// Cover used for playlists whose first track has no artwork.
pub const DEFAULT_PLAYLIST_COVER: &str =
    "https://images.unsplash.com/photo-1514525253161-7a46d19cd819";

/// A playable track backed by a YouTube video.
///
/// Tracks are immutable values; changing one means replacing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Identifier, unique within its playlist.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Channel name, shown as the artist.
    pub artist: String,
    /// 11-character YouTube video identifier.
    pub youtube_id: String,
    /// Display duration (`M:SS` or `H:MM:SS`).
    pub duration: String,
    /// Cover image URL.
    pub album_cover: String,
}

/// A resolved track that has not been assigned an identifier yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackDraft {
    /// Video title.
    pub title: String,
    /// Channel name, shown as the artist.
    pub artist: String,
    /// 11-character YouTube video identifier.
    pub youtube_id: String,
    /// Display duration (`M:SS` or `H:MM:SS`).
    pub duration: String,
    /// Cover image URL.
    pub album_cover: String,
}

impl TrackDraft {
    /// Turn the draft into a track with the given identifier.
    #[must_use]
    pub fn into_track(self, id: impl Into<String>) -> Track {
        Track {
            id: id.into(),
            title: self.title,
            artist: self.artist,
            youtube_id: self.youtube_id,
            duration: self.duration,
            album_cover: self.album_cover,
        }
    }
}

/// A user's playlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Playlist identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Cover image URL.
    pub cover: String,
    /// Tracks in insertion order.
    pub tracks: Vec<Track>,
    /// Owner.
    pub username: String,
    /// Creation timestamp (Unix millis).
    pub created_at: u64,
}
