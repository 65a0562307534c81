//! The "now playing" state.

use serde::{Deserialize, Serialize};

use crate::track::Track;

/// Volume the player starts with.
pub const DEFAULT_VOLUME: i32 = 70;

/// Desired playback state.
///
/// This is the source of truth; the widget's own state is reconciled toward
/// it. Mutations are plain field updates and never fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Track loaded in the player, if any.
    pub current_track: Option<Track>,
    /// Whether playback is wanted.
    pub is_playing: bool,
    /// Volume, nominally 0-100. Not clamped here.
    pub volume: i32,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl PlaybackState {
    /// Initial state with a custom volume.
    #[must_use]
    pub fn with_volume(volume: i32) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }

    /// Replace the current track and start playing.
    pub fn set_track(&mut self, track: Track) {
        self.current_track = Some(track);
        self.is_playing = true;
    }

    /// Flip the playing flag.
    pub const fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
    }

    /// Want playback.
    pub const fn play(&mut self) {
        self.is_playing = true;
    }

    /// Stop wanting playback.
    pub const fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Set the volume as given; callers clamp.
    pub const fn set_volume(&mut self, volume: i32) {
        self.volume = volume;
    }

    /// Drop the current track and stop. Volume is kept.
    pub fn reset(&mut self) {
        self.current_track = None;
        self.is_playing = false;
    }

    /// Video identifier of the current track.
    #[must_use]
    pub fn current_video_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|t| t.youtube_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {id}"),
            artist: "Artist".to_string(),
            youtube_id: "dQw4w9WgXcQ".to_string(),
            duration: "3:33".to_string(),
            album_cover: String::new(),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::default();
        assert!(state.current_track.is_none());
        assert!(!state.is_playing);
        assert_eq!(state.volume, 70);
    }

    #[test]
    fn test_set_track_starts_playing() {
        let mut state = PlaybackState::default();
        state.set_track(track("a"));
        assert!(state.is_playing);
        assert_eq!(state.current_video_id(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_toggle_play() {
        let mut state = PlaybackState::default();
        state.toggle_play();
        assert!(state.is_playing);
        state.toggle_play();
        assert!(!state.is_playing);
    }

    #[test]
    fn test_volume_not_clamped() {
        let mut state = PlaybackState::default();
        state.set_volume(150);
        assert_eq!(state.volume, 150);
        state.set_volume(-5);
        assert_eq!(state.volume, -5);
    }

    #[test]
    fn test_reset_keeps_volume() {
        let mut state = PlaybackState::with_volume(30);
        state.set_track(track("a"));
        state.reset();
        assert!(state.current_track.is_none());
        assert!(!state.is_playing);
        assert_eq!(state.volume, 30);
    }
}
