//! `Tubeplay` Core Library
//!
//! This crate provides the core functionality for the `Tubeplay` music player:
//! - Playback control reconciled against an embedded video widget
//! - `YouTube` link parsing and duration formatting
//! - Video metadata lookup through the `YouTube` Data API
//! - User accounts and playlists with change notifications
//! - Application configuration management
//!
//! # Error Handling
//!
//! Every fallible operation returns [`Result`]. Errors are grouped by domain
//! and map to an [`ErrorKind`] for presentation. See the [`error`] module.
//!
//! ```rust,ignore
//! use tubeplay_core::{Result, resolve_video_metadata, YouTubeDataClient};
//!
//! async fn lookup(client: &YouTubeDataClient) -> Result<()> {
//!     let draft = resolve_video_metadata("https://youtu.be/dQw4w9WgXcQ", client).await?;
//!     println!("{}", draft.title);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod notify;
pub mod player;
pub mod resolver;
pub mod track;
pub mod youtube;

pub use config::{AppConfig, ConfigManager, PlayerConfig, YouTubeApiConfig};
pub use error::{Error, ErrorKind, LibraryError, PlaybackError, ResolveError, Result};
pub use library::{Library, LibraryEvent, User};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use player::{
    DEFAULT_VOLUME, PlaybackController, PlaybackService, PlaybackState, PlayerCommand,
    PlayerHandle, PlayerMessage, PlayerOptions, PlayerWidget, WidgetErrorCode, WidgetEvent,
    WidgetState,
};
pub use resolver::{VideoMetadataSource, YouTubeDataClient, resolve_video_metadata};
pub use track::{DEFAULT_PLAYLIST_COVER, Playlist, Track, TrackDraft};
pub use youtube::{
    VIDEO_ID_LEN, extract_video_id, format_duration, youtube_thumbnail_url, youtube_watch_url,
};
