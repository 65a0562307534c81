//! Error types for Tubeplay core operations.
//!
//! Errors are grouped by domain (`ResolveError`, `PlaybackError`,
//! `LibraryError`) and wrapped by the top-level [`Error`]. Every error maps to
//! an [`ErrorKind`] so callers can pick a presentation without matching on
//! the full tree.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad error category used for presentation and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// Malformed or missing user input (URLs, usernames, names).
    InvalidInput,
    /// Missing or unusable configuration, such as an absent API credential.
    Configuration,
    /// The metadata service failed or could not be reached.
    Upstream,
    /// The requested video, user, or playlist does not exist.
    NotFound,
    /// The metadata service answered without the expected fields.
    InvalidResponse,
    /// The playback widget reported a failure.
    Playback,
    /// The entity already exists.
    Conflict,
    /// Credentials were rejected or the account is blocked.
    Unauthorized,
    /// Local I/O failure.
    Io,
    /// JSON encoding or decoding failure.
    Serialization,
}

/// Errors raised while turning a URL into track metadata.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No URL was given.
    #[error("URL is required")]
    EmptyUrl,

    /// No video identifier could be extracted.
    #[error("Invalid YouTube URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// The metadata service returned a non-success status.
    #[error("Failed to fetch video details: {status} {reason}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Status text or response body excerpt.
        reason: String,
    },

    /// The metadata service reported zero results.
    #[error("Video not found or is unavailable: {video_id}")]
    NotFound {
        /// The identifier that was looked up.
        video_id: String,
    },

    /// The response lacked the fields needed to build a track.
    #[error("Invalid video data received from YouTube for {video_id}: {reason}")]
    InvalidResponse {
        /// The identifier that was looked up.
        video_id: String,
        /// What was missing or malformed.
        reason: String,
    },
}

/// Errors reported by the embedded playback widget.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// The widget signalled an error while loading or playing.
    #[error("Failed to load video: {0}")]
    Widget(String),

    /// A command issued to the widget failed.
    #[error("Playback command '{command}' failed: {reason}")]
    CommandFailed {
        /// The command that failed (play, pause, ...).
        command: &'static str,
        /// Failure detail from the widget.
        reason: String,
    },

    /// The playback service task is no longer running.
    #[error("Playback service stopped")]
    ServiceStopped,
}

/// Errors raised by the user and playlist library.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Username failed validation.
    #[error("Invalid username '{username}': {reason}")]
    InvalidUsername {
        /// The rejected username.
        username: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Password failed validation.
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Username is already taken.
    #[error("Username already exists: {0}")]
    UserExists(String),

    /// No such user.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The account is blocked.
    #[error("Account is blocked: {0}")]
    AccountBlocked(String),

    /// Wrong password.
    #[error("Invalid password for user {0}")]
    WrongPassword(String),

    /// Playlist name failed validation.
    #[error("Invalid playlist name: {0}")]
    InvalidPlaylistName(String),

    /// No such playlist.
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),
}

/// Errors that can occur in Tubeplay core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Track resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Playback failed.
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Library operation failed.
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network transport error (connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::Resolve(ResolveError::InvalidUrl { url: url.into() })
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a network error.
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a playlist-not-found error.
    pub fn playlist_not_found(id: impl Into<String>) -> Self {
        Self::Library(LibraryError::PlaylistNotFound(id.into()))
    }

    /// Create a user-not-found error.
    pub fn user_not_found(username: impl Into<String>) -> Self {
        Self::Library(LibraryError::UserNotFound(username.into()))
    }

    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolve(e) => match e {
                ResolveError::EmptyUrl | ResolveError::InvalidUrl { .. } => ErrorKind::InvalidInput,
                ResolveError::Upstream { .. } => ErrorKind::Upstream,
                ResolveError::NotFound { .. } => ErrorKind::NotFound,
                ResolveError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            },
            Self::Playback(_) => ErrorKind::Playback,
            Self::Library(e) => match e {
                LibraryError::InvalidUsername { .. }
                | LibraryError::InvalidPassword(_)
                | LibraryError::InvalidPlaylistName(_) => ErrorKind::InvalidInput,
                LibraryError::UserExists(_) => ErrorKind::Conflict,
                LibraryError::UserNotFound(_) | LibraryError::PlaylistNotFound(_) => {
                    ErrorKind::NotFound
                }
                LibraryError::AccountBlocked(_) | LibraryError::WrongPassword(_) => {
                    ErrorKind::Unauthorized
                }
            },
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Network(_) => ErrorKind::Upstream,
            Self::Io(_) => ErrorKind::Io,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Resolve(ResolveError::Upstream { status, .. }) => {
                *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}
